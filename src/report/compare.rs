// src/report/compare.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use super::YearRange;
use crate::{
    config::Catalog,
    store::{Store, StoreError},
    types::IndicatorRecord,
};

/// One country's series for a single indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySeries {
    pub code: String,
    pub name: String,
    pub records: Vec<IndicatorRecord>,
}

impl CountrySeries {
    pub fn restrict(&self, range: YearRange) -> Self {
        Self {
            records: range.filter(&self.records),
            ..self.clone()
        }
    }
}

/// Load every catalog country that carries `indicator_code`. Countries whose
/// table was never written are left out; any other store error is returned.
pub fn load_countries(
    store: &Store,
    catalog: &Catalog,
    indicator_code: &str,
) -> Result<Vec<CountrySeries>, StoreError> {
    let mut out = Vec::new();
    for entry in catalog.for_indicator(indicator_code) {
        let table = entry.table_name();
        match store.read_series(&table, &entry.column_name) {
            Ok(records) => out.push(CountrySeries {
                code: entry.country_code.clone(),
                name: catalog.display_name(&entry.country_code).to_string(),
                records,
            }),
            Err(StoreError::TableNotFound(_)) => {
                debug!(table = %table, "skipping country without data");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Year × country grid, columns in the order of `series`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
    pub countries: Vec<String>,
    pub rows: Vec<(i32, Vec<Option<f64>>)>,
}

pub fn pivot(series: &[CountrySeries]) -> Pivot {
    let years: BTreeSet<i32> = series
        .iter()
        .flat_map(|s| s.records.iter().map(|r| r.year))
        .collect();
    let lookups: Vec<BTreeMap<i32, f64>> = series
        .iter()
        .map(|s| s.records.iter().map(|r| (r.year, r.value)).collect())
        .collect();

    Pivot {
        countries: series.iter().map(|s| s.name.clone()).collect(),
        rows: years
            .into_iter()
            .map(|y| (y, lookups.iter().map(|m| m.get(&y).copied()).collect()))
            .collect(),
    }
}

/// Most recent observation per country; countries with no data are omitted.
pub fn latest_by_country(series: &[CountrySeries]) -> Vec<(String, IndicatorRecord)> {
    series
        .iter()
        .filter_map(|s| {
            s.records
                .iter()
                .max_by_key(|r| r.year)
                .map(|r| (s.name.clone(), *r))
        })
        .collect()
}

/// `latest_by_country`, highest value first.
pub fn ranking(series: &[CountrySeries]) -> Vec<(String, IndicatorRecord)> {
    let mut latest = latest_by_country(series);
    latest.sort_by(|a, b| b.1.value.total_cmp(&a.1.value));
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndicatorRequest;
    use tempfile::tempdir;

    fn cs(name: &str, points: &[(i32, f64)]) -> CountrySeries {
        CountrySeries {
            code: name.chars().take(2).collect::<String>().to_uppercase(),
            name: name.to_string(),
            records: points
                .iter()
                .map(|&(y, v)| IndicatorRecord::new(y, v))
                .collect(),
        }
    }

    #[test]
    fn pivot_fills_gaps_with_none() {
        let p = pivot(&[
            cs("México", &[(2020, 3.4), (2021, 5.7)]),
            cs("Chile", &[(2021, 4.5), (2022, 11.6)]),
        ]);
        assert_eq!(p.countries, vec!["México", "Chile"]);
        assert_eq!(
            p.rows,
            vec![
                (2020, vec![Some(3.4), None]),
                (2021, vec![Some(5.7), Some(4.5)]),
                (2022, vec![None, Some(11.6)]),
            ]
        );
    }

    #[test]
    fn ranking_orders_latest_values() {
        let ranked = ranking(&[
            cs("Japón", &[(2022, 1.0)]),
            cs("Perú", &[(2021, 13.4), (2022, 2.7)]),
            cs("Italia", &[]),
            cs("Colombia", &[(2022, 7.3)]),
        ]);
        let names: Vec<&str> = ranked.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Colombia", "Perú", "Japón"]);
        assert_eq!(ranked[1].1, IndicatorRecord::new(2022, 2.7));
    }

    #[test]
    fn restrict_filters_years() {
        let s = cs("México", &[(2019, 1.0), (2020, 2.0), (2021, 3.0)]);
        let r = s.restrict(YearRange::new(2020, 2030));
        assert_eq!(r.records.len(), 2);
        assert_eq!(r.name, "México");
    }

    #[test]
    fn load_countries_skips_missing_tables() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path().join("cmp.db").to_str().unwrap());
        let catalog = Catalog {
            countries: [("MX", "México"), ("US", "Estados Unidos")]
                .into_iter()
                .map(|(c, n)| (c.to_string(), n.to_string()))
                .collect(),
            entries: vec![
                IndicatorRequest::new("MX", "FP.CPI.TOTL.ZG", "Inflación"),
                IndicatorRequest::new("US", "FP.CPI.TOTL.ZG", "Inflación"),
                IndicatorRequest::new("MX", "NY.GDP.MKTP.KD.ZG", "PIB"),
            ],
        };
        store
            .write(
                "MX_FP_CPI_TOTL_ZG",
                "Inflación",
                &[IndicatorRecord::new(2022, 7.9)],
            )
            .unwrap();

        let loaded = load_countries(&store, &catalog, "FP.CPI.TOTL.ZG").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].code, "MX");
        assert_eq!(loaded[0].name, "México");
        assert_eq!(loaded[0].records, vec![IndicatorRecord::new(2022, 7.9)]);
    }

    #[test]
    fn load_countries_surfaces_column_mismatch() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path().join("cmp.db").to_str().unwrap());
        let catalog = Catalog {
            countries: Default::default(),
            entries: vec![IndicatorRequest::new("MX", "NY.GDP.MKTP.KD.ZG", "Value")],
        };
        store
            .write("MX_NY_GDP_MKTP_KD_ZG", "PIB", &[IndicatorRecord::new(2022, 3.9)])
            .unwrap();

        assert!(matches!(
            load_countries(&store, &catalog, "NY.GDP.MKTP.KD.ZG"),
            Err(StoreError::MissingColumn { .. })
        ));
    }
}
