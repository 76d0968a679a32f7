// src/config/catalog.rs

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::types::IndicatorRequest;

pub const GDP_GROWTH: &str = "NY.GDP.MKTP.KD.ZG";
pub const UNEMPLOYMENT: &str = "SL.UEM.TOTL.ZS";
pub const INFLATION: &str = "FP.CPI.TOTL.ZG";

/// Country code → display name, in the order the views list them.
static COUNTRIES: &[(&str, &str)] = &[
    ("MX", "México"),
    ("US", "Estados Unidos"),
    ("CA", "Canadá"),
    ("ES", "España"),
    ("BR", "Brasil"),
    ("AR", "Argentina"),
    ("CL", "Chile"),
    ("CO", "Colombia"),
    ("PE", "Perú"),
    ("JP", "Japón"),
    ("KR", "Corea del Sur"),
    ("GB", "Reino Unido"),
    ("DE", "Alemania"),
    ("FR", "Francia"),
    ("IT", "Italia"),
];

/// The indicators the built-in views know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    GdpGrowth,
    Unemployment,
    Inflation,
}

impl Indicator {
    pub fn code(self) -> &'static str {
        match self {
            Indicator::GdpGrowth => GDP_GROWTH,
            Indicator::Unemployment => UNEMPLOYMENT,
            Indicator::Inflation => INFLATION,
        }
    }

    /// Value column name used by the built-in catalog.
    pub fn column(self) -> &'static str {
        match self {
            Indicator::GdpGrowth => "PIB",
            Indicator::Unemployment => "Desempleo",
            Indicator::Inflation => "Inflación",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Indicator {
    type Err = String;

    /// Accepts a short alias (`gdp`, `unemployment`, `inflation`) or the dotted code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gdp" | "pib" => Ok(Indicator::GdpGrowth),
            "unemployment" | "desempleo" => Ok(Indicator::Unemployment),
            "inflation" | "inflacion" | "inflación" => Ok(Indicator::Inflation),
            other => [
                Indicator::GdpGrowth,
                Indicator::Unemployment,
                Indicator::Inflation,
            ]
            .into_iter()
            .find(|i| i.code().eq_ignore_ascii_case(other))
            .ok_or_else(|| format!("unknown indicator `{}`", s)),
        }
    }
}

/// Static table of what the sweep ingests plus display names for countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Optional; unnamed countries display as their code.
    #[serde(default)]
    pub countries: BTreeMap<String, String>,
    pub entries: Vec<IndicatorRequest>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Mexico gets all three indicators; every other country gets GDP growth
    /// and inflation.
    pub fn builtin() -> Self {
        let mut entries = Vec::new();
        for &(code, _) in COUNTRIES {
            let indicators: &[Indicator] = if code == "MX" {
                &[
                    Indicator::GdpGrowth,
                    Indicator::Unemployment,
                    Indicator::Inflation,
                ]
            } else {
                &[Indicator::GdpGrowth, Indicator::Inflation]
            };
            for ind in indicators {
                entries.push(IndicatorRequest::new(code, ind.code(), ind.column()));
            }
        }
        Self {
            countries: COUNTRIES
                .iter()
                .map(|&(c, n)| (c.to_string(), n.to_string()))
                .collect(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name for `code`, falling back to the code itself.
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.countries.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Entries for one indicator, in catalog order.
    pub fn for_indicator<'a>(
        &'a self,
        indicator_code: &'a str,
    ) -> impl Iterator<Item = &'a IndicatorRequest> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.indicator_code == indicator_code)
    }

    pub fn find(&self, country: &str, indicator_code: &str) -> Option<&IndicatorRequest> {
        self.entries
            .iter()
            .find(|e| e.country_code == country && e.indicator_code == indicator_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_matches_the_sweep() {
        let cat = Catalog::builtin();
        assert_eq!(cat.len(), 31);
        assert_eq!(cat.countries.len(), 15);

        let names: HashSet<String> = cat.entries.iter().map(|e| e.table_name()).collect();
        assert_eq!(names.len(), 31);
        assert!(names.contains("MX_SL_UEM_TOTL_ZS"));
        assert!(!names.contains("US_SL_UEM_TOTL_ZS"));

        assert_eq!(cat.for_indicator(INFLATION).count(), 15);
        assert_eq!(cat.for_indicator(UNEMPLOYMENT).count(), 1);
    }

    #[test]
    fn parses_indicator_aliases() {
        assert_eq!("gdp".parse::<Indicator>().unwrap(), Indicator::GdpGrowth);
        assert_eq!(
            "fp.cpi.totl.zg".parse::<Indicator>().unwrap(),
            Indicator::Inflation
        );
        assert_eq!(
            "Desempleo".parse::<Indicator>().unwrap(),
            Indicator::Unemployment
        );
        assert!("NY.GDP.PCAP.CD".parse::<Indicator>().is_err());
    }

    #[test]
    fn display_name_falls_back_to_code() {
        let cat = Catalog::builtin();
        assert_eq!(cat.display_name("KR"), "Corea del Sur");
        assert_eq!(cat.display_name("ZZ"), "ZZ");
    }
}
