// src/report/mod.rs
//! Read-side views over stored indicator tables: year filtering, key
//! metrics, country comparison and ranking. Everything here works on plain
//! `IndicatorRecord` slices; `render` turns the results into text.

use serde::{Deserialize, Serialize};

use crate::types::IndicatorRecord;

pub mod compare;
pub mod metrics;
pub mod render;

pub use compare::{latest_by_country, load_countries, pivot, ranking, CountrySeries, Pivot};
pub use metrics::{join_on_year, key_metrics, mean, tail, trend, KeyMetrics, Trend};

/// Inclusive year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn new(from: i32, to: i32) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    /// Smallest range holding every record, or `None` for an empty series.
    pub fn covering<'a>(records: impl IntoIterator<Item = &'a IndicatorRecord>) -> Option<Self> {
        records.into_iter().fold(None, |acc, r| {
            Some(match acc {
                None => Self::new(r.year, r.year),
                Some(YearRange { from, to }) => Self::new(from.min(r.year), to.max(r.year)),
            })
        })
    }

    /// Fill missing ends from `covering`, so `--from` alone means "from here on".
    pub fn resolve(from: Option<i32>, to: Option<i32>, covering: Option<Self>) -> Option<Self> {
        let from = from.or(covering.map(|r| r.from))?;
        let to = to.or(covering.map(|r| r.to))?;
        Some(Self::new(from, to))
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.from..=self.to).contains(&year)
    }

    pub fn filter(&self, records: &[IndicatorRecord]) -> Vec<IndicatorRecord> {
        records
            .iter()
            .filter(|r| self.contains(r.year))
            .copied()
            .collect()
    }
}
