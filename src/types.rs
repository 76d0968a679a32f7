// src/types.rs

use serde::{Deserialize, Serialize};

/// One (country, indicator) pair to ingest, and the name its value column gets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorRequest {
    pub country_code: String,
    pub indicator_code: String,
    pub column_name: String,
}

impl IndicatorRequest {
    pub fn new(
        country_code: impl Into<String>,
        indicator_code: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            indicator_code: indicator_code.into(),
            column_name: column_name.into(),
        }
    }

    /// Name of the table this request is persisted under.
    pub fn table_name(&self) -> String {
        crate::store::table_name(&self.country_code, &self.indicator_code)
    }
}

/// A single non-null yearly observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub year: i32,
    pub value: f64,
}

impl IndicatorRecord {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}
