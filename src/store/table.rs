// src/store/table.rs

use std::fmt;

use rusqlite::types::ValueRef;

use super::{StoreError, YEAR_COLUMN};
use crate::types::IndicatorRecord;

/// One stored value, as SQLite hands it back.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Real(f) if f.fract() == 0.0 => Some(*f as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(f) => Some(*f),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str(""),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(v) => write!(f, "{:.2}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A full-table read: column names plus rows in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Typed view over (`year`, `column`), sorted by year. Rows where either
    /// cell is null or non-numeric are skipped.
    pub fn series(&self, column: &str) -> Result<Vec<IndicatorRecord>, StoreError> {
        let missing = |c: &str| StoreError::MissingColumn {
            table: self.name.clone(),
            column: c.to_string(),
        };
        let yi = self
            .column_index(YEAR_COLUMN)
            .ok_or_else(|| missing(YEAR_COLUMN))?;
        let vi = self.column_index(column).ok_or_else(|| missing(column))?;

        let mut out: Vec<IndicatorRecord> = self
            .rows
            .iter()
            .filter_map(|row| {
                let year = row.get(yi)?.as_i64()?;
                let value = row.get(vi)?.as_f64()?;
                Some(IndicatorRecord {
                    year: i32::try_from(year).ok()?,
                    value,
                })
            })
            .collect();
        out.sort_by_key(|r| r.year);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            name: "MX_SL_UEM_TOTL_ZS".into(),
            columns: vec!["year".into(), "Desempleo".into()],
            rows: vec![
                vec![Cell::Integer(2021), Cell::Real(4.1)],
                vec![Cell::Integer(2019), Cell::Real(3.5)],
                vec![Cell::Integer(2020), Cell::Null],
                vec![Cell::Text("2022".into()), Cell::Integer(3)],
            ],
        }
    }

    #[test]
    fn series_is_sorted_and_skips_nulls() {
        let s = table().series("Desempleo").unwrap();
        assert_eq!(
            s,
            vec![
                IndicatorRecord::new(2019, 3.5),
                IndicatorRecord::new(2021, 4.1),
                IndicatorRecord::new(2022, 3.0),
            ]
        );
    }

    #[test]
    fn series_reports_missing_column() {
        match table().series("Value") {
            Err(StoreError::MissingColumn { table, column }) => {
                assert_eq!(table, "MX_SL_UEM_TOTL_ZS");
                assert_eq!(column, "Value");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn cell_display() {
        assert_eq!(Cell::Real(2.5).to_string(), "2.50");
        assert_eq!(Cell::Integer(7).to_string(), "7");
        assert_eq!(Cell::Null.to_string(), "");
    }
}
