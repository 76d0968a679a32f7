// src/store/mod.rs

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::types::IndicatorRecord;

pub mod table;

pub use table::{Cell, Table};

/// Name of the year column in every indicator table.
pub const YEAR_COLUMN: &str = "year";

static TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("table name pattern should compile"));

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no database at {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("table `{0}` does not exist")]
    TableNotFound(String),

    #[error("`{0}` is not a valid table name")]
    InvalidTableName(String),

    #[error("`{0}` is not a valid value column name")]
    InvalidColumnName(String),

    #[error("table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Result of a table write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(usize),
    /// Nothing to write; the existing table (if any) was left alone.
    Skipped,
}

/// `{country}_{indicator}` with dots turned into underscores.
pub fn table_name(country: &str, indicator: &str) -> String {
    format!("{}_{}", country, indicator).replace('.', "_")
}

fn check_table_name(name: &str) -> Result<(), StoreError> {
    if TABLE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(name.to_string()))
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// SQLite-backed table store. Every call opens its own connection and drops
/// it before returning.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Accepts `sqlite://path`, `sqlite:path` or a bare file path.
    pub fn new(location: &str) -> Self {
        let path = location
            .strip_prefix("sqlite://")
            .or_else(|| location.strip_prefix("sqlite:"))
            .unwrap_or(location);
        Self {
            path: PathBuf::from(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file if needed. Only `write` opens this way.
    fn open(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.path)?)
    }

    /// Opens an existing database without creating it.
    fn open_existing(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Connection::open_with_flags(&self.path, flags).map_err(|e| match e.sqlite_error_code() {
            Some(ErrorCode::CannotOpen) => StoreError::DatabaseNotFound(self.path.clone()),
            _ => StoreError::Sqlite(e),
        })
    }

    /// Replace `table` with `records`. An empty series is a no-op.
    #[instrument(level = "debug", skip(self, records), fields(rows = records.len()))]
    pub fn write(
        &self,
        table: &str,
        column: &str,
        records: &[IndicatorRecord],
    ) -> Result<WriteOutcome, StoreError> {
        check_table_name(table)?;
        if column.trim().is_empty() || column.eq_ignore_ascii_case(YEAR_COLUMN) {
            return Err(StoreError::InvalidColumnName(column.to_string()));
        }
        if records.is_empty() {
            info!(table, "no data, write skipped");
            return Ok(WriteOutcome::Skipped);
        }

        let t = quote_ident(table);
        let c = quote_ident(column);
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {t};
             CREATE TABLE {t} ({YEAR_COLUMN} INTEGER NOT NULL, {c} REAL NOT NULL);"
        ))?;
        {
            let mut stmt =
                tx.prepare(&format!("INSERT INTO {t} ({YEAR_COLUMN}, {c}) VALUES (?1, ?2)"))?;
            for rec in records {
                stmt.execute(params![rec.year, rec.value])?;
            }
        }
        tx.commit()?;

        info!(table, rows = records.len(), "table replaced");
        Ok(WriteOutcome::Written(records.len()))
    }

    /// `SELECT *` over `table`.
    #[instrument(level = "debug", skip(self))]
    pub fn read(&self, table: &str) -> Result<Table, StoreError> {
        check_table_name(table)?;
        let conn = self.open_existing()?;
        if !table_exists(&conn, table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }

        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_ident(table)))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(Cell::from))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(table, rows = rows.len(), "table read");
        Ok(Table {
            name: table.to_string(),
            columns,
            rows,
        })
    }

    /// Read `table` back as a typed series, using `column` as the value.
    pub fn read_series(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Vec<IndicatorRecord>, StoreError> {
        self.read(table)?.series(column)
    }

    /// A missing database holds no tables, so that is `Ok(false)`.
    pub fn exists(&self, table: &str) -> Result<bool, StoreError> {
        check_table_name(table)?;
        let conn = match self.open_existing() {
            Ok(conn) => conn,
            Err(StoreError::DatabaseNotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        table_exists(&conn, table)
    }

    /// All user tables, sorted by name.
    pub fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.open_existing()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, StoreError> {
    let mut stmt = conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(stmt.exists(params![table])?)
}
