// src/ingest.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{error, info, instrument};

use crate::{
    fetch::IndicatorClient,
    store::{Store, WriteOutcome},
    types::IndicatorRequest,
};

/// What happened to one catalog entry during a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Written { rows: usize },
    NoData,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableOutcome {
    pub table: String,
    pub country: String,
    pub indicator: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables: Vec<TableOutcome>,
}

impl SweepReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Written { .. }))
    }

    pub fn no_data(&self) -> usize {
        self.count(|o| matches!(o, Outcome::NoData))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.tables.iter().filter(|t| pred(&t.outcome)).count()
    }
}

/// Fetch one indicator series and replace its table.
#[instrument(level = "info", skip(client, store), fields(country = %req.country_code, indicator = %req.indicator_code))]
pub async fn ingest_one(
    client: &IndicatorClient,
    store: &Store,
    req: &IndicatorRequest,
) -> TableOutcome {
    let table = req.table_name();
    let records = client.fetch(&req.country_code, &req.indicator_code).await;

    // sqlite is blocking; keep it off the runtime threads
    let write = tokio::task::spawn_blocking({
        let store = store.clone();
        let table = table.clone();
        let column = req.column_name.clone();
        move || store.write(&table, &column, &records)
    })
    .await;

    let outcome = match write {
        Ok(Ok(WriteOutcome::Written(rows))) => Outcome::Written { rows },
        Ok(Ok(WriteOutcome::Skipped)) => {
            info!(table = %table, "no data for {} / {}", req.country_code, req.indicator_code);
            Outcome::NoData
        }
        Ok(Err(e)) => {
            error!(table = %table, error = %e, "write failed");
            Outcome::Failed {
                reason: e.to_string(),
            }
        }
        Err(e) => {
            error!(table = %table, error = %e, "write task panicked");
            Outcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    TableOutcome {
        table,
        country: req.country_code.clone(),
        indicator: req.indicator_code.clone(),
        outcome,
    }
}

/// Walk `catalog` in order, one fetch and one write at a time. Failures are
/// recorded per entry and never stop the sweep.
pub async fn run_sweep(
    client: &IndicatorClient,
    store: &Store,
    catalog: &[IndicatorRequest],
) -> SweepReport {
    let started_at = Utc::now();
    let start = Instant::now();
    info!(entries = catalog.len(), db = %store.path().display(), "sweep started");

    let mut tables = Vec::with_capacity(catalog.len());
    for req in catalog {
        tables.push(ingest_one(client, store, req).await);
    }

    let report = SweepReport {
        started_at,
        finished_at: Utc::now(),
        tables,
    };
    info!(
        written = report.written(),
        no_data = report.no_data(),
        failed = report.failed(),
        elapsed = ?start.elapsed(),
        "sweep finished"
    );
    report
}
