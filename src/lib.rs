pub mod config;
pub mod export;
pub mod fetch;
pub mod ingest;
pub mod report;
pub mod store;
pub mod types;

pub use types::{IndicatorRecord, IndicatorRequest};
