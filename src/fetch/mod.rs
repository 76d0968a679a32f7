// src/fetch/mod.rs

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::types::IndicatorRecord;

pub mod payload;
pub mod urls;

pub use payload::parse_payload;
pub use urls::{indicator_url, DEFAULT_API_BASE, PER_PAGE};

/// Why a fetch produced no records.
///
/// `IndicatorClient::fetch` collapses every variant into an empty result;
/// `fetch_detailed` hands them to callers that care about the difference
/// between "no data available" and "request failed".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("empty {0} code")]
    EmptyCode(&'static str),

    #[error("api base `{0}` cannot carry a path")]
    InvalidBase(String),

    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response body is not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload has {len} top-level element(s), expected at least 2")]
    ShortPayload { len: usize },

    #[error("payload data element is not an array")]
    Malformed,
}

/// Thin wrapper around a `reqwest::Client` pointed at an indicator API host.
#[derive(Debug, Clone)]
pub struct IndicatorClient {
    client: Client,
    base: Url,
    per_page: u32,
}

impl IndicatorClient {
    pub fn new(client: Client, base: Url) -> Self {
        Self {
            client,
            base,
            per_page: PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Best-effort fetch: any failure is logged and turned into an empty series.
    pub async fn fetch(&self, country: &str, indicator: &str) -> Vec<IndicatorRecord> {
        match self.fetch_detailed(country, indicator).await {
            Ok(records) => records,
            Err(e) => {
                warn!(country, indicator, error = %e, "no data fetched");
                Vec::new()
            }
        }
    }

    /// Single GET, no retry. Returns records sorted ascending by year.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_detailed(
        &self,
        country: &str,
        indicator: &str,
    ) -> Result<Vec<IndicatorRecord>, FetchError> {
        if country.trim().is_empty() {
            return Err(FetchError::EmptyCode("country"));
        }
        if indicator.trim().is_empty() {
            return Err(FetchError::EmptyCode("indicator"));
        }

        let url = indicator_url(&self.base, country, indicator, self.per_page)?;
        debug!(%url, "GET");

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(transport)?;
        let json: Value = serde_json::from_str(&body)?;
        let records = parse_payload(&json)?;
        debug!(rows = records.len(), "parsed indicator payload");
        Ok(records)
    }
}
