// src/fetch/urls.rs
use url::Url;

use super::FetchError;

pub const DEFAULT_API_BASE: &str = "https://api.worldbank.org";

/// Page size large enough to hold every year of a series in one response.
pub const PER_PAGE: u32 = 2000;

/// `{base}/v2/country/{country}/indicator/{indicator}?format=json&per_page={per_page}`
pub fn indicator_url(
    base: &Url,
    country: &str,
    indicator: &str,
    per_page: u32,
) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidBase(base.to_string()))?
        .pop_if_empty()
        .extend(["v2", "country", country, "indicator", indicator]);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("per_page", &per_page.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_world_bank_url() {
        let base = Url::parse(DEFAULT_API_BASE).unwrap();
        let url = indicator_url(&base, "MX", "NY.GDP.MKTP.KD.ZG", PER_PAGE).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.worldbank.org/v2/country/MX/indicator/NY.GDP.MKTP.KD.ZG?format=json&per_page=2000"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let base = Url::parse("http://127.0.0.1:8080/mirror/").unwrap();
        let url = indicator_url(&base, "US", "FP.CPI.TOTL.ZG", 50).unwrap();
        assert_eq!(url.path(), "/mirror/v2/country/US/indicator/FP.CPI.TOTL.ZG");
        assert_eq!(url.query(), Some("format=json&per_page=50"));
    }

    #[test]
    fn rejects_cannot_be_a_base() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            indicator_url(&base, "MX", "X", 1),
            Err(FetchError::InvalidBase(_))
        ));
    }
}
