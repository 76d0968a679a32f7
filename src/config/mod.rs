// src/config/mod.rs

use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fetch::{DEFAULT_API_BASE, PER_PAGE};

pub mod catalog;

pub use catalog::{Catalog, Indicator, GDP_GROWTH, INFLATION, UNEMPLOYMENT};

pub const DEFAULT_DATABASE: &str = "indicators.db";
pub const ENV_DATABASE: &str = "ECONSCRAPER_DATABASE";
pub const ENV_API_BASE: &str = "ECONSCRAPER_API_BASE";

/// Runtime settings. Resolution order: defaults, then the optional YAML
/// file, then environment variables. CLI flags are applied on top by the
/// binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite location, `sqlite://path` or a plain path.
    pub database: String,
    pub api_base: String,
    pub per_page: u32,
    pub catalog: Catalog,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            per_page: PER_PAGE,
            catalog: Catalog::builtin(),
        }
    }
}

impl Settings {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing settings YAML")
    }

    /// Defaults, overlaid with `path` (when given) and then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                debug!(path = %p.display(), "loaded config file");
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| env::var(key).ok());
        Ok(settings)
    }

    /// Overlay values from `lookup`; takes a closure so tests need not touch
    /// the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup(ENV_DATABASE).filter(|v| !v.trim().is_empty()) {
            self.database = db;
        }
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            self.api_base = base;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.database, "indicators.db");
        assert_eq!(s.api_base, "https://api.worldbank.org");
        assert_eq!(s.per_page, 2000);
        assert_eq!(s.catalog.len(), 31);
    }

    #[test]
    fn yaml_overrides_only_what_it_names() {
        let s = Settings::from_yaml("database: sqlite://data/econ.db\nper_page: 500\n").unwrap();
        assert_eq!(s.database, "sqlite://data/econ.db");
        assert_eq!(s.per_page, 500);
        assert_eq!(s.api_base, DEFAULT_API_BASE);
        assert_eq!(s.catalog, Catalog::builtin());
    }

    #[test]
    fn yaml_can_replace_the_catalog() {
        let yaml = r#"
catalog:
  countries:
    MX: México
  entries:
    - country_code: MX
      indicator_code: NY.GDP.MKTP.KD.ZG
      column_name: PIB
"#;
        let s = Settings::from_yaml(yaml).unwrap();
        assert_eq!(s.catalog.len(), 1);
        assert_eq!(s.catalog.entries[0].table_name(), "MX_NY_GDP_MKTP_KD_ZG");
    }

    #[test]
    fn catalog_without_country_names() {
        let yaml = r#"
catalog:
  entries:
    - country_code: CL
      indicator_code: FP.CPI.TOTL.ZG
      column_name: Inflación
"#;
        let s = Settings::from_yaml(yaml).unwrap();
        assert!(s.catalog.countries.is_empty());
        assert_eq!(s.catalog.len(), 1);
        assert_eq!(s.catalog.display_name("CL"), "CL");
    }

    #[test]
    fn env_wins_over_file() {
        let mut s = Settings::from_yaml("database: file.db\n").unwrap();
        s.apply_env(|k| match k {
            ENV_DATABASE => Some("env.db".to_string()),
            ENV_API_BASE => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(s.database, "env.db");
        assert_eq!(s.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn bad_yaml_is_an_error() {
        assert!(Settings::from_yaml("per_page: lots").is_err());
    }
}
