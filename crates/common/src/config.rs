use std::str::FromStr;

use crate::{Error, Result};

/// Where daily bars are fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Yahoo,
    Csv,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Yahoo => write!(f, "yahoo"),
            DataSource::Csv => write!(f, "csv"),
        }
    }
}

/// Runtime configuration loaded from environment variables at startup.
/// Every option has a default; values that fail to parse are rejected.
#[derive(Debug, Clone)]
pub struct Config {
    // Runner
    pub max_workers: usize,
    pub lookback_days: u32,

    // Universe
    pub universe_path: String,
    pub symbol_suffix: String,

    // Market data
    pub data_source: DataSource,
    pub data_dir: String,

    // Optional TOML file with signal thresholds and filters
    pub signal_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: 10,
            lookback_days: 400,
            universe_path: "data/symbols.txt".to_string(),
            symbol_suffix: ".NS".to_string(),
            data_source: DataSource::Yahoo,
            data_dir: "data".to_string(),
            signal_config_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        let defaults = Self::default();

        let data_source = match optional_env("DATA_SOURCE")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            None | Some("yahoo") => DataSource::Yahoo,
            Some("csv") => DataSource::Csv,
            Some(other) => {
                return Err(Error::Config(format!(
                    "DATA_SOURCE must be 'yahoo' or 'csv', got: '{other}'"
                )))
            }
        };

        let max_workers = parsed_env("MAX_WORKERS")?.unwrap_or(defaults.max_workers);
        if max_workers == 0 {
            return Err(Error::Config("MAX_WORKERS must be at least 1".into()));
        }

        Ok(Config {
            max_workers,
            lookback_days: parsed_env("LOOKBACK_DAYS")?.unwrap_or(defaults.lookback_days),
            universe_path: optional_env("UNIVERSE_PATH").unwrap_or(defaults.universe_path),
            symbol_suffix: optional_env("SYMBOL_SUFFIX").unwrap_or(defaults.symbol_suffix),
            data_source,
            data_dir: optional_env("DATA_DIR").unwrap_or(defaults.data_dir),
            signal_config_path: optional_env("SIGNAL_CONFIG_PATH"),
        })
    }
}

pub fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an optional environment variable. Unset is `Ok(None)`; set but
/// unparseable is a configuration error.
pub fn parsed_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match optional_env(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::Config(format!("environment variable '{key}' has invalid value '{raw}'"))
        }),
    }
}
