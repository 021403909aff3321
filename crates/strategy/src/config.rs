use serde::{Deserialize, Serialize};
use tracing::info;

use common::config::parsed_env;
use common::{Error, Result};

use crate::decision::DecisionThresholds;
use crate::snapshot::NeutralDefaults;
use crate::trend::TrendThresholds;

/// Scoring version tag attached to every emitted signal.
pub const STRATEGY_VERSION: &str = "adx_rsi_v2.5";

/// Thresholds and screening filters for the signal engine.
///
/// Every field is optional in the TOML file. Example `config/signals.toml`:
/// ```toml
/// buy_threshold = 2.5
/// sell_threshold = 3.0
/// trend_distance_threshold = 0.01
/// slope_pct_threshold = 0.01
///
/// min_volume = 100000.0
/// min_close = 100.0
///
/// [neutral_defaults]
/// rsi = 100.0
/// stoch_rsi_k = 50.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub trend_distance_threshold: f64,
    pub slope_pct_threshold: f64,

    /// Bars required before a symbol is considered at all.
    pub min_bars: usize,
    /// Bars required before EMA-200-derived signals are trusted.
    pub min_trend_bars: usize,
    /// Latest-bar liquidity floor.
    pub min_volume: f64,
    /// Latest-bar price floor.
    pub min_close: f64,

    pub neutral_defaults: NeutralDefaults,
    pub version: String,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            buy_threshold: 2.5,
            sell_threshold: 3.0,
            trend_distance_threshold: 0.01,
            slope_pct_threshold: 0.01,
            min_bars: 50,
            min_trend_bars: 250,
            min_volume: 100_000.0,
            min_close: 100.0,
            neutral_defaults: NeutralDefaults::STANDARD,
            version: STRATEGY_VERSION.to_string(),
        }
    }
}

impl SignalConfig {
    /// Load from a TOML file; absent fields keep their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse signal config at '{path}': {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Override thresholds from `BUY_THRESHOLD`, `SELL_THRESHOLD`,
    /// `TREND_DISTANCE_THRESHOLD` and `SLOPE_PCT_THRESHOLD` when set.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(v) = parsed_env("BUY_THRESHOLD")? {
            self.buy_threshold = v;
        }
        if let Some(v) = parsed_env("SELL_THRESHOLD")? {
            self.sell_threshold = v;
        }
        if let Some(v) = parsed_env("TREND_DISTANCE_THRESHOLD")? {
            self.trend_distance_threshold = v;
        }
        if let Some(v) = parsed_env("SLOPE_PCT_THRESHOLD")? {
            self.slope_pct_threshold = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// File (if any) first, then environment overrides.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        let cfg = base.with_env_overrides()?;
        info!(
            buy = cfg.buy_threshold,
            sell = cfg.sell_threshold,
            trend_distance = cfg.trend_distance_threshold,
            slope_pct = cfg.slope_pct_threshold,
            "Using signal thresholds"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("buy_threshold", self.buy_threshold),
            ("sell_threshold", self.sell_threshold),
            ("trend_distance_threshold", self.trend_distance_threshold),
            ("slope_pct_threshold", self.slope_pct_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.min_trend_bars < self.min_bars {
            return Err(Error::Config(format!(
                "min_trend_bars ({}) must be >= min_bars ({})",
                self.min_trend_bars, self.min_bars
            )));
        }
        Ok(())
    }

    pub fn decision_thresholds(&self) -> DecisionThresholds {
        DecisionThresholds {
            buy: self.buy_threshold,
            sell: self.sell_threshold,
        }
    }

    pub fn trend_thresholds(&self) -> TrendThresholds {
        TrendThresholds {
            distance: self.trend_distance_threshold,
            slope_pct: self.slope_pct_threshold,
        }
    }
}
