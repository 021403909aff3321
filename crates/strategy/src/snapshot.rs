use serde::{Deserialize, Serialize};

use crate::indicators::{
    IndicatorFrame, ADX_14, BB_LOWER, BB_UPPER, EMA_20, EMA_200, EMA_50, MACD_HIST, RSI_14,
    STOCH_RSI_K,
};

/// Latest indicator values for one bar. `None` means "not defined there".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: Option<f64>,
    pub adx: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_upper: Option<f64>,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
    pub stoch_rsi_k: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn at(frame: &IndicatorFrame, close: f64, i: usize) -> Self {
        Self {
            close: Some(close).filter(|c| c.is_finite()),
            adx: frame.value_at(ADX_14, i),
            rsi: frame.value_at(RSI_14, i),
            macd_hist: frame.value_at(MACD_HIST, i),
            bb_lower: frame.value_at(BB_LOWER, i),
            bb_upper: frame.value_at(BB_UPPER, i),
            ema20: frame.value_at(EMA_20, i),
            ema50: frame.value_at(EMA_50, i),
            ema200: frame.value_at(EMA_200, i),
            stoch_rsi_k: frame.value_at(STOCH_RSI_K, i),
        }
    }

    /// Fill undefined values from `defaults`.
    pub fn resolve(&self, defaults: &NeutralDefaults) -> ResolvedSnapshot {
        ResolvedSnapshot {
            close: self.close.unwrap_or(defaults.close),
            adx: self.adx.unwrap_or(defaults.adx),
            rsi: self.rsi.unwrap_or(defaults.rsi),
            macd_hist: self.macd_hist.unwrap_or(defaults.macd_hist),
            bb_lower: self.bb_lower.unwrap_or(defaults.bb_lower),
            bb_upper: self.bb_upper.unwrap_or(defaults.bb_upper),
            ema20: self.ema20.unwrap_or(defaults.ema20),
            ema50: self.ema50.unwrap_or(defaults.ema50),
            ema200: self.ema200.unwrap_or(defaults.ema200),
            stoch_rsi_k: self.stoch_rsi_k.unwrap_or(defaults.stoch_rsi_k),
        }
    }
}

/// Snapshot with every value present, ready for scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSnapshot {
    pub close: f64,
    pub adx: f64,
    pub rsi: f64,
    pub macd_hist: f64,
    pub bb_lower: f64,
    pub bb_upper: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub stoch_rsi_k: f64,
}

/// Substitutes for undefined indicator values.
///
/// A missing RSI reads as 100 (never oversold, counts as overbought) and a
/// missing StochRSI as 50 (neither extreme). Everything else falls back to
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeutralDefaults {
    pub close: f64,
    pub adx: f64,
    pub rsi: f64,
    pub macd_hist: f64,
    pub bb_lower: f64,
    pub bb_upper: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub stoch_rsi_k: f64,
}

impl NeutralDefaults {
    pub const STANDARD: Self = Self {
        close: 0.0,
        adx: 0.0,
        rsi: 100.0,
        macd_hist: 0.0,
        bb_lower: 0.0,
        bb_upper: 0.0,
        ema20: 0.0,
        ema50: 0.0,
        ema200: 0.0,
        stoch_rsi_k: 50.0,
    };
}

impl Default for NeutralDefaults {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_resolves_to_standard_defaults() {
        let resolved = IndicatorSnapshot::default().resolve(&NeutralDefaults::STANDARD);
        assert_eq!(resolved.rsi, 100.0);
        assert_eq!(resolved.stoch_rsi_k, 50.0);
        assert_eq!(resolved.adx, 0.0);
        assert_eq!(resolved.macd_hist, 0.0);
        assert_eq!(resolved.bb_lower, 0.0);
        assert_eq!(resolved.ema200, 0.0);
    }

    #[test]
    fn defined_values_win_over_defaults() {
        let snapshot = IndicatorSnapshot {
            rsi: Some(42.0),
            ..Default::default()
        };
        let resolved = snapshot.resolve(&NeutralDefaults::STANDARD);
        assert_eq!(resolved.rsi, 42.0);
    }

    #[test]
    fn non_finite_close_is_undefined() {
        let frame = IndicatorFrame::default();
        let snapshot = IndicatorSnapshot::at(&frame, f64::NAN, 0);
        assert_eq!(snapshot.close, None);
        assert_eq!(snapshot.adx, None);
    }
}
