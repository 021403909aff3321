//! Indicator library: pure functions over a [`PriceSeries`] producing named
//! columns aligned with the series' bars.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod stoch_rsi;

use std::collections::BTreeMap;

use common::PriceSeries;

pub use macd::MacdIndicator;
pub use rsi::RsiIndicator;
pub use stoch_rsi::StochRsi;

pub const ADX_14: &str = "ADX_14";
pub const RSI_14: &str = "RSI_14";
pub const MACD_HIST: &str = "MACDh_12_26_9";
pub const BB_LOWER: &str = "BBL_20_2.0";
pub const BB_UPPER: &str = "BBU_20_2.0";
pub const EMA_20: &str = "EMA_20";
pub const EMA_50: &str = "EMA_50";
pub const EMA_200: &str = "EMA_200";
pub const STOCH_RSI_K: &str = "STOCHRSIk_14_14_3_3";

/// Derived indicator columns for one series.
///
/// A column is only present when the series produced at least one defined
/// value for it, so a short or corrupted series shows up as a missing column
/// rather than a column of zeros.
#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    columns: BTreeMap<&'static str, Vec<f64>>,
}

impl IndicatorFrame {
    pub fn compute(series: &PriceSeries) -> Self {
        let bars = series.bars();
        let closes = series.closes();
        let bands = bollinger::bollinger(&closes, 20, 2.0);

        let mut frame = Self::default();
        frame.append(ADX_14, adx::adx(bars, 14));
        frame.append(RSI_14, RsiIndicator::new(14).compute(&closes));
        frame.append(MACD_HIST, MacdIndicator::new(12, 26, 9).histogram(&closes));
        frame.append(BB_LOWER, bands.lower);
        frame.append(BB_UPPER, bands.upper);
        frame.append(EMA_20, ema::ema(&closes, 20));
        frame.append(EMA_50, ema::ema(&closes, 50));
        frame.append(EMA_200, ema::ema(&closes, 200));
        frame.append(STOCH_RSI_K, StochRsi::new(14, 14, 3).k_line(&closes));
        frame
    }

    fn append(&mut self, name: &'static str, values: Vec<f64>) {
        if values.iter().any(|v| v.is_finite()) {
            self.columns.insert(name, values);
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Value of `name` at bar `i`; `None` when the column is absent or the
    /// value is not defined there.
    pub fn value_at(&self, name: &str, i: usize) -> Option<f64> {
        self.column(name)
            .and_then(|c| c.get(i).copied())
            .filter(|v| v.is_finite())
    }
}
