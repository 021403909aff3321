use super::ema::sma;
use super::rsi::RsiIndicator;

/// Stochastic RSI %K: the stochastic oscillator applied to RSI, smoothed.
///
/// `stoch = 100 * (rsi - min(rsi, length)) / (max(rsi, length) - min(rsi, length))`,
/// `%K = SMA(stoch, k)`. A flat RSI window has no range and yields `NaN`.
#[derive(Debug, Clone)]
pub struct StochRsi {
    pub rsi_period: usize,
    pub length: usize,
    pub k: usize,
}

impl StochRsi {
    pub fn new(rsi_period: usize, length: usize, k: usize) -> Self {
        assert!(length >= 1 && k >= 1, "StochRSI windows must be >= 1");
        Self {
            rsi_period,
            length,
            k,
        }
    }

    pub fn k_line(&self, closes: &[f64]) -> Vec<f64> {
        let rsi = RsiIndicator::new(self.rsi_period).compute(closes);
        let mut stoch = vec![f64::NAN; rsi.len()];

        for (i, window) in rsi.windows(self.length).enumerate() {
            if window.iter().any(|v| !v.is_finite()) {
                continue;
            }
            let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let last = window[self.length - 1];
            if hi > lo {
                stoch[i + self.length - 1] = 100.0 * (last - lo) / (hi - lo);
            }
        }

        sma(&stoch, self.k)
    }
}
