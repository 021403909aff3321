use super::ema::ema;

/// MACD histogram: `EMA(fast) - EMA(slow)` minus its own `signal`-period EMA.
#[derive(Debug, Clone)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast < slow, "MACD needs fast ({fast}) < slow ({slow})");
        Self { fast, slow, signal }
    }

    /// Bars needed before the first histogram value.
    pub fn min_len(&self) -> usize {
        self.slow + self.signal - 1
    }

    /// Histogram series from close prices (oldest first), `NaN` during warm-up.
    pub fn histogram(&self, closes: &[f64]) -> Vec<f64> {
        if closes.len() < self.min_len() {
            return vec![f64::NAN; closes.len()];
        }
        let fast = ema(closes, self.fast);
        let slow = ema(closes, self.slow);
        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        // the signal EMA seeds on the first `signal` defined MACD values
        let signal_line = ema(&macd_line, self.signal);
        macd_line
            .iter()
            .zip(&signal_line)
            .map(|(m, s)| m - s)
            .collect()
    }
}
