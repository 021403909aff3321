use super::ema::wilder;

/// Relative Strength Index with Wilder smoothing.
///
/// Average gain and loss are Wilder-smoothed separately, seeded by the simple
/// mean of the first `period` changes, so the first value lands at index
/// `period`. A window with no losses reads 100.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period }
    }

    /// RSI aligned with `closes`, `NaN` during warm-up. A missing close holds
    /// the previous value; the changes into and out of it are skipped.
    pub fn compute(&self, closes: &[f64]) -> Vec<f64> {
        // bar 0 has no prior close, so both legs start undefined
        let (gains, losses): (Vec<f64>, Vec<f64>) = std::iter::once((f64::NAN, f64::NAN))
            .chain(closes.windows(2).map(|w| split_change(w[1] - w[0])))
            .take(closes.len())
            .unzip();

        wilder(&gains, self.period)
            .into_iter()
            .zip(wilder(&losses, self.period))
            .map(|(gain, loss)| strength_index(gain, loss))
            .collect()
    }
}

fn split_change(change: f64) -> (f64, f64) {
    if change.is_nan() {
        (f64::NAN, f64::NAN)
    } else {
        (change.max(0.0), (-change).max(0.0))
    }
}

fn strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if !(avg_gain.is_finite() && avg_loss.is_finite()) {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
