/// Exponential Moving Average over a full series.
///
/// Seeded with the SMA of the first `period` values after any leading `NaN`s,
/// then `EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1]` with
/// `alpha = 2 / (period + 1)`. Output has the same length as the input;
/// positions before the seed are `NaN`. A missing input after the seed holds
/// the previous value and smoothing resumes on the next defined input.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// Wilder's smoothing (RMA): the same recursion with `alpha = 1 / period`.
pub fn wilder(values: &[f64], period: usize) -> Vec<f64> {
    smooth(values, period, 1.0 / period as f64)
}

/// Simple moving average. `NaN` wherever the trailing window is incomplete
/// or contains a `NaN`.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    for (i, window) in values.windows(period).enumerate() {
        if window.iter().all(|v| v.is_finite()) {
            out[i + period - 1] = window.iter().sum::<f64>() / period as f64;
        }
    }
    out
}

fn smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 {
        return out;
    }

    let Some(start) = values.iter().position(|v| v.is_finite()) else {
        return out;
    };
    let seed_end = start + period;
    if seed_end > n {
        return out;
    }

    let seed_window = &values[start..seed_end];
    if seed_window.iter().any(|v| !v.is_finite()) {
        return out; // NaN in seed window → nothing after the seed is trustworthy
    }
    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    out[seed_end - 1] = prev;

    for i in seed_end..n {
        if values[i].is_finite() {
            prev = alpha * values[i] + (1.0 - alpha) * prev;
        }
        out[i] = prev;
    }
    out
}
