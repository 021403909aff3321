//! Bollinger Bands: SMA ± multiplier × population standard deviation.

use super::ema::sma;

#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub lower: Vec<f64>,
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
}

pub fn bollinger(closes: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = sma(closes, period);
    let n = closes.len();
    let mut lower = vec![f64::NAN; n];
    let mut upper = vec![f64::NAN; n];

    for i in 0..n {
        let mean = middle[i];
        if mean.is_nan() {
            continue;
        }
        let window = &closes[i + 1 - period..=i];
        let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / period as f64;
        let width = multiplier * variance.sqrt();
        lower[i] = mean - width;
        upper[i] = mean + width;
    }

    BollingerBands {
        lower,
        middle,
        upper,
    }
}
