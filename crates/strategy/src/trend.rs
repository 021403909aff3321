use serde::{Deserialize, Serialize};

/// Bars spanned by the EMA-200 slope test (the value compared against is the
/// sixth from the end of the history).
pub const SLOPE_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendState {
    Up,
    Down,
    Neutral,
}

impl std::fmt::Display for TrendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendState::Up => write!(f, "up"),
            TrendState::Down => write!(f, "down"),
            TrendState::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendReading {
    pub state: TrendState,
    /// Raw EMA-200 change over the slope window.
    pub slope: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendThresholds {
    /// Required distance of close from EMA-200, as a fraction of EMA-200.
    pub distance: f64,
    /// Required EMA-200 slope, as a fraction of the earlier EMA-200 value.
    pub slope_pct: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            distance: 0.01,
            slope_pct: 0.01,
        }
    }
}

/// Classify the trend from the latest close, the latest EMA-200 and the
/// EMA-200 history ending at that bar.
///
/// Fewer than [`SLOPE_WINDOW`] history values, or an undefined earlier value,
/// give a zero slope and a neutral trend.
pub fn classify_trend(
    ema200_history: &[f64],
    close: f64,
    ema200: f64,
    thresholds: &TrendThresholds,
) -> TrendReading {
    let prev = ema200_history
        .len()
        .checked_sub(SLOPE_WINDOW)
        .map(|i| ema200_history[i])
        .filter(|v| v.is_finite());

    let Some(prev) = prev else {
        return TrendReading {
            state: TrendState::Neutral,
            slope: 0.0,
        };
    };

    let slope = ema200 - prev;
    let slope_pct = if prev != 0.0 { slope / prev } else { 0.0 };

    let state = if close > ema200 * (1.0 + thresholds.distance) && slope_pct > thresholds.slope_pct
    {
        TrendState::Up
    } else if close < ema200 * (1.0 - thresholds.distance) && slope_pct < -thresholds.slope_pct {
        TrendState::Down
    } else {
        TrendState::Neutral
    };

    TrendReading { state, slope }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: TrendThresholds = TrendThresholds {
        distance: 0.01,
        slope_pct: 0.01,
    };

    #[test]
    fn rising_ema_with_close_above_is_up() {
        let history = [100.0, 100.5, 101.0, 101.5, 102.0, 102.5];
        let reading = classify_trend(&history, 110.0, 102.5, &T);
        assert_eq!(reading.state, TrendState::Up);
        assert!((reading.slope - 2.5).abs() < 1e-12);
    }

    #[test]
    fn falling_ema_with_close_below_is_down() {
        let history = [100.0, 99.5, 99.0, 98.5, 98.0, 97.5];
        let reading = classify_trend(&history, 90.0, 97.5, &T);
        assert_eq!(reading.state, TrendState::Down);
        assert!((reading.slope + 2.5).abs() < 1e-12);
    }

    #[test]
    fn close_near_ema_is_neutral() {
        let history = [100.0, 100.5, 101.0, 101.5, 102.0, 102.5];
        // 103.0 is within 1% of 102.5
        let reading = classify_trend(&history, 103.0, 102.5, &T);
        assert_eq!(reading.state, TrendState::Neutral);
    }

    #[test]
    fn flat_slope_is_neutral_even_far_from_ema() {
        let history = [100.0, 100.1, 100.2, 100.3, 100.4, 100.5];
        let reading = classify_trend(&history, 150.0, 100.5, &T);
        assert_eq!(reading.state, TrendState::Neutral);
    }

    #[test]
    fn short_history_defaults_to_neutral_zero_slope() {
        let history = [100.0, 110.0, 120.0, 130.0, 140.0];
        let reading = classify_trend(&history, 200.0, 140.0, &T);
        assert_eq!(reading.state, TrendState::Neutral);
        assert_eq!(reading.slope, 0.0);
    }

    #[test]
    fn zero_reference_gives_zero_slope_pct() {
        let history = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let reading = classify_trend(&history, 100.0, 5.0, &T);
        assert_eq!(reading.state, TrendState::Neutral);
        assert_eq!(reading.slope, 5.0);
    }

    #[test]
    fn uses_sixth_value_from_end() {
        let history = [1.0, 2.0, 100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        let reading = classify_trend(&history, 120.0, 105.0, &T);
        assert_eq!(reading.slope, 5.0);
    }
}
