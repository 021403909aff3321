use common::Action;

use crate::scoring::ScorePair;
use crate::trend::TrendState;

/// Maximum score gap for which a neutral-trend symbol is put on watch.
pub const WATCH_BAND: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionThresholds {
    pub buy: f64,
    pub sell: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            buy: 2.5,
            sell: 3.0,
        }
    }
}

/// Turn a score pair and trend into an action. `None` drops the symbol.
///
/// BUY is checked before SELL. Both need strict dominance over the other
/// side, so a tie never produces a directional signal.
pub fn decide(
    scores: ScorePair,
    trend: TrendState,
    thresholds: &DecisionThresholds,
) -> Option<Action> {
    let ScorePair { buy, sell } = scores;

    if buy >= thresholds.buy && buy > sell && trend == TrendState::Up {
        Some(Action::Buy)
    } else if sell >= thresholds.sell && sell > buy && trend == TrendState::Down {
        Some(Action::Sell)
    } else if (buy - sell).abs() < WATCH_BAND && trend == TrendState::Neutral {
        Some(Action::Watch)
    } else {
        None
    }
}

/// Score reported with a signal: the acting side, or the larger side for WATCH.
pub fn signal_score(action: Action, scores: ScorePair) -> f64 {
    let raw = match action {
        Action::Buy => scores.buy,
        Action::Sell => scores.sell,
        Action::Watch => scores.buy.max(scores.sell),
    };
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: DecisionThresholds = DecisionThresholds {
        buy: 2.5,
        sell: 3.0,
    };

    fn pair(buy: f64, sell: f64) -> ScorePair {
        ScorePair { buy, sell }
    }

    #[test]
    fn full_buy_score_in_uptrend_buys() {
        assert_eq!(decide(pair(5.6, 0.0), TrendState::Up, &T), Some(Action::Buy));
    }

    #[test]
    fn buy_needs_uptrend() {
        assert_eq!(decide(pair(5.6, 0.0), TrendState::Neutral, &T), None);
        assert_eq!(decide(pair(5.6, 0.0), TrendState::Down, &T), None);
    }

    #[test]
    fn buy_threshold_is_inclusive() {
        assert_eq!(decide(pair(2.5, 1.0), TrendState::Up, &T), Some(Action::Buy));
        assert_eq!(decide(pair(2.5 - 1e-9, 1.0), TrendState::Up, &T), None);
    }

    #[test]
    fn sell_threshold_is_inclusive() {
        assert_eq!(decide(pair(1.0, 3.0), TrendState::Down, &T), Some(Action::Sell));
        assert_eq!(decide(pair(1.0, 2.99), TrendState::Down, &T), None);
    }

    #[test]
    fn sell_needs_downtrend() {
        assert_eq!(decide(pair(0.0, 4.0), TrendState::Up, &T), None);
    }

    #[test]
    fn tie_never_signals_direction() {
        for trend in [TrendState::Up, TrendState::Down] {
            assert_eq!(decide(pair(3.5, 3.5), trend, &T), None);
        }
        assert_eq!(decide(pair(3.5, 3.5), TrendState::Neutral, &T), Some(Action::Watch));
    }

    #[test]
    fn quiet_neutral_market_is_watched() {
        assert_eq!(decide(pair(0.0, 0.0), TrendState::Neutral, &T), Some(Action::Watch));
        let score = signal_score(Action::Watch, pair(0.0, 0.0));
        assert_eq!(score, 0.0);
        assert!(!score.is_sign_negative());
    }

    #[test]
    fn wide_gap_in_neutral_trend_is_dropped() {
        assert_eq!(decide(pair(1.8, 1.0), TrendState::Neutral, &T), None);
        assert_eq!(decide(pair(1.0, 1.5), TrendState::Neutral, &T), None);
    }

    #[test]
    fn watch_score_is_larger_side_rounded() {
        assert_eq!(signal_score(Action::Watch, pair(1.2, 1.6)), 1.6);
        assert_eq!(signal_score(Action::Buy, pair(1.0 + 0.8 + 1.2, 0.0)), 3.0);
        assert_eq!(signal_score(Action::Sell, pair(0.0, 0.6 + 1.0 + 1.0 + 0.8)), 3.4);
    }
}
