use crate::snapshot::ResolvedSnapshot;

/// Condition weights shared by both directions, in condition order:
/// ADX, RSI, MACD histogram, Bollinger band, EMA20/EMA50, StochRSI.
pub const WEIGHTS: [f64; 6] = [1.0, 0.8, 1.2, 0.6, 1.0, 1.0];

pub const ADX_TREND_STRENGTH: f64 = 20.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const STOCH_RSI_OVERSOLD: f64 = 20.0;
pub const STOCH_RSI_OVERBOUGHT: f64 = 80.0;

/// One direction's condition outcomes, in [`WEIGHTS`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionSet {
    pub conditions: [bool; 6],
}

impl ConditionSet {
    pub fn new(conditions: [bool; 6]) -> Self {
        Self { conditions }
    }

    pub fn buy(s: &ResolvedSnapshot) -> Self {
        Self::new([
            s.adx > ADX_TREND_STRENGTH,
            s.rsi < RSI_OVERSOLD,
            s.macd_hist > 0.0,
            s.close < s.bb_lower,
            s.ema20 > s.ema50,
            s.stoch_rsi_k < STOCH_RSI_OVERSOLD,
        ])
    }

    pub fn sell(s: &ResolvedSnapshot) -> Self {
        Self::new([
            s.adx > ADX_TREND_STRENGTH,
            s.rsi > RSI_OVERBOUGHT,
            s.macd_hist < 0.0,
            s.close > s.bb_upper,
            s.ema20 < s.ema50,
            s.stoch_rsi_k > STOCH_RSI_OVERBOUGHT,
        ])
    }

    /// Sum of weights of the true conditions.
    pub fn score(&self) -> f64 {
        WEIGHTS
            .iter()
            .zip(self.conditions)
            .filter(|(_, hit)| *hit)
            .fold(0.0, |acc, (w, _)| acc + w)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePair {
    pub buy: f64,
    pub sell: f64,
}

pub fn score(snapshot: &ResolvedSnapshot) -> ScorePair {
    ScorePair {
        buy: ConditionSet::buy(snapshot).score(),
        sell: ConditionSet::sell(snapshot).score(),
    }
}
