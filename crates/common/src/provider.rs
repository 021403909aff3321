use async_trait::async_trait;

use crate::{PriceSeries, Result, Signal};

/// Source of daily OHLCV history.
///
/// Implementations must return a normalized series (see [`crate::frame`]).
/// Failures are per-symbol; callers never retry.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch up to `lookback_days` of daily bars for `symbol`.
    async fn fetch_daily(&self, symbol: &str, lookback_days: u32) -> Result<PriceSeries>;
}

/// Per-action counts reported by a sink after handling a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub buy: usize,
    pub sell: usize,
    pub watch: usize,
}

impl ExecutionSummary {
    pub fn total(&self) -> usize {
        self.buy + self.sell + self.watch
    }
}

/// Receives the final signal list of a run.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn execute(&self, signals: &[Signal]) -> Result<ExecutionSummary>;
}
