use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use common::{Action, ExecutionSummary, Result, Signal, SignalSink};

/// Simulated execution sink.
///
/// Logs one line per signal and tallies actions. No orders are ever placed.
#[derive(Default)]
pub struct PaperSink {
    /// Every signal handled so far, in execution order.
    executed: Arc<RwLock<Vec<Signal>>>,
}

impl PaperSink {
    pub fn new() -> Self {
        info!("PaperSink initialized, signals will be logged only");
        Self::default()
    }

    /// Expose the execution log (for reporting and tests).
    pub fn executed_handle(&self) -> Arc<RwLock<Vec<Signal>>> {
        self.executed.clone()
    }
}

/// `BUYING`, `SELLING` or `WATCHING`.
fn verb(action: Action) -> String {
    format!("{action}ING")
}

#[async_trait]
impl SignalSink for PaperSink {
    async fn execute(&self, signals: &[Signal]) -> Result<ExecutionSummary> {
        let mut summary = ExecutionSummary::default();

        for s in signals {
            match s.action {
                Action::Buy => summary.buy += 1,
                Action::Sell => summary.sell += 1,
                Action::Watch => summary.watch += 1,
            }
            info!(
                "[SIMULATION] {}: {} @ {} (Confidence: {})",
                verb(s.action),
                s.symbol,
                s.close,
                s.score
            );
        }
        self.executed.write().await.extend_from_slice(signals);

        info!(
            "BUY: {}, SELL: {}, WATCH: {}",
            summary.buy, summary.sell, summary.watch
        );
        Ok(summary)
    }
}
