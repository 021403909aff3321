use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use common::{MarketDataProvider, Signal};
use strategy::{evaluate, Evaluation, SignalConfig};

/// Fans a symbol universe out over a bounded pool of tasks.
///
/// Each symbol is fetched and evaluated in its own task on a [`JoinSet`]; a
/// [`Semaphore`] caps how many are in flight. Tasks share only the provider
/// and the immutable signal config.
#[derive(Clone)]
pub struct Runner {
    provider: Arc<dyn MarketDataProvider>,
    config: Arc<SignalConfig>,
    lookback_days: u32,
    max_concurrency: usize,
}

impl Runner {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: SignalConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
            lookback_days: 400,
            max_concurrency: 10,
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    /// Zero is treated as one.
    pub fn with_max_concurrency(mut self, permits: usize) -> Self {
        self.max_concurrency = permits.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Scan every symbol. Signal order is not meaningful.
    pub async fn run(&self, symbols: &[String]) -> Vec<Signal> {
        let (_keep_open, shutdown) = watch::channel(false);
        self.run_until(symbols, shutdown).await
    }

    /// Scan until `shutdown` flips to `true`.
    ///
    /// Once shutdown is requested no further symbols are scheduled. Tasks
    /// already spawned run to completion and their signals are returned.
    pub async fn run_until(
        &self,
        symbols: &[String],
        mut shutdown: watch::Receiver<bool>,
    ) -> Vec<Signal> {
        info!(
            symbols = symbols.len(),
            workers = self.max_concurrency,
            lookback_days = self.lookback_days,
            "Scan starting"
        );

        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (scheduled, symbol) in symbols.iter().enumerate() {
            if *shutdown.borrow() {
                info!(remaining = symbols.len() - scheduled, "Shutdown requested, no new symbols scheduled");
                break;
            }
            let permit = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => {
                    info!(remaining = symbols.len() - scheduled, "Shutdown requested, no new symbols scheduled");
                    break;
                }
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let provider = self.provider.clone();
            let config = self.config.clone();
            let symbol = symbol.clone();
            let lookback_days = self.lookback_days;
            tasks.spawn(async move {
                let _permit = permit;
                scan_symbol(provider.as_ref(), &config, &symbol, lookback_days).await
            });
        }

        let mut signals = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(signal)) => signals.push(signal),
                Ok(None) => {}
                Err(e) if e.is_panic() => error!(error = %e, "Symbol task panicked"),
                Err(e) => warn!(error = %e, "Symbol task cancelled"),
            }
        }

        info!(signals = signals.len(), "Scan complete");
        signals
    }
}

/// Resolves once the flag is `true`. A dropped sender never resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Fetch and evaluate one symbol. Every failure is logged and becomes `None`.
pub async fn scan_symbol(
    provider: &dyn MarketDataProvider,
    config: &SignalConfig,
    symbol: &str,
    lookback_days: u32,
) -> Option<Signal> {
    let series = match provider.fetch_daily(symbol, lookback_days).await {
        Ok(series) => series,
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Fetch failed, skipping");
            return None;
        }
    };

    match evaluate(&series, config) {
        Ok(Evaluation::Signal(signal)) => {
            info!(
                symbol = %signal.symbol,
                action = %signal.action,
                score = signal.score,
                close = signal.close,
                "Signal"
            );
            Some(signal)
        }
        Ok(Evaluation::NoSignal { scores, trend }) => {
            debug!(symbol = %symbol, buy = scores.buy, sell = scores.sell, trend = %trend.state, "No signal");
            None
        }
        Ok(Evaluation::Filtered) => None,
        Err(e) if e.is_data_shortfall() => {
            warn!(symbol = %symbol, reason = %e, "Skipping symbol");
            None
        }
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Evaluation failed, skipping");
            None
        }
    }
}
