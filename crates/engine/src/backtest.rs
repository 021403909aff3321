use tracing::{info, warn};

use common::MarketDataProvider;
use strategy::{replay, ReplayReport, SignalConfig};

/// Replay the signal engine over each symbol's history, one symbol at a time.
///
/// Symbols that cannot be fetched are logged and left out of the result.
pub async fn backtest_symbols(
    provider: &dyn MarketDataProvider,
    config: &SignalConfig,
    symbols: &[String],
    lookback_days: u32,
) -> Vec<ReplayReport> {
    let mut reports = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let series = match provider.fetch_daily(symbol, lookback_days).await {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Fetch failed, skipping backtest");
                continue;
            }
        };

        let report = replay(&series, config);
        info!(
            symbol = %symbol,
            bars = series.len(),
            fills = report.fills.len(),
            round_trips = report.round_trips.len(),
            open = report.is_open(),
            "Backtest complete"
        );
        reports.push(report);
    }
    reports
}
