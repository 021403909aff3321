use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::watch;

use common::{Action, Bar, Error, MarketDataProvider, PriceSeries, Result, Signal};
use engine::{backtest_symbols, scan_symbol, Runner};
use strategy::SignalConfig;

fn series_with(symbol: &str, n: usize, close: fn(usize) -> f64, volume: f64) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars = (0..n)
        .map(|i| {
            let c = close(i);
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume,
            }
        })
        .collect();
    PriceSeries::new(symbol, bars)
}

fn uptrend(i: usize) -> f64 {
    100.0 * (0.004 * i as f64).exp() + 3.0 * (i as f64 * 0.5).sin()
}

fn downtrend(i: usize) -> f64 {
    400.0 * (-0.004 * i as f64).exp() + 3.0 * (i as f64 * 0.5).sin()
}

fn sideways(i: usize) -> f64 {
    150.0 + 10.0 * (i as f64 * 0.1).sin()
}

/// Serves canned series; unknown symbols fail, `PANIC.NS` panics.
#[derive(Default)]
struct InMemoryProvider {
    series: HashMap<String, PriceSeries>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryProvider {
    fn with(mut self, series: PriceSeries) -> Self {
        self.series.insert(series.symbol().to_string(), series);
        self
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn fetch_daily(&self, symbol: &str, _lookback_days: u32) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if symbol == "PANIC.NS" {
            panic!("provider blew up");
        }
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::Provider(format!("{symbol}: no data")))
    }
}

fn mixed_universe() -> InMemoryProvider {
    InMemoryProvider::default()
        .with(series_with("UP.NS", 294, uptrend, 1_000_000.0))
        .with(series_with("DOWN.NS", 300, downtrend, 1_000_000.0))
        .with(series_with("FLAT.NS", 294, sideways, 1_000_000.0))
        .with(series_with("SHORT.NS", 49, uptrend, 1_000_000.0))
        .with(series_with("THIN.NS", 294, uptrend, 50_000.0))
        .with(series_with("YOUNG.NS", 200, uptrend, 1_000_000.0))
}

fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn by_symbol(mut signals: Vec<Signal>) -> Vec<(String, Action, f64)> {
    signals.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    signals
        .into_iter()
        .map(|s| (s.symbol, s.action, s.score))
        .collect()
}

#[tokio::test]
async fn scan_emits_one_signal_per_qualifying_symbol() {
    let runner = Runner::new(Arc::new(mixed_universe()), SignalConfig::default());
    let signals = runner
        .run(&symbols(&[
            "UP.NS", "DOWN.NS", "FLAT.NS", "SHORT.NS", "THIN.NS", "YOUNG.NS", "MISSING.NS",
        ]))
        .await;

    assert_eq!(
        by_symbol(signals),
        vec![
            ("DOWN.NS".to_string(), Action::Sell, 3.2),
            ("FLAT.NS".to_string(), Action::Watch, 3.2),
            ("UP.NS".to_string(), Action::Buy, 3.2),
        ]
    );
}

#[tokio::test]
async fn pool_size_does_not_change_results() {
    let universe = symbols(&["UP.NS", "DOWN.NS", "FLAT.NS", "SHORT.NS", "THIN.NS", "MISSING.NS"]);
    let provider: Arc<InMemoryProvider> = Arc::new(mixed_universe());

    let serial = Runner::new(provider.clone(), SignalConfig::default())
        .with_max_concurrency(1)
        .run(&universe)
        .await;
    let pooled = Runner::new(provider, SignalConfig::default())
        .with_max_concurrency(10)
        .run(&universe)
        .await;

    assert_eq!(by_symbol(serial), by_symbol(pooled));
}

#[tokio::test]
async fn in_flight_fetches_never_exceed_permits() {
    let provider = Arc::new(InMemoryProvider {
        delay: Some(Duration::from_millis(5)),
        ..InMemoryProvider::default()
    });
    let universe: Vec<String> = (0..24).map(|i| format!("S{i}.NS")).collect();

    let signals = Runner::new(provider.clone(), SignalConfig::default())
        .with_max_concurrency(3)
        .run(&universe)
        .await;

    assert!(signals.is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 24);
    let peak = provider.peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 3, "peak in-flight was {peak}");
}

#[tokio::test]
async fn panicking_symbol_does_not_sink_the_batch() {
    let runner = Runner::new(Arc::new(mixed_universe()), SignalConfig::default());
    let signals = runner.run(&symbols(&["PANIC.NS", "UP.NS"])).await;
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].symbol, "UP.NS");
}

#[tokio::test]
async fn shutdown_before_start_schedules_nothing() {
    let provider = Arc::new(mixed_universe());
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let signals = Runner::new(provider.clone(), SignalConfig::default())
        .run_until(&symbols(&["UP.NS", "DOWN.NS"]), rx)
        .await;

    assert!(signals.is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

/// Requests shutdown from inside every fetch.
struct ShutdownOnFetch {
    inner: InMemoryProvider,
    shutdown: watch::Sender<bool>,
}

#[async_trait]
impl MarketDataProvider for ShutdownOnFetch {
    async fn fetch_daily(&self, symbol: &str, lookback_days: u32) -> Result<PriceSeries> {
        self.shutdown.send_replace(true);
        self.inner.fetch_daily(symbol, lookback_days).await
    }
}

#[tokio::test]
async fn in_flight_symbol_finishes_after_shutdown() {
    let (tx, rx) = watch::channel(false);
    let provider = Arc::new(ShutdownOnFetch {
        inner: mixed_universe(),
        shutdown: tx,
    });

    let signals = Runner::new(provider.clone(), SignalConfig::default())
        .with_max_concurrency(1)
        .run_until(&symbols(&["UP.NS", "DOWN.NS", "FLAT.NS"]), rx)
        .await;

    assert_eq!(by_symbol(signals), vec![("UP.NS".to_string(), Action::Buy, 3.2)]);
    assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backtest_skips_unfetchable_symbols() {
    let provider = InMemoryProvider::default().with(series_with("UP.NS", 300, uptrend, 1_000_000.0));
    let reports = backtest_symbols(
        &provider,
        &SignalConfig::default(),
        &symbols(&["UP.NS", "MISSING.NS"]),
        400,
    )
    .await;

    assert_eq!(reports.len(), 1);
    assert!(reports[0].fills.iter().all(|f| f.symbol == "UP.NS"));
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

#[tokio::test]
async fn short_history_is_skipped_with_a_warning() {
    let (logs, _guard) = capture_logs();
    let provider = mixed_universe();

    let signal = scan_symbol(&provider, &SignalConfig::default(), "SHORT.NS", 400).await;

    assert!(signal.is_none());
    let out = logs.contents();
    let line = out
        .lines()
        .find(|l| l.contains("Skipping symbol"))
        .unwrap_or_else(|| panic!("no skip warning in:\n{out}"));
    assert!(line.contains("WARN"));
    assert!(line.contains("SHORT.NS"));
    assert!(line.contains("49"), "bar count missing from: {line}");
}

#[tokio::test]
async fn thin_volume_is_filtered_without_a_warning() {
    let (logs, _guard) = capture_logs();
    let provider = mixed_universe();

    let signal = scan_symbol(&provider, &SignalConfig::default(), "THIN.NS", 400).await;

    assert!(signal.is_none());
    assert!(!logs.contents().contains("WARN"));
}
