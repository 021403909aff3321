use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, DataSource, MarketDataProvider, SignalSink};
use engine::{backtest_symbols, load_universe, normalize_symbols, CsvDirProvider, Runner, YahooProvider};
use paper::PaperSink;
use strategy::{RoundTrip, SignalConfig};

#[derive(Parser)]
#[command(name = "scanner", version, about = "Momentum signal scanner for daily equity data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a symbol universe and hand signals to the paper sink
    Scan {
        /// Ticker file (defaults to UNIVERSE_PATH)
        #[arg(long)]
        universe: Option<PathBuf>,
        /// Comma-separated symbols; overrides the universe file
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,
        /// Concurrent symbols (defaults to MAX_WORKERS)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Replay the signal engine over each symbol's history
    Backtest {
        #[arg(required = true)]
        symbols: Vec<String>,
        /// Round-trip CSV output
        #[arg(long, default_value = "data/backtest_results.csv")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("invalid environment configuration")?;
    let signal_cfg = SignalConfig::resolve(cfg.signal_config_path.as_deref())
        .context("invalid signal configuration")?;
    info!(source = %cfg.data_source, version = %signal_cfg.version, "Scanner starting");

    // ── Market data (injected based on DATA_SOURCE) ──────────────────────────
    let provider = build_provider(&cfg)?;

    match cli.command {
        Command::Scan {
            universe,
            symbols,
            workers,
        } => scan(&cfg, signal_cfg, provider, universe, symbols, workers).await,
        Command::Backtest { symbols, out } => {
            backtest(&cfg, &signal_cfg, provider.as_ref(), &symbols, &out).await
        }
    }
}

fn build_provider(cfg: &Config) -> anyhow::Result<Arc<dyn MarketDataProvider>> {
    let provider: Arc<dyn MarketDataProvider> = match cfg.data_source {
        DataSource::Yahoo => {
            info!("Using Yahoo Finance chart API");
            Arc::new(YahooProvider::new()?)
        }
        DataSource::Csv => {
            info!(dir = %cfg.data_dir, "Using CSV directory");
            Arc::new(CsvDirProvider::new(&cfg.data_dir))
        }
    };
    Ok(provider)
}

async fn scan(
    cfg: &Config,
    signal_cfg: SignalConfig,
    provider: Arc<dyn MarketDataProvider>,
    universe: Option<PathBuf>,
    symbols: Vec<String>,
    workers: Option<usize>,
) -> anyhow::Result<()> {
    let symbols = if symbols.is_empty() {
        let path = universe.unwrap_or_else(|| PathBuf::from(&cfg.universe_path));
        load_universe(&path, &cfg.symbol_suffix)
            .with_context(|| format!("failed to read universe {}", path.display()))?
    } else {
        normalize_symbols(symbols.iter().map(String::as_str), &cfg.symbol_suffix)
    };
    if symbols.is_empty() {
        bail!("symbol universe is empty");
    }

    let runner = Runner::new(provider, signal_cfg)
        .with_lookback_days(cfg.lookback_days)
        .with_max_concurrency(workers.unwrap_or(cfg.max_workers));

    // Ctrl-C stops scheduling; in-flight symbols still finish
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown signal received. Finishing in-flight symbols.");
            let _ = shutdown_tx.send(true);
        }
    });

    let signals = runner.run_until(&symbols, shutdown_rx).await;

    let sink = PaperSink::new();
    let summary = sink.execute(&signals).await?;
    info!(
        scanned = symbols.len(),
        signals = summary.total(),
        "Strategy execution completed"
    );
    Ok(())
}

async fn backtest(
    cfg: &Config,
    signal_cfg: &SignalConfig,
    provider: &dyn MarketDataProvider,
    symbols: &[String],
    out: &Path,
) -> anyhow::Result<()> {
    let symbols = normalize_symbols(symbols.iter().map(String::as_str), &cfg.symbol_suffix);
    let reports = backtest_symbols(provider, signal_cfg, &symbols, cfg.lookback_days).await;

    let trips: Vec<&RoundTrip> = reports.iter().flat_map(|r| &r.round_trips).collect();
    write_round_trips(out, &trips)?;

    let open = reports.iter().filter(|r| r.is_open()).count();
    info!(
        path = %out.display(),
        round_trips = trips.len(),
        open_positions = open,
        "Backtest results written"
    );
    Ok(())
}

fn write_round_trips(out: &Path, trips: &[&RoundTrip]) -> anyhow::Result<()> {
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("failed to open {}", out.display()))?;
    for trip in trips {
        writer.serialize(trip)?;
    }
    writer.flush()?;
    Ok(())
}
