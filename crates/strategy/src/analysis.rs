//! Per-symbol pipeline: screen → indicators → trend → score → decide.

use tracing::debug;

use common::{Bar, Error, PriceSeries, Result, Signal};

use crate::config::SignalConfig;
use crate::decision::{decide, signal_score};
use crate::indicators::{IndicatorFrame, EMA_200};
use crate::scoring::{score, ScorePair};
use crate::snapshot::IndicatorSnapshot;
use crate::trend::{classify_trend, TrendReading};

/// Outcome of evaluating one symbol at one bar.
///
/// Data shortfalls (too few bars, missing indicator columns) are returned as
/// errors so callers can log them; the liquidity/price floor is an expected
/// filter and is reported as [`Evaluation::Filtered`].
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Signal(Signal),
    NoSignal {
        scores: ScorePair,
        trend: TrendReading,
    },
    Filtered,
}

impl Evaluation {
    pub fn into_signal(self) -> Option<Signal> {
        match self {
            Evaluation::Signal(signal) => Some(signal),
            _ => None,
        }
    }
}

/// Evaluate the latest bar of `series`.
pub fn evaluate(series: &PriceSeries, cfg: &SignalConfig) -> Result<Evaluation> {
    let Some(last) = series.len().checked_sub(1) else {
        return Err(insufficient(series, 0, cfg.min_bars));
    };
    if let Some(filtered) = screen(series, last, cfg)? {
        return Ok(filtered);
    }
    let frame = IndicatorFrame::compute(series);
    evaluate_at(series, &frame, last, cfg)
}

/// Cheap checks that run before any indicator math: minimum history and the
/// latest-bar volume/price floor. `Ok(Some(Filtered))` means skip quietly.
///
/// A missing latest close or volume fails the floor.
pub fn screen(series: &PriceSeries, i: usize, cfg: &SignalConfig) -> Result<Option<Evaluation>> {
    let bars = i + 1;
    if bars < cfg.min_bars {
        return Err(insufficient(series, bars, cfg.min_bars));
    }
    let latest = &series.bars()[i];
    if passes_floor(latest, cfg) {
        Ok(None)
    } else {
        debug!(symbol = %series.symbol(), close = latest.close, volume = latest.volume, "Below volume/price floor");
        Ok(Some(Evaluation::Filtered))
    }
}

fn passes_floor(bar: &Bar, cfg: &SignalConfig) -> bool {
    bar.volume >= cfg.min_volume && bar.close >= cfg.min_close
}

/// Score bar `i` of `series` using a precomputed indicator frame.
///
/// Indicators are causal, so a frame computed over the whole series gives the
/// same values at `i` as one computed over `series[..=i]`.
pub fn evaluate_at(
    series: &PriceSeries,
    frame: &IndicatorFrame,
    i: usize,
    cfg: &SignalConfig,
) -> Result<Evaluation> {
    let bars = i + 1;
    if bars < cfg.min_trend_bars {
        return Err(insufficient(series, bars, cfg.min_trend_bars));
    }
    // the trend test needs a defined EMA-200 at this bar, not a neutral default
    let ema200_column = frame
        .column(EMA_200)
        .filter(|_| frame.value_at(EMA_200, i).is_some())
        .ok_or_else(|| Error::MissingColumn {
            symbol: series.symbol().to_string(),
            column: EMA_200.to_string(),
        })?;

    let close = series.bars()[i].close;
    let snapshot = IndicatorSnapshot::at(frame, close, i).resolve(&cfg.neutral_defaults);
    let trend = classify_trend(
        &ema200_column[..=i],
        snapshot.close,
        snapshot.ema200,
        &cfg.trend_thresholds(),
    );
    let scores = score(&snapshot);

    debug!(
        symbol = %series.symbol(),
        buy = scores.buy,
        sell = scores.sell,
        trend = %trend.state,
        slope = trend.slope,
        adx = snapshot.adx,
        rsi = snapshot.rsi,
        macd_hist = snapshot.macd_hist,
        stoch_rsi_k = snapshot.stoch_rsi_k,
        "Scored"
    );

    Ok(match decide(scores, trend.state, &cfg.decision_thresholds()) {
        Some(action) => Evaluation::Signal(Signal {
            symbol: series.symbol().to_string(),
            action,
            score: signal_score(action, scores),
            close: snapshot.close,
            version: cfg.version.clone(),
        }),
        None => Evaluation::NoSignal { scores, trend },
    })
}

fn insufficient(series: &PriceSeries, bars: usize, required: usize) -> Error {
    Error::InsufficientData {
        symbol: series.symbol().to_string(),
        bars,
        required,
    }
}
