//! Replay the signal engine over one symbol's history.
//!
//! Each bar from [`REPLAY_START`] onward is evaluated as if it were the latest
//! bar. Long-only: a BUY while flat opens a position, a SELL while long closes
//! it. The final bar is not replayed.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::trace;

use common::{Action, PriceSeries};

use crate::analysis::{evaluate_at, screen, Evaluation};
use crate::config::SignalConfig;
use crate::indicators::IndicatorFrame;

/// First bar index replayed; earlier bars only warm indicators up.
pub const REPLAY_START: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FillSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayFill {
    pub symbol: String,
    pub side: FillSide,
    pub date: NaiveDate,
    pub price: f64,
}

/// A completed entry/exit pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundTrip {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub return_pct: f64,
}

impl RoundTrip {
    fn new(symbol: &str, entry: &ReplayFill, exit: &ReplayFill) -> Self {
        Self {
            symbol: symbol.to_string(),
            entry_date: entry.date,
            entry_price: entry.price,
            exit_date: exit.date,
            exit_price: exit.price,
            return_pct: (exit.price / entry.price - 1.0) * 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub fills: Vec<ReplayFill>,
    pub round_trips: Vec<RoundTrip>,
}

impl ReplayReport {
    /// True when the last fill opened a position that was never closed.
    pub fn is_open(&self) -> bool {
        matches!(self.fills.last(), Some(f) if f.side == FillSide::Buy)
    }
}

pub fn replay(series: &PriceSeries, cfg: &SignalConfig) -> ReplayReport {
    let mut report = ReplayReport::default();
    if series.len() <= REPLAY_START + 1 {
        return report;
    }

    let frame = IndicatorFrame::compute(series);
    let mut entry: Option<ReplayFill> = None;

    for i in REPLAY_START..series.len() - 1 {
        let Some(action) = action_at(series, &frame, i, cfg) else {
            continue;
        };
        let bar = &series.bars()[i];

        match (action, entry.take()) {
            (Action::Buy, None) => {
                let fill = ReplayFill {
                    symbol: series.symbol().to_string(),
                    side: FillSide::Buy,
                    date: bar.date,
                    price: bar.close,
                };
                report.fills.push(fill.clone());
                entry = Some(fill);
            }
            (Action::Sell, Some(open)) => {
                let fill = ReplayFill {
                    symbol: series.symbol().to_string(),
                    side: FillSide::Sell,
                    date: bar.date,
                    price: bar.close,
                };
                report
                    .round_trips
                    .push(RoundTrip::new(series.symbol(), &open, &fill));
                report.fills.push(fill);
            }
            (_, still_open) => entry = still_open,
        }
    }
    report
}

fn action_at(
    series: &PriceSeries,
    frame: &IndicatorFrame,
    i: usize,
    cfg: &SignalConfig,
) -> Option<Action> {
    let evaluation = match screen(series, i, cfg) {
        Ok(None) => evaluate_at(series, frame, i, cfg),
        Ok(Some(filtered)) => Ok(filtered),
        Err(e) => Err(e),
    };
    match evaluation {
        Ok(Evaluation::Signal(signal)) => Some(signal.action),
        Ok(_) => None,
        Err(e) => {
            trace!(symbol = %series.symbol(), bar = i, error = %e, "Bar skipped");
            None
        }
    }
}
