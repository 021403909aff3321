pub mod analysis;
pub mod backtest;
pub mod config;
pub mod decision;
pub mod indicators;
pub mod scoring;
pub mod snapshot;
pub mod trend;

pub use analysis::{evaluate, evaluate_at, screen, Evaluation};
pub use backtest::{replay, ReplayReport, RoundTrip};
pub use config::{SignalConfig, STRATEGY_VERSION};
pub use decision::{decide, DecisionThresholds};
pub use indicators::IndicatorFrame;
pub use scoring::{score, ConditionSet, ScorePair, WEIGHTS};
pub use snapshot::{IndicatorSnapshot, NeutralDefaults, ResolvedSnapshot};
pub use trend::{classify_trend, TrendReading, TrendState, TrendThresholds};
