pub mod config;
pub mod error;
pub mod frame;
pub mod provider;
pub mod types;

pub use config::{Config, DataSource};
pub use error::{Error, Result};
pub use provider::{ExecutionSummary, MarketDataProvider, SignalSink};
pub use types::*;
