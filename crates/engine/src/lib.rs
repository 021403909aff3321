pub mod backtest;
pub mod csv_source;
pub mod runner;
pub mod universe;
pub mod yahoo;

pub use backtest::backtest_symbols;
pub use csv_source::CsvDirProvider;
pub use runner::{scan_symbol, Runner};
pub use universe::{load_universe, normalize_symbols, parse_universe};
pub use yahoo::YahooProvider;
