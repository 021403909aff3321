use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Market data provider error: {0}")]
    Provider(String),

    #[error("Insufficient data for {symbol}: {bars} bars, need {required}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        required: usize,
    },

    #[error("Column '{column}' missing for {symbol}")]
    MissingColumn { symbol: String, column: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Data-shape problems are expected in a large universe and are reported
    /// as warnings rather than errors.
    pub fn is_data_shortfall(&self) -> bool {
        matches!(self, Error::InsufficientData { .. } | Error::MissingColumn { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
