//! Offline provider reading one CSV file per symbol.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use common::frame::{normalize, RawCell, RawColumn, RawFrame};
use common::{Error, MarketDataProvider, PriceSeries, Result};

/// Reads `<dir>/<SYMBOL>.csv`.
///
/// Accepts a plain `Date,Open,High,Low,Close,Volume` header as well as the
/// stacked layout written by common download tools:
///
/// ```text
/// Price,Close,High,Low,Open,Volume
/// Ticker,TITAN.NS,TITAN.NS,TITAN.NS,TITAN.NS,TITAN.NS
/// Date,,,,,
/// 2024-01-02,3680.0,3700.0,3620.0,3650.0,812345
/// ```
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

#[async_trait]
impl MarketDataProvider for CsvDirProvider {
    async fn fetch_daily(&self, symbol: &str, lookback_days: u32) -> Result<PriceSeries> {
        let path = self.path_for(symbol);
        debug!(symbol = %symbol, path = %path.display(), "Reading daily bars");
        let text = tokio::fs::read_to_string(&path).await?;
        let frame = parse_csv(symbol, &text)?;
        Ok(normalize(symbol, frame)?.tail(lookback_days as usize))
    }
}

/// First column is the date index. Leading rows whose first cell is not a
/// date are header levels, outermost first.
pub fn parse_csv(symbol: &str, text: &str) -> Result<RawFrame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut headers: Vec<csv::StringRecord> = Vec::new();
    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Parse(format!("{symbol}: {e}")))?;
        let first = record.get(0).unwrap_or_default();
        if rows.is_empty() && parse_date(first).is_none() {
            headers.push(record);
        } else if !first.is_empty() {
            rows.push(record);
        }
    }

    let width = headers.iter().chain(&rows).map(|r| r.len()).max().unwrap_or(0);

    let index = rows
        .iter()
        .map(|r| {
            let raw = r.get(0).unwrap_or_default();
            parse_date(raw).ok_or_else(|| Error::Parse(format!("{symbol}: bad date '{raw}'")))
        })
        .collect::<Result<Vec<_>>>()?;

    let columns = (1..width)
        .map(|j| {
            let header = headers
                .iter()
                .map(|h| h.get(j).unwrap_or_default().to_string())
                .collect();
            let cells = rows.iter().map(|r| cell(r.get(j).unwrap_or_default())).collect();
            RawColumn::new(header, cells)
        })
        .collect();

    Ok(RawFrame { index, columns })
}

/// `2024-01-02`, optionally followed by a time and zone.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

fn cell(raw: &str) -> RawCell {
    if raw.is_empty() {
        RawCell::Empty
    } else {
        raw.parse()
            .map(RawCell::Number)
            .unwrap_or_else(|_| RawCell::Text(raw.to_string()))
    }
}
