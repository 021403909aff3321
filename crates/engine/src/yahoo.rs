//! Yahoo Finance daily bars via the v8 chart API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::frame::{normalize, RawCell, RawColumn, RawFrame};
use common::{Error, MarketDataProvider, PriceSeries, Result};

const BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

pub struct YahooProvider {
    http: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point at a different host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chart_url(&self, symbol: &str, lookback_days: u32) -> String {
        format!(
            "{}/v8/finance/chart/{symbol}?range={lookback_days}d&interval=1d",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_daily(&self, symbol: &str, lookback_days: u32) -> Result<PriceSeries> {
        let url = self.chart_url(symbol, lookback_days);
        debug!(symbol = %symbol, url = %url, "Fetching daily bars");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Provider(format!(
                "{symbol}: HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let frame = parse_chart(symbol, &body)?;
        Ok(normalize(symbol, frame)?.tail(lookback_days as usize))
    }
}

/// Map a chart API body onto a raw frame with single-level OHLCV columns.
///
/// Timestamps are shifted by the exchange's GMT offset before taking the
/// calendar date.
pub fn parse_chart(symbol: &str, body: &str) -> Result<RawFrame> {
    let resp: ChartResponse = serde_json::from_str(body)
        .map_err(|e| Error::Provider(format!("{symbol}: malformed chart response: {e}")))?;

    let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(match resp.chart.error {
            Some(err) => Error::Provider(format!("{symbol}: {}: {}", err.code, err.description)),
            None => Error::Provider(format!("{symbol}: empty chart result")),
        });
    };

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let index = timestamps
        .iter()
        .map(|&ts| {
            DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| Error::Provider(format!("{symbol}: invalid timestamp {ts}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let column = |name: &str, values: Vec<Option<f64>>| {
        let mut cells: Vec<RawCell> = values.into_iter().map(RawCell::from).collect();
        // Yahoo occasionally returns short arrays for the trailing bar
        cells.resize(index.len(), RawCell::Empty);
        RawColumn::single(name, cells)
    };

    let columns = vec![
        column("Open", quote.open),
        column("High", quote.high),
        column("Low", quote.low),
        column("Close", quote.close),
        column("Volume", quote.volume),
    ];
    Ok(RawFrame { index, columns })
}
