//! Normalization of provider-shaped tables into a [`PriceSeries`].
//!
//! Providers hand back loosely shaped tables: multi-level headers such as
//! `("Close", "TITAN.NS")`, flattened variants like `Close_TITAN.NS`, repeated
//! columns, and text where numbers are expected. Everything funnels through
//! [`normalize`] so the rest of the pipeline only ever sees single-level
//! Open/High/Low/Close/Volume bars indexed by date.

use chrono::NaiveDate;

use crate::{Bar, Error, PriceSeries, Result};

/// Columns every normalized series must carry, in bar field order.
pub const REQUIRED_FIELDS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Empty,
}

impl RawCell {
    /// Coerce to a float. Anything non-numeric becomes `NaN`.
    pub fn to_f64(&self) -> f64 {
        match self {
            RawCell::Number(v) => *v,
            RawCell::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            RawCell::Empty => f64::NAN,
        }
    }
}

impl From<Option<f64>> for RawCell {
    fn from(v: Option<f64>) -> Self {
        v.map(RawCell::Number).unwrap_or(RawCell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    /// Header levels, outermost first.
    pub header: Vec<String>,
    pub cells: Vec<RawCell>,
}

impl RawColumn {
    pub fn new(header: Vec<String>, cells: Vec<RawCell>) -> Self {
        Self { header, cells }
    }

    /// Single-level column, the common case for JSON providers.
    pub fn single(name: &str, cells: Vec<RawCell>) -> Self {
        Self::new(vec![name.to_string()], cells)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    pub index: Vec<NaiveDate>,
    pub columns: Vec<RawColumn>,
}

/// Position in [`REQUIRED_FIELDS`] of the field a column carries, if any.
fn field_index(symbol: &str, header: &[String]) -> Option<usize> {
    let first = header.iter().map(|h| h.trim()).find(|h| !h.is_empty())?;
    let suffix = format!("_{symbol}");
    let name = first.strip_suffix(suffix.as_str()).unwrap_or(first);
    REQUIRED_FIELDS
        .iter()
        .position(|f| f.eq_ignore_ascii_case(name))
}

/// Flatten headers, drop duplicated columns (first wins), coerce cells and
/// build a date-ordered series.
///
/// Rows where every field is missing are dropped, as are duplicate dates.
pub fn normalize(symbol: &str, frame: RawFrame) -> Result<PriceSeries> {
    let rows = frame.index.len();
    let mut fields: [Option<Vec<f64>>; 5] = Default::default();

    for column in &frame.columns {
        let Some(i) = field_index(symbol, &column.header) else {
            continue;
        };
        if column.cells.len() != rows {
            return Err(Error::Parse(format!(
                "{symbol}: column '{}' has {} cells for {rows} dates",
                REQUIRED_FIELDS[i],
                column.cells.len()
            )));
        }
        if fields[i].is_none() {
            fields[i] = Some(column.cells.iter().map(RawCell::to_f64).collect());
        }
    }

    let mut resolved = Vec::with_capacity(REQUIRED_FIELDS.len());
    for (name, values) in REQUIRED_FIELDS.iter().zip(fields) {
        let values = values.ok_or_else(|| Error::MissingColumn {
            symbol: symbol.to_string(),
            column: name.to_string(),
        })?;
        resolved.push(values);
    }

    let bars = frame
        .index
        .iter()
        .enumerate()
        .map(|(i, &date)| Bar {
            date,
            open: resolved[0][i],
            high: resolved[1][i],
            low: resolved[2][i],
            close: resolved[3][i],
            volume: resolved[4][i],
        })
        .filter(|b| {
            !(b.open.is_nan()
                && b.high.is_nan()
                && b.low.is_nan()
                && b.close.is_nan()
                && b.volume.is_nan())
        })
        .collect();

    Ok(PriceSeries::new(symbol, bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect()
    }

    fn nums(values: &[f64]) -> Vec<RawCell> {
        values.iter().map(|v| RawCell::Number(*v)).collect()
    }

    fn ohlcv(header_of: impl Fn(&str) -> Vec<String>) -> Vec<RawColumn> {
        REQUIRED_FIELDS
            .iter()
            .map(|f| RawColumn::new(header_of(f), nums(&[1.0, 2.0, 3.0])))
            .collect()
    }

    #[test]
    fn multi_level_headers_keep_field_level() {
        let frame = RawFrame {
            index: dates(3),
            columns: ohlcv(|f| vec![f.to_string(), "TITAN.NS".to_string()]),
        };
        let series = normalize("TITAN.NS", frame).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn flattened_headers_strip_symbol_suffix() {
        let frame = RawFrame {
            index: dates(3),
            columns: ohlcv(|f| vec![format!("{f}_CUB.NS")]),
        };
        let series = normalize("CUB.NS", frame).unwrap();
        assert_eq!(series.latest().unwrap().volume, 3.0);
    }

    #[test]
    fn duplicate_columns_first_wins() {
        let mut columns = ohlcv(|f| vec![f.to_string()]);
        columns.push(RawColumn::single("Close", nums(&[9.0, 9.0, 9.0])));
        let frame = RawFrame {
            index: dates(3),
            columns,
        };
        let series = normalize("X", frame).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn text_cells_become_missing() {
        let mut columns = ohlcv(|f| vec![f.to_string()]);
        columns[3] = RawColumn::single(
            "Close",
            vec![
                RawCell::Text("101.5".into()),
                RawCell::Text("n/a".into()),
                RawCell::Empty,
            ],
        );
        let frame = RawFrame {
            index: dates(3),
            columns,
        };
        let closes = normalize("X", frame).unwrap().closes();
        assert_eq!(closes[0], 101.5);
        assert!(closes[1].is_nan());
        assert!(closes[2].is_nan());
    }

    #[test]
    fn missing_required_column_is_reported() {
        let columns = ohlcv(|f| vec![f.to_string()])
            .into_iter()
            .filter(|c| c.header[0] != "Volume")
            .collect();
        let frame = RawFrame {
            index: dates(3),
            columns,
        };
        let err = normalize("X", frame).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "Volume"));
    }

    #[test]
    fn empty_rows_and_duplicate_dates_are_dropped() {
        let mut index = dates(3);
        index.push(index[1]);
        let columns = REQUIRED_FIELDS
            .iter()
            .map(|f| {
                RawColumn::single(
                    f,
                    vec![
                        RawCell::Number(1.0),
                        RawCell::Number(2.0),
                        RawCell::Empty,
                        RawCell::Number(7.0),
                    ],
                )
            })
            .collect();
        let series = normalize("X", RawFrame { index, columns }).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0]);
    }
}
