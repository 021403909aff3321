use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use common::{Error, Result};

/// Load a ticker list: one symbol per line, or the first column of a CSV.
///
/// `#` comments, blank lines and a `SYMBOL` header are skipped.
pub fn load_universe(path: impl AsRef<Path>, suffix: &str) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let symbols = parse_universe(&text, suffix)?;
    info!(path = %path.display(), symbols = symbols.len(), "Universe loaded");
    Ok(symbols)
}

/// Parse ticker-list text; see [`load_universe`].
pub fn parse_universe(text: &str, suffix: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut first_column = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Parse(format!("universe: {e}")))?;
        if let Some(field) = record.get(0) {
            first_column.push(field.to_string());
        }
    }
    Ok(normalize_symbols(first_column.iter().map(String::as_str), suffix))
}

/// Trim, upper-case, append `suffix` where missing and drop repeats, keeping
/// first-seen order. An empty suffix leaves symbols as they are.
pub fn normalize_symbols<'a>(raw: impl IntoIterator<Item = &'a str>, suffix: &str) -> Vec<String> {
    let suffix = suffix.trim().to_uppercase();
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with('#') && !s.eq_ignore_ascii_case("symbol"))
        .map(|s| {
            let s = s.to_uppercase();
            if suffix.is_empty() || s.ends_with(&suffix) {
                s
            } else {
                format!("{s}{suffix}")
            }
        })
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
