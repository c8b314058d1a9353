//! Event record files.
//!
//! Accepts either a JSON array of records or JSON Lines (`.jsonl`, one record
//! per line). Entries that fail validation are logged and skipped so that one
//! bad listing never drops the whole file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use odds_hedge_engine::EventRecord;
use serde_json::Value;
use tracing::{info, warn};

/// Records read from one file.
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<EventRecord>,
    /// Entries rejected at the boundary.
    pub skipped: usize,
}

impl LoadedRecords {
    /// Records listed by `source`.
    pub fn from_source<'a>(
        &'a self,
        source: &'a str,
    ) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.records.iter().filter(move |r| r.source() == source)
    }

    fn push(&mut self, position: usize, value: Value) {
        match serde_json::from_value::<EventRecord>(value) {
            Ok(record) => self.records.push(record),
            Err(e) => {
                warn!(position, error = %e, "Skipping malformed event record");
                self.skipped += 1;
            }
        }
    }
}

/// Reads and validates every record in `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not JSON at all.
/// Individual malformed records are skipped, not reported as errors.
pub fn load_records(path: impl AsRef<Path>) -> Result<LoadedRecords> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read records from {}", path.display()))?;

    let loaded = if path.extension().is_some_and(|ext| ext == "jsonl") {
        parse_lines(&text)
    } else {
        parse_array(&text).with_context(|| format!("invalid records file {}", path.display()))?
    };

    info!(
        path = %path.display(),
        records = loaded.records.len(),
        skipped = loaded.skipped,
        "Loaded event records"
    );
    Ok(loaded)
}

fn parse_array(text: &str) -> Result<LoadedRecords> {
    let values: Vec<Value> =
        serde_json::from_str(text).context("expected a JSON array of event records")?;
    let mut loaded = LoadedRecords::default();
    for (position, value) in values.into_iter().enumerate() {
        loaded.push(position, value);
    }
    Ok(loaded)
}

fn parse_lines(text: &str) -> LoadedRecords {
    let mut loaded = LoadedRecords::default();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => loaded.push(line_no + 1, value),
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "Skipping unparseable line");
                loaded.skipped += 1;
            }
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{"source": "A", "category": "nhl", "date": "2025-01-04T19:00:00",
        "teams": ["Bruins", "Rangers"], "odds": {"moneyline": {"Bruins": 0.55, "Rangers": 0.5}}}"#;

    #[test]
    fn test_parse_array_skips_bad_entries() {
        let bad = GOOD.replace("0.55", "-0.55");
        let text = format!("[{GOOD}, {bad}, {{\"source\": \"B\"}}]");
        let loaded = parse_array(&text).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.skipped, 2);
    }

    #[test]
    fn test_parse_array_rejects_non_array() {
        assert!(parse_array(GOOD).is_err());
    }

    #[test]
    fn test_parse_lines() {
        let line = GOOD.replace('\n', " ");
        let text = format!("{line}\n\nnot json\n{line}\n");
        let loaded = parse_lines(&text);
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.skipped, 1);
    }

    #[test]
    fn test_from_source() {
        let other = GOOD.replace("\"A\"", "\"B\"");
        let loaded = parse_array(&format!("[{GOOD}, {other}]")).unwrap();
        assert_eq!(loaded.from_source("B").count(), 1);
        assert_eq!(loaded.from_source("Z").count(), 0);
    }
}
