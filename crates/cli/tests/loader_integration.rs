//! Integration tests for loading record files and searching them.

use std::io::Write;

use odds_hedge_cli::commands::{FindArgs, OrderArg};
use odds_hedge_cli::load_records;
use odds_hedge_core::{RankOrder, SearchConfig};
use odds_hedge_engine::{Bet, HedgeSearch, OddsIndex};
use tempfile::NamedTempFile;

// =============================================================================
// Helper Functions
// =============================================================================

fn record(source: &str, home: f64, away: f64) -> String {
    format!(
        r#"{{"source": "{source}", "category": "mlb", "date": "2025-04-12T19:10:00",
            "teams": ["Cubs", "Mets"],
            "odds": {{"moneyline": {{"Cubs": {home}, "Mets": {away}}}}}}}"#
    )
}

fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_json_array_skips_malformed() {
    let contents = format!(
        "[{}, {}, {}]",
        record("site_1", 0.45, 0.6),
        record("site_2", 0.5, 0.52),
        record("site_3", 1.5, 0.52)
    );
    let file = write_file(".json", &contents);

    let loaded = load_records(file.path()).unwrap();
    assert_eq!(loaded.records.len(), 2);
    assert_eq!(loaded.skipped, 1);
    assert_eq!(loaded.from_source("site_2").count(), 1);
}

#[test]
fn test_load_json_lines() {
    let contents = format!(
        "{}\n{}\n",
        record("site_1", 0.45, 0.6).replace('\n', " "),
        record("site_2", 0.5, 0.52).replace('\n', " ")
    );
    let file = write_file(".jsonl", &contents);

    let loaded = load_records(file.path()).unwrap();
    assert_eq!(loaded.records.len(), 2);
    assert_eq!(loaded.skipped, 0);
}

#[test]
fn test_load_missing_file_fails() {
    assert!(load_records("does/not/exist.json").is_err());
}

#[test]
fn test_load_non_json_fails() {
    let file = write_file(".json", "not json");
    assert!(load_records(file.path()).is_err());
}

// =============================================================================
// Search Over Loaded Records
// =============================================================================

#[test]
fn test_loaded_records_produce_hedges() {
    let contents = format!(
        "[{}, {}]",
        record("site_1", 0.45, 0.6),
        record("site_2", 0.5, 0.52)
    );
    let file = write_file(".json", &contents);
    let loaded = load_records(file.path()).unwrap();

    let index = OddsIndex::from_records(loaded.records.iter().cloned());
    let ranked = HedgeSearch::new(&index)
        .find_hedges(&Bet::free(600.0, false).with_wager(600.0), loaded.from_source("site_1"));

    assert_eq!(ranked.len(), 2);
    let best = ranked.best().unwrap();
    assert_eq!(best.hedge.source, "site_2");
    assert!(best.profit > 0.0);
}

#[test]
fn test_flags_override_config() {
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        find: FindArgs,
    }

    let cli = TestCli::parse_from([
        "test", "--records", "r.json", "--source", "site_1", "--wager", "100", "--top", "2",
        "--order", "asc",
    ]);
    let base = SearchConfig {
        max_per_outcome: Some(5),
        order: RankOrder::Descending,
        min_profit: Some(1.0),
        limit: Some(10),
    };
    let config = cli.find.search_config(&base);
    assert_eq!(config.max_per_outcome, Some(2));
    assert_eq!(config.order, RankOrder::Ascending);
    assert_eq!(config.min_profit, Some(1.0));
    assert_eq!(config.limit, Some(10));
    assert_eq!(cli.find.order, Some(OrderArg::Asc));
}
