//! Best-odds index across sources.
//!
//! Records are grouped by [`EventId`], then by `(market, outcome)`. Each
//! bucket stays sorted by implied probability ascending, so the best price
//! for an outcome is always first.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::types::{EventId, EventRecord};

/// One source's price for an outcome.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub odds: f64,
    pub record: Arc<EventRecord>,
}

impl IndexEntry {
    #[must_use]
    pub fn source(&self) -> &str {
        self.record.source()
    }
}

// =============================================================================
// Event Book
// =============================================================================

/// Every known price for one contest, bucketed by `(market, outcome)`.
#[derive(Debug, Clone, Default)]
pub struct EventBook {
    buckets: BTreeMap<(String, String), Vec<IndexEntry>>,
}

impl EventBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every price quoted by `record`.
    pub fn insert(&mut self, record: &Arc<EventRecord>) {
        for (market, outcomes) in record.odds() {
            for (outcome, &odds) in outcomes {
                let bucket = self
                    .buckets
                    .entry((market.clone(), outcome.clone()))
                    .or_default();
                // Equal odds keep insertion order.
                let at = bucket.partition_point(|e| e.odds <= odds);
                bucket.insert(
                    at,
                    IndexEntry {
                        odds,
                        record: Arc::clone(record),
                    },
                );
            }
        }
    }

    /// Up to `n` best prices for an outcome, skipping `exclude_source`.
    ///
    /// `None` returns every matching entry. Returns an empty list when the
    /// outcome has never been quoted.
    #[must_use]
    pub fn best_for(
        &self,
        market: &str,
        outcome: &str,
        exclude_source: &str,
        n: Option<usize>,
    ) -> Vec<&IndexEntry> {
        let Some(bucket) = self.buckets.get(&(market.to_string(), outcome.to_string())) else {
            return Vec::new();
        };

        // At most one extra entry is needed per excluded listing; fetch one
        // more than asked before filtering.
        let fetched = n.map_or(bucket.len(), |n| n.saturating_add(1).min(bucket.len()));
        let mut best: Vec<&IndexEntry> = bucket[..fetched]
            .iter()
            .filter(|e| e.source() != exclude_source)
            .collect();

        // A source may list the same outcome more than once; keep scanning
        // until enough independent entries are found.
        if let Some(n) = n {
            if best.len() < n {
                best.extend(
                    bucket[fetched..]
                        .iter()
                        .filter(|e| e.source() != exclude_source)
                        .take(n - best.len()),
                );
            }
            best.truncate(n);
        }
        best
    }

    /// Whether any source quotes this outcome.
    #[must_use]
    pub fn contains(&self, market: &str, outcome: &str) -> bool {
        self.buckets
            .contains_key(&(market.to_string(), outcome.to_string()))
    }

    /// Number of `(market, outcome)` buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

// =============================================================================
// Odds Index
// =============================================================================

/// Per-contest books built once from all ingested records, then read-only.
#[derive(Debug, Clone, Default)]
pub struct OddsIndex {
    events: HashMap<EventId, EventBook>,
    records: usize,
}

impl OddsIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from validated records.
    #[must_use]
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = EventRecord>,
    {
        let mut index = Self::new();
        index.ingest_all(records);
        index
    }

    /// Adds one record's prices to its contest's book.
    pub fn ingest(&mut self, record: EventRecord) {
        let record = Arc::new(record);
        debug!(
            event = %record.id(),
            source = record.source(),
            "Ingesting event record"
        );
        self.events
            .entry(record.id().clone())
            .or_default()
            .insert(&record);
        self.records += 1;
    }

    pub fn ingest_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = EventRecord>,
    {
        for record in records {
            self.ingest(record);
        }
    }

    /// Up to `n` best prices for an outcome of one contest, skipping
    /// `exclude_source`, sorted by implied probability ascending.
    ///
    /// Unknown contests and outcomes yield an empty list.
    #[must_use]
    pub fn best_for(
        &self,
        event: &EventId,
        market: &str,
        outcome: &str,
        exclude_source: &str,
        n: Option<usize>,
    ) -> Vec<&IndexEntry> {
        let Some(book) = self.events.get(event) else {
            warn!(%event, "Event not in odds index");
            return Vec::new();
        };
        if !book.contains(market, outcome) {
            warn!(%event, market, outcome, "Outcome not in odds index");
            return Vec::new();
        }
        book.best_for(market, outcome, exclude_source, n)
    }

    #[must_use]
    pub fn book(&self, event: &EventId) -> Option<&EventBook> {
        self.events.get(event)
    }

    /// Number of distinct contests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of records ingested.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OddsTable;
    use chrono::{NaiveDate, NaiveDateTime};

    fn kickoff() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 6)
            .unwrap()
            .and_hms_opt(20, 20, 0)
            .unwrap()
    }

    fn record(source: &str, team1: f64, team2: f64) -> EventRecord {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("Team1".to_string(), team1);
        outcomes.insert("Team2".to_string(), team2);
        let mut odds = OddsTable::new();
        odds.insert("moneyline".to_string(), outcomes);
        EventRecord::new(
            source,
            "nfl",
            kickoff(),
            ["Team1".to_string(), "Team2".to_string()],
            odds,
        )
        .unwrap()
    }

    fn event_id() -> EventId {
        EventId::new(&kickoff(), &["Team2".to_string(), "Team1".to_string()])
    }

    // ==================== Ingestion ====================

    #[test]
    fn test_same_contest_shares_a_book() {
        let index = OddsIndex::from_records([record("A", 0.45, 0.6), record("B", 0.5, 0.52)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.record_count(), 2);
        assert_eq!(index.book(&event_id()).unwrap().len(), 2);
    }

    // ==================== Best For ====================

    #[test]
    fn test_best_for_excludes_source() {
        let index = OddsIndex::from_records([record("A", 0.45, 0.6), record("B", 0.5, 0.52)]);
        let best = index.best_for(&event_id(), "moneyline", "Team2", "A", None);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].source(), "B");
        assert!((best[0].odds - 0.52).abs() < 1e-12);
    }

    #[test]
    fn test_best_for_sorted_ascending() {
        let index = OddsIndex::from_records([
            record("A", 0.45, 0.6),
            record("B", 0.5, 0.52),
            record("C", 0.4, 0.58),
            record("D", 0.47, 0.55),
        ]);
        let best = index.best_for(&event_id(), "moneyline", "Team1", "", None);
        let odds: Vec<f64> = best.iter().map(|e| e.odds).collect();
        assert_eq!(odds, vec![0.4, 0.45, 0.47, 0.5]);
    }

    #[test]
    fn test_best_for_limit_survives_exclusion() {
        let index = OddsIndex::from_records([
            record("A", 0.4, 0.6),
            record("B", 0.45, 0.52),
            record("C", 0.5, 0.58),
        ]);
        // Best is A's; asking for 2 without A still yields 2.
        let best = index.best_for(&event_id(), "moneyline", "Team1", "A", Some(2));
        let sources: Vec<&str> = best.iter().map(|e| e.source()).collect();
        assert_eq!(sources, vec!["B", "C"]);
    }

    #[test]
    fn test_best_for_repeated_source_listings() {
        let index = OddsIndex::from_records([
            record("A", 0.4, 0.6),
            record("A", 0.41, 0.6),
            record("B", 0.45, 0.52),
        ]);
        let best = index.best_for(&event_id(), "moneyline", "Team1", "A", Some(1));
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].source(), "B");
    }

    #[test]
    fn test_best_for_short_results_are_not_errors() {
        let index = OddsIndex::from_records([record("A", 0.4, 0.6)]);
        assert!(index
            .best_for(&event_id(), "moneyline", "Team1", "A", Some(3))
            .is_empty());
        assert_eq!(
            index
                .best_for(&event_id(), "moneyline", "Team1", "B", Some(3))
                .len(),
            1
        );
    }

    #[test]
    fn test_best_for_unknown_lookups() {
        let index = OddsIndex::from_records([record("A", 0.4, 0.6)]);
        assert!(index
            .best_for(&event_id(), "spread", "Team1", "B", None)
            .is_empty());

        let other = EventId::new(
            &(kickoff() + chrono::Duration::days(1)),
            &["Team1".to_string(), "Team2".to_string()],
        );
        assert!(index.best_for(&other, "moneyline", "Team1", "B", None).is_empty());
    }

    #[test]
    fn test_best_for_zero_limit() {
        let index = OddsIndex::from_records([record("A", 0.4, 0.6), record("B", 0.45, 0.5)]);
        assert!(index
            .best_for(&event_id(), "moneyline", "Team1", "", Some(0))
            .is_empty());
    }
}
