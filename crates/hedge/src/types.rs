//! Normalized event records produced by the ingestion layer.
//!
//! A record is one source's view of a real-world contest: who plays, when,
//! and the implied probability quoted for every outcome of every market.
//! Records from different sources describe the same contest when their
//! [`EventId`]s are equal.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::error::{HedgeError, Result};

/// `market -> outcome -> implied probability`.
pub type OddsTable = BTreeMap<String, BTreeMap<String, f64>>;

// =============================================================================
// Event Identity
// =============================================================================

/// Deterministic identity of a contest: normalized date plus sorted team names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Builds the id from a date and the two team names (order-insensitive).
    #[must_use]
    pub fn new(date: &NaiveDateTime, teams: &[String; 2]) -> Self {
        let mut sorted = [teams[0].as_str(), teams[1].as_str()];
        sorted.sort_unstable();
        Self(format!("{date}_{}", sorted.join(" ")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Event Record
// =============================================================================

/// One source's listing of a contest and its odds.
///
/// Records are validated on construction and immutable afterwards. Equality
/// and hashing look only at the [`EventId`], so listings of the same contest
/// from different sources compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawEventRecord", into = "RawEventRecord")]
pub struct EventRecord {
    id: EventId,
    source: String,
    category: String,
    date: NaiveDateTime,
    teams: [String; 2],
    odds: OddsTable,
}

impl EventRecord {
    /// Creates a validated record.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::MalformedRecord`] when a team name is empty, the
    /// odds table has no outcomes, or any implied probability is outside `(0, 1)`.
    pub fn new(
        source: impl Into<String>,
        category: impl Into<String>,
        date: NaiveDateTime,
        teams: [String; 2],
        odds: OddsTable,
    ) -> Result<Self> {
        let source = source.into();

        if teams.iter().any(|t| t.trim().is_empty()) {
            return Err(HedgeError::MalformedRecord(format!(
                "{source}: empty team name in {teams:?}"
            )));
        }

        if odds.values().all(BTreeMap::is_empty) {
            return Err(HedgeError::MalformedRecord(format!(
                "{source}: no odds for {teams:?}"
            )));
        }

        for (market, outcomes) in &odds {
            for (outcome, ip) in outcomes {
                if !is_probability(*ip) {
                    return Err(HedgeError::MalformedRecord(format!(
                        "{source}: odds {ip} for {market}/{outcome} outside (0, 1)"
                    )));
                }
            }
        }

        Ok(Self {
            id: EventId::new(&date, &teams),
            source,
            category: category.into(),
            date,
            teams,
            odds,
        })
    }

    #[must_use]
    pub fn id(&self) -> &EventId {
        &self.id
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    #[must_use]
    pub fn teams(&self) -> &[String; 2] {
        &self.teams
    }

    #[must_use]
    pub fn odds(&self) -> &OddsTable {
        &self.odds
    }

    /// Implied probability quoted for one outcome of one market.
    #[must_use]
    pub fn odds_for(&self, market: &str, outcome: &str) -> Option<f64> {
        self.odds.get(market)?.get(outcome).copied()
    }
}

impl PartialEq for EventRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventRecord {}

impl Hash for EventRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} - {} - {} vs {}",
            self.source, self.date, self.category, self.teams[0], self.teams[1]
        )
    }
}

/// Wire shape of a record before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventRecord {
    pub source: String,
    pub category: String,
    pub date: NaiveDateTime,
    pub teams: [String; 2],
    pub odds: OddsTable,
}

impl TryFrom<RawEventRecord> for EventRecord {
    type Error = HedgeError;

    fn try_from(raw: RawEventRecord) -> Result<Self> {
        Self::new(raw.source, raw.category, raw.date, raw.teams, raw.odds)
    }
}

impl From<EventRecord> for RawEventRecord {
    fn from(record: EventRecord) -> Self {
        Self {
            source: record.source,
            category: record.category,
            date: record.date,
            teams: record.teams,
            odds: record.odds,
        }
    }
}

/// True when `value` is a usable implied probability.
pub(crate) fn is_probability(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value < 1.0
}
