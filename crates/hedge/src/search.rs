//! Hedge candidate generation and ranking.
//!
//! For a primary bet with its stake fixed, [`HedgeSearch`] walks every outcome
//! of every market of the primary source's records, looks up the best prices
//! for the opposing outcomes at other sources, and sizes a plain hedge bet on
//! each so that both sides pay out the same.

use std::cmp::Ordering;

use odds_hedge_core::{implied_to_american, RankOrder, SearchConfig};
use serde::Serialize;
use tracing::{debug, info};

use crate::bet::{Bet, BetKind};
use crate::index::{IndexEntry, OddsIndex};
use crate::solver::MatchedBet;
use crate::types::{EventId, EventRecord};

// =============================================================================
// Candidate
// =============================================================================

/// One side of a hedge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HedgeLeg {
    pub source: String,
    pub event: EventId,
    /// `"{source} - {date} - {category} - {team} vs {team}"`.
    pub listing: String,
    pub market: String,
    pub outcome: String,
    pub kind: String,
    pub wager: f64,
    /// Implied probability.
    pub odds: f64,
}

impl HedgeLeg {
    fn new(
        record: &EventRecord,
        market: &str,
        outcome: &str,
        kind: &BetKind,
        wager: f64,
        odds: f64,
    ) -> Self {
        Self {
            source: record.source().to_string(),
            event: record.id().clone(),
            listing: record.to_string(),
            market: market.to_string(),
            outcome: outcome.to_string(),
            kind: kind.as_str().to_string(),
            wager,
            odds,
        }
    }

    /// Odds in American notation, or the raw probability if out of range.
    #[must_use]
    pub fn american_odds(&self) -> String {
        implied_to_american(self.odds).unwrap_or_else(|_| format!("{:.4}", self.odds))
    }
}

impl std::fmt::Display for HedgeLeg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:\n${:.2} @ {} on {}",
            self.listing,
            self.wager,
            self.american_odds(),
            self.outcome
        )
    }
}

/// A primary bet paired with the hedge that equalizes its payout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HedgeCandidate {
    pub primary: HedgeLeg,
    pub hedge: HedgeLeg,
    pub total_payout: f64,
    pub total_spent: f64,
    pub profit: f64,
    /// Profit per unit of promotional value, for free and insured bets.
    pub efficiency: Option<f64>,
}

impl HedgeCandidate {
    fn new(
        primary: HedgeLeg,
        hedge: HedgeLeg,
        matched: &MatchedBet,
        promo_value: Option<f64>,
    ) -> Self {
        let profit = matched.profit();
        let efficiency = promo_value.filter(|v| *v > 0.0).map(|v| profit / v);
        Self {
            primary,
            hedge,
            total_payout: matched.total_payout,
            total_spent: matched.total_spent,
            profit,
            efficiency,
        }
    }

    /// One-line summary used for tie-breaking and logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {} @ {} / {} {} @ {}",
            self.primary.event,
            self.primary.market,
            self.primary.source,
            self.primary.outcome,
            self.primary.american_odds(),
            self.hedge.source,
            self.hedge.outcome,
            self.hedge.american_odds()
        )
    }
}

impl std::fmt::Display for HedgeCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.primary.market)?;
        writeln!(f, "{}", self.primary)?;
        writeln!(f, "{}", self.hedge)?;
        write!(f, "Profit: {:.2}", self.profit)?;
        if let Some(efficiency) = self.efficiency {
            write!(f, "\nEfficiency: {:.2}%", efficiency * 100.0)?;
        }
        Ok(())
    }
}

// =============================================================================
// Ranking
// =============================================================================

/// Candidates sorted by profit ascending.
///
/// Ties break on [`HedgeCandidate::summary`] so the order is deterministic.
#[derive(Debug, Clone, Default)]
pub struct RankedHedges {
    candidates: Vec<HedgeCandidate>,
}

impl RankedHedges {
    #[must_use]
    pub fn new(mut candidates: Vec<HedgeCandidate>) -> Self {
        candidates.sort_by(|a, b| {
            a.profit
                .partial_cmp(&b.profit)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.summary().cmp(&b.summary()))
        });
        Self { candidates }
    }

    /// Worst first.
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = &HedgeCandidate> {
        self.candidates.iter()
    }

    /// Best first.
    pub fn descending(&self) -> impl DoubleEndedIterator<Item = &HedgeCandidate> {
        self.candidates.iter().rev()
    }

    #[must_use]
    pub fn ordered(&self, order: RankOrder) -> Vec<&HedgeCandidate> {
        match order {
            RankOrder::Ascending => self.ascending().collect(),
            RankOrder::Descending => self.descending().collect(),
        }
    }

    #[must_use]
    pub fn best(&self) -> Option<&HedgeCandidate> {
        self.candidates.last()
    }

    #[must_use]
    pub fn worst(&self) -> Option<&HedgeCandidate> {
        self.candidates.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<HedgeCandidate> {
        self.candidates
    }
}

// =============================================================================
// Search
// =============================================================================

/// Counters for one search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub records: usize,
    pub pairs: usize,
    pub solved: usize,
    pub failed: usize,
    pub filtered: usize,
}

/// Finds hedges for a primary bet against an [`OddsIndex`].
#[derive(Debug, Clone)]
pub struct HedgeSearch<'a> {
    index: &'a OddsIndex,
    config: SearchConfig,
}

impl<'a> HedgeSearch<'a> {
    #[must_use]
    pub fn new(index: &'a OddsIndex) -> Self {
        Self {
            index,
            config: SearchConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Every hedge of `primary` placed at each of `records`.
    ///
    /// `primary` must have its wager fixed; its odds are taken from each
    /// record in turn. Candidates the solver rejects are logged and skipped.
    #[must_use]
    pub fn find_hedges<'r, I>(&self, primary: &Bet, records: I) -> RankedHedges
    where
        I: IntoIterator<Item = &'r EventRecord>,
    {
        self.find_hedges_with_stats(primary, records).0
    }

    /// [`Self::find_hedges`] plus run counters.
    pub fn find_hedges_with_stats<'r, I>(
        &self,
        primary: &Bet,
        records: I,
    ) -> (RankedHedges, SearchStats)
    where
        I: IntoIterator<Item = &'r EventRecord>,
    {
        let mut stats = SearchStats::default();
        let mut candidates = Vec::new();

        for record in records {
            stats.records += 1;
            for (market, outcomes) in record.odds() {
                for (outcome, &odds) in outcomes {
                    let placed = primary.with_odds(odds);
                    for other in outcomes.keys().filter(|o| *o != outcome) {
                        let entries = self.index.best_for(
                            record.id(),
                            market,
                            other,
                            record.source(),
                            self.config.max_per_outcome,
                        );
                        for entry in entries {
                            stats.pairs += 1;
                            match self.candidate(record, market, outcome, &placed, other, entry) {
                                Some(candidate) if self.passes(&candidate) => {
                                    stats.solved += 1;
                                    candidates.push(candidate);
                                }
                                Some(_) => {
                                    stats.solved += 1;
                                    stats.filtered += 1;
                                }
                                None => stats.failed += 1,
                            }
                        }
                    }
                }
            }
        }

        let ranked = RankedHedges::new(candidates);
        info!(
            kind = %primary.kind(),
            records = stats.records,
            pairs = stats.pairs,
            candidates = ranked.len(),
            failed = stats.failed,
            filtered = stats.filtered,
            best_profit = ranked.best().map(|c| c.profit),
            "Hedge search complete"
        );
        (ranked, stats)
    }

    fn candidate(
        &self,
        record: &EventRecord,
        market: &str,
        outcome: &str,
        placed: &Bet,
        other: &str,
        entry: &IndexEntry,
    ) -> Option<HedgeCandidate> {
        let hedge = Bet::normal().with_odds(entry.odds);
        let matched = match hedge.solve_matching(&[], std::slice::from_ref(placed)) {
            Ok(matched) => matched,
            Err(e) => {
                debug!(
                    event = %record.id(),
                    market,
                    outcome,
                    hedge_source = entry.source(),
                    error = %e,
                    "No hedge for {placed} against {hedge}"
                );
                return None;
            }
        };

        let wager = placed.wager().unwrap_or_default();
        let odds = placed.odds().unwrap_or_default();
        let primary = HedgeLeg::new(record, market, outcome, placed.kind(), wager, odds);
        let hedge_leg = HedgeLeg::new(
            &entry.record,
            market,
            other,
            hedge.kind(),
            matched.value,
            entry.odds,
        );
        Some(HedgeCandidate::new(
            primary,
            hedge_leg,
            &matched,
            placed.promotional_value(wager, odds),
        ))
    }

    fn passes(&self, candidate: &HedgeCandidate) -> bool {
        self.config
            .min_profit
            .map_or(true, |min| candidate.profit >= min)
    }
}

/// Renders up to `limit` candidates in `order`, separated by blank lines.
#[must_use]
pub fn render(ranked: &RankedHedges, order: RankOrder, limit: Option<usize>) -> String {
    let mut shown = ranked.ordered(order);
    if let Some(limit) = limit {
        shown.truncate(limit);
    }
    shown
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
