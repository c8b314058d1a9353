//! Promotional payout rules.
//!
//! A [`BonusRule`] pays a flat rate on the qualifying part of a wager (e.g.
//! "bet $100 at -200 or longer, get 1/6 back as site credit"). A
//! [`ProfitBoostRule`] instead improves the odds on a capped slice of the wager.
//!
//! All thresholds are implied probabilities, so "longer odds" means a
//! *lower* value: a wager qualifies when its odds are at or below the threshold.

use odds_hedge_core::odds::parse_odds;
use serde::Deserialize;

use crate::error::{HedgeError, Result};

/// Threshold that every valid implied probability satisfies.
pub const ALWAYS_QUALIFIES: f64 = 1.0;

fn unlimited() -> f64 {
    f64::INFINITY
}

fn always_qualifies() -> f64 {
    ALWAYS_QUALIFIES
}

fn parse_threshold(min_odds: &str) -> Result<f64> {
    parse_odds(min_odds).map_err(|e| HedgeError::InvalidInput(e.to_string()))
}

// =============================================================================
// Bonus Rule
// =============================================================================

/// Flat-rate bonus on the qualifying part of a wager.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawBonusRule")]
pub struct BonusRule {
    max_bet: f64,
    bonus_rate: f64,
    qualifying_odds: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBonusRule {
    #[serde(default = "unlimited")]
    max_bet: f64,
    #[serde(default)]
    bonus_rate: f64,
    #[serde(default = "always_qualifies")]
    qualifying_odds: f64,
    /// Threshold as quoted odds (`"-200"`, `"1.50"`); wins over `qualifying_odds`.
    #[serde(default)]
    min_odds: Option<String>,
}

impl TryFrom<RawBonusRule> for BonusRule {
    type Error = HedgeError;

    fn try_from(raw: RawBonusRule) -> Result<Self> {
        let threshold = match raw.min_odds.as_deref() {
            Some(min_odds) => parse_threshold(min_odds)?,
            None => raw.qualifying_odds,
        };
        Self::new(raw.max_bet, raw.bonus_rate, threshold)
    }
}

impl Default for BonusRule {
    /// No bonus at all.
    fn default() -> Self {
        Self {
            max_bet: f64::INFINITY,
            bonus_rate: 0.0,
            qualifying_odds: ALWAYS_QUALIFIES,
        }
    }
}

impl BonusRule {
    /// Creates a bonus rule.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::InvalidInput`] for a negative (or NaN) `max_bet` or
    /// `bonus_rate`, or a threshold outside `(0, 1]`.
    pub fn new(max_bet: f64, bonus_rate: f64, qualifying_odds: f64) -> Result<Self> {
        validate_limits(max_bet, bonus_rate, qualifying_odds)?;
        Ok(Self {
            max_bet,
            bonus_rate,
            qualifying_odds,
        })
    }

    /// Creates a bonus rule whose threshold is quoted as American or decimal odds.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::InvalidInput`] when `min_odds` cannot be parsed or a
    /// limit is invalid.
    pub fn with_min_odds(max_bet: f64, bonus_rate: f64, min_odds: &str) -> Result<Self> {
        Self::new(max_bet, bonus_rate, parse_threshold(min_odds)?)
    }

    #[must_use]
    pub fn max_bet(&self) -> f64 {
        self.max_bet
    }

    #[must_use]
    pub fn bonus_rate(&self) -> f64 {
        self.bonus_rate
    }

    #[must_use]
    pub fn qualifying_odds(&self) -> f64 {
        self.qualifying_odds
    }

    /// Inclusive: odds equal to the threshold qualify.
    #[must_use]
    pub fn qualifies(&self, odds: f64) -> bool {
        odds <= self.qualifying_odds
    }

    /// Rate actually earned at `odds` (zero when the odds do not qualify).
    #[must_use]
    pub fn effective_rate(&self, odds: f64) -> f64 {
        if self.qualifies(odds) {
            self.bonus_rate
        } else {
            0.0
        }
    }

    /// Part of `wager` the bonus is paid on.
    #[must_use]
    pub fn bonus_amount(&self, wager: f64, odds: f64) -> f64 {
        if self.qualifies(odds) {
            self.max_bet.min(wager)
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn bonus_payout(&self, wager: f64, odds: f64) -> f64 {
        if self.qualifies(odds) {
            self.max_bet.min(wager) * self.bonus_rate
        } else {
            0.0
        }
    }
}

// =============================================================================
// Profit Boost Rule
// =============================================================================

/// Boosted odds on up to `max_bet` of a wager, with total boosted winnings
/// capped at `max_winnings`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawProfitBoostRule")]
pub struct ProfitBoostRule {
    max_bet: f64,
    boost_rate: f64,
    qualifying_odds: f64,
    max_winnings: f64,
    max_boosted_odds: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawProfitBoostRule {
    max_bet: f64,
    #[serde(default)]
    boost_rate: f64,
    #[serde(default = "always_qualifies")]
    qualifying_odds: f64,
    #[serde(default)]
    min_odds: Option<String>,
    #[serde(default = "unlimited")]
    max_winnings: f64,
}

impl TryFrom<RawProfitBoostRule> for ProfitBoostRule {
    type Error = HedgeError;

    fn try_from(raw: RawProfitBoostRule) -> Result<Self> {
        let threshold = match raw.min_odds.as_deref() {
            Some(min_odds) => parse_threshold(min_odds)?,
            None => raw.qualifying_odds,
        };
        Self::new(raw.max_bet, raw.boost_rate, threshold, raw.max_winnings)
    }
}

impl ProfitBoostRule {
    /// Creates a profit boost rule and derives its cap threshold.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::InvalidInput`] for negative limits or a threshold
    /// outside `(0, 1]`.
    pub fn new(
        max_bet: f64,
        boost_rate: f64,
        qualifying_odds: f64,
        max_winnings: f64,
    ) -> Result<Self> {
        validate_limits(max_bet, boost_rate, qualifying_odds)?;
        if max_winnings.is_nan() || max_winnings < 0.0 {
            return Err(HedgeError::InvalidInput(format!(
                "max winnings must be >= 0, got {max_winnings}"
            )));
        }

        Ok(Self {
            max_bet,
            boost_rate,
            qualifying_odds,
            max_winnings,
            max_boosted_odds: max_boosted_odds(max_bet, max_winnings),
        })
    }

    /// Uncapped boost on up to `max_bet`, qualifying at any odds.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::InvalidInput`] for negative limits.
    pub fn uncapped(max_bet: f64, boost_rate: f64) -> Result<Self> {
        Self::new(max_bet, boost_rate, ALWAYS_QUALIFIES, f64::INFINITY)
    }

    /// Replaces the winnings cap, recomputing the derived threshold.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::InvalidInput`] for a negative cap.
    pub fn with_max_winnings(self, max_winnings: f64) -> Result<Self> {
        Self::new(
            self.max_bet,
            self.boost_rate,
            self.qualifying_odds,
            max_winnings,
        )
    }

    /// Replaces the qualifying threshold with quoted odds.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::InvalidInput`] when `min_odds` cannot be parsed.
    pub fn with_min_odds(self, min_odds: &str) -> Result<Self> {
        Self::new(
            self.max_bet,
            self.boost_rate,
            parse_threshold(min_odds)?,
            self.max_winnings,
        )
    }

    #[must_use]
    pub fn max_bet(&self) -> f64 {
        self.max_bet
    }

    #[must_use]
    pub fn boost_rate(&self) -> f64 {
        self.boost_rate
    }

    #[must_use]
    pub fn qualifying_odds(&self) -> f64 {
        self.qualifying_odds
    }

    #[must_use]
    pub fn max_winnings(&self) -> f64 {
        self.max_winnings
    }

    /// Boosted implied probability below which the winnings cap binds.
    ///
    /// Zero when winnings are uncapped.
    #[must_use]
    pub fn max_boosted_odds(&self) -> f64 {
        self.max_boosted_odds
    }

    #[must_use]
    pub fn qualifies(&self, odds: f64) -> bool {
        odds <= self.qualifying_odds
    }

    /// Converts true odds into the boosted payout rate.
    ///
    /// ```text
    /// boosted = 1 / ((1/odds - 1) * (1 + boost_rate) + 1)
    /// ```
    #[must_use]
    pub fn boosted_odds(&self, odds: f64) -> f64 {
        boost_odds(odds, self.boost_rate)
    }

    /// Largest wager at `odds` whose winnings stay within the cap.
    ///
    /// Solves `wager / odds - wager = max_winnings` for `wager`.
    #[must_use]
    pub fn max_bet_for_odds(&self, odds: f64) -> f64 {
        if odds == 0.0 {
            return f64::INFINITY;
        }
        self.max_winnings * odds / (1.0 - odds)
    }

    /// Part of `wager` that receives the boosted odds.
    #[must_use]
    pub fn boost_amount(&self, odds: f64, wager: f64) -> f64 {
        if !self.qualifies(odds) {
            return 0.0;
        }
        let boosted = self.boosted_odds(odds);
        if boosted < self.max_boosted_odds {
            self.max_bet
                .min(wager)
                .min(self.max_bet_for_odds(boosted))
        } else {
            self.max_bet.min(wager)
        }
    }

    /// Boost amount with no limit from the wager itself.
    #[must_use]
    pub fn max_boost_amount(&self, odds: f64) -> f64 {
        self.boost_amount(odds, f64::INFINITY)
    }
}

/// `1 / ((1/odds - 1) * (1 + boost) + 1)`.
#[must_use]
pub fn boost_odds(odds: f64, boost: f64) -> f64 {
    1.0 / ((1.0 / odds - 1.0) * (1.0 + boost) + 1.0)
}

/// Solves `max_bet / odds - max_bet = max_winnings` for `odds`.
fn max_boosted_odds(max_bet: f64, max_winnings: f64) -> f64 {
    if max_winnings.is_infinite() || max_bet == 0.0 {
        0.0
    } else if max_bet.is_infinite() {
        // Every boosted price runs into the cap.
        1.0
    } else {
        max_bet / (max_bet + max_winnings)
    }
}

fn validate_limits(max_bet: f64, rate: f64, qualifying_odds: f64) -> Result<()> {
    if max_bet.is_nan() || max_bet < 0.0 {
        return Err(HedgeError::InvalidInput(format!(
            "max bet must be >= 0, got {max_bet}"
        )));
    }
    if !rate.is_finite() || rate < 0.0 {
        return Err(HedgeError::InvalidInput(format!(
            "bonus rate must be a finite value >= 0, got {rate}"
        )));
    }
    if !(qualifying_odds > 0.0 && qualifying_odds <= 1.0) {
        return Err(HedgeError::InvalidInput(format!(
            "qualifying odds must be in (0, 1], got {qualifying_odds}"
        )));
    }
    Ok(())
}
