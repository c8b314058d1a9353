//! Wager variants and their payout algebra.
//!
//! Every bet pays `wager / odds` when it wins, adjusted by its promotion:
//!
//! | Kind         | Payout                                              | Spent                  |
//! |--------------|-----------------------------------------------------|------------------------|
//! | Normal       | `w/o + bonus(w)`                                    | `w`                    |
//! | Free         | `w/o - f + bonus(w - f)`                            | `w - f`                |
//! | Insured      | `w/o - 0.7 i + bonus(w)`                            | `w - 0.7 i`            |
//! | ProfitBoost  | `(w - b)/o + b/boosted(o) + bonus(w)`               | `w`                    |
//!
//! where `f`, `i` and `b` are the promotional principal actually used (see
//! [`clamp_principal`] and [`ProfitBoostRule::boost_amount`]).

use serde::Deserialize;

use crate::error::{HedgeError, Result};
use crate::rules::{BonusRule, ProfitBoostRule};
use crate::types::is_probability;

/// Share of an insured stake refunded on a loss.
pub const INSURED_REFUND_RATE: f64 = 0.7;

// =============================================================================
// Bet Kind
// =============================================================================

/// Promotion attached to a wager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BetKind {
    /// Plain wager.
    Normal,
    /// Part of the stake is site credit that is never returned.
    Free { free_amount: f64, splitable: bool },
    /// Part of a losing stake is refunded at [`INSURED_REFUND_RATE`].
    Insured { insured_amount: f64, splitable: bool },
    /// Part of the stake is paid at boosted odds.
    ProfitBoost(ProfitBoostRule),
}

impl BetKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Free { .. } => "Free",
            Self::Insured { .. } => "Insured",
            Self::ProfitBoost(_) => "Profit Boost",
        }
    }
}

impl std::fmt::Display for BetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Promotional principal usable on `wager`.
///
/// A non-splitable promotion is all-or-nothing: it only applies when the
/// wager covers the whole amount.
#[must_use]
pub fn clamp_principal(wager: f64, amount: f64, splitable: bool) -> f64 {
    if wager < amount && !splitable {
        0.0
    } else {
        amount.min(wager)
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// Gross payout if the bet wins, and what it actually costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub payout: f64,
    pub spent: f64,
}

impl Settlement {
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.payout - self.spent
    }
}

// =============================================================================
// Bet
// =============================================================================

/// A wager whose stake or odds may still be unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bet {
    wager: Option<f64>,
    odds: Option<f64>,
    bonus: BonusRule,
    kind: BetKind,
}

impl Bet {
    #[must_use]
    pub fn new(kind: BetKind) -> Self {
        Self {
            wager: None,
            odds: None,
            bonus: BonusRule::default(),
            kind,
        }
    }

    #[must_use]
    pub fn normal() -> Self {
        Self::new(BetKind::Normal)
    }

    #[must_use]
    pub fn free(free_amount: f64, splitable: bool) -> Self {
        Self::new(BetKind::Free {
            free_amount,
            splitable,
        })
    }

    #[must_use]
    pub fn insured(insured_amount: f64, splitable: bool) -> Self {
        Self::new(BetKind::Insured {
            insured_amount,
            splitable,
        })
    }

    #[must_use]
    pub fn profit_boost(rule: ProfitBoostRule) -> Self {
        Self::new(BetKind::ProfitBoost(rule))
    }

    #[must_use]
    pub fn with_wager(mut self, wager: f64) -> Self {
        self.wager = Some(wager);
        self
    }

    #[must_use]
    pub fn with_odds(mut self, odds: f64) -> Self {
        self.odds = Some(odds);
        self
    }

    #[must_use]
    pub fn with_bonus(mut self, bonus: BonusRule) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn set_wager(&mut self, wager: Option<f64>) {
        self.wager = wager;
    }

    pub fn set_odds(&mut self, odds: Option<f64>) {
        self.odds = odds;
    }

    #[must_use]
    pub fn wager(&self) -> Option<f64> {
        self.wager
    }

    #[must_use]
    pub fn odds(&self) -> Option<f64> {
        self.odds
    }

    #[must_use]
    pub fn bonus(&self) -> &BonusRule {
        &self.bonus
    }

    #[must_use]
    pub fn kind(&self) -> &BetKind {
        &self.kind
    }

    /// Payout and spend with both wager and odds known.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::Underdetermined`] if wager or odds is unknown and
    /// [`HedgeError::InvalidInput`] if the wager is negative or the odds are
    /// outside `(0, 1)`.
    pub fn settle(&self) -> Result<Settlement> {
        let (wager, odds) = self.known()?;
        let principal = self.promotional_principal(wager, odds);
        Ok(self.settle_with_principal(wager, odds, principal))
    }

    /// Promotional principal the bet uses at `wager` and `odds`.
    ///
    /// Free stake for free bets, insured stake for insured bets, boosted stake
    /// for profit boosts, zero for normal bets.
    #[must_use]
    pub fn promotional_principal(&self, wager: f64, odds: f64) -> f64 {
        match self.kind {
            BetKind::Normal => 0.0,
            BetKind::Free {
                free_amount,
                splitable,
            } => clamp_principal(wager, free_amount, splitable),
            BetKind::Insured {
                insured_amount,
                splitable,
            } => clamp_principal(wager, insured_amount, splitable),
            BetKind::ProfitBoost(rule) => rule.boost_amount(odds, wager),
        }
    }

    /// Capital that is genuinely at risk beyond the promotion, used as the
    /// denominator of a hedge's efficiency.
    ///
    /// Only free and insured bets report one.
    #[must_use]
    pub fn promotional_value(&self, wager: f64, odds: f64) -> Option<f64> {
        let principal = self.promotional_principal(wager, odds);
        match self.kind {
            BetKind::Free { .. } => Some(principal),
            BetKind::Insured { .. } => Some(principal * INSURED_REFUND_RATE),
            BetKind::Normal | BetKind::ProfitBoost(_) => None,
        }
    }

    pub(crate) fn settle_with_principal(
        &self,
        wager: f64,
        odds: f64,
        principal: f64,
    ) -> Settlement {
        match self.kind {
            BetKind::Normal => Settlement {
                payout: wager / odds + self.bonus.bonus_payout(wager, odds),
                spent: wager,
            },
            BetKind::Free { .. } => Settlement {
                payout: wager / odds - principal
                    + self.bonus.bonus_payout(wager - principal, odds),
                spent: wager - principal,
            },
            BetKind::Insured { .. } => {
                let refund = principal * INSURED_REFUND_RATE;
                Settlement {
                    payout: wager / odds - refund + self.bonus.bonus_payout(wager, odds),
                    spent: wager - refund,
                }
            }
            BetKind::ProfitBoost(rule) => Settlement {
                payout: (wager - principal) / odds
                    + principal / rule.boosted_odds(odds)
                    + self.bonus.bonus_payout(wager, odds),
                spent: wager,
            },
        }
    }

    fn known(&self) -> Result<(f64, f64)> {
        match (self.wager, self.odds) {
            (Some(wager), Some(odds)) => {
                validate_wager(wager)?;
                validate_odds(odds)?;
                Ok((wager, odds))
            }
            (wager, odds) => Err(HedgeError::Underdetermined(format!(
                "cannot settle {} bet with unknown {}",
                self.kind,
                unknown_names(wager, odds)
            ))),
        }
    }
}

impl std::fmt::Display for Bet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bet", self.kind)?;
        if let Some(wager) = self.wager {
            write!(f, " ${wager:.2}")?;
        }
        if let Some(odds) = self.odds {
            write!(f, " @ {odds:.4}")?;
        }
        Ok(())
    }
}

pub(crate) fn validate_wager(wager: f64) -> Result<()> {
    if wager.is_finite() && wager >= 0.0 {
        Ok(())
    } else {
        Err(HedgeError::InvalidInput(format!(
            "wager must be a finite value >= 0, got {wager}"
        )))
    }
}

pub(crate) fn validate_odds(odds: f64) -> Result<()> {
    if is_probability(odds) {
        Ok(())
    } else {
        Err(HedgeError::InvalidInput(format!(
            "odds must be in (0, 1), got {odds}"
        )))
    }
}

pub(crate) fn unknown_names(wager: Option<f64>, odds: Option<f64>) -> &'static str {
    match (wager, odds) {
        (None, None) => "wager and odds",
        (None, Some(_)) => "wager",
        (Some(_), None) => "odds",
        (Some(_), Some(_)) => "nothing",
    }
}

// =============================================================================
// Bet Spec
// =============================================================================

/// Declarative description of the primary bet of a hedge search.
///
/// ```json
/// {"kind": "free", "wager": 600, "free_amount": 600, "splitable": false}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BetSpec {
    Normal {
        wager: f64,
        #[serde(default)]
        bonus: BonusRule,
    },
    Free {
        wager: f64,
        /// Defaults to the whole wager.
        #[serde(default)]
        free_amount: Option<f64>,
        #[serde(default)]
        splitable: bool,
        #[serde(default)]
        bonus: BonusRule,
    },
    Insured {
        wager: f64,
        /// Defaults to the whole wager.
        #[serde(default)]
        insured_amount: Option<f64>,
        #[serde(default)]
        splitable: bool,
        #[serde(default)]
        bonus: BonusRule,
    },
    ProfitBoost {
        wager: f64,
        profit_boost: ProfitBoostRule,
        #[serde(default)]
        bonus: BonusRule,
    },
}

impl BetSpec {
    #[must_use]
    pub fn wager(&self) -> f64 {
        match self {
            Self::Normal { wager, .. }
            | Self::Free { wager, .. }
            | Self::Insured { wager, .. }
            | Self::ProfitBoost { wager, .. } => *wager,
        }
    }

    /// Builds the bet with its wager fixed and its odds still unknown.
    ///
    /// # Errors
    ///
    /// Returns [`HedgeError::InvalidInput`] for a negative wager or promotional amount.
    pub fn into_bet(self) -> Result<Bet> {
        validate_wager(self.wager())?;
        let bet = match self {
            Self::Normal { wager, bonus } => Bet::normal().with_wager(wager).with_bonus(bonus),
            Self::Free {
                wager,
                free_amount,
                splitable,
                bonus,
            } => {
                let amount = free_amount.unwrap_or(wager);
                validate_wager(amount)?;
                Bet::free(amount, splitable)
                    .with_wager(wager)
                    .with_bonus(bonus)
            }
            Self::Insured {
                wager,
                insured_amount,
                splitable,
                bonus,
            } => {
                let amount = insured_amount.unwrap_or(wager);
                validate_wager(amount)?;
                Bet::insured(amount, splitable)
                    .with_wager(wager)
                    .with_bonus(bonus)
            }
            Self::ProfitBoost {
                wager,
                profit_boost,
                bonus,
            } => Bet::profit_boost(profit_boost)
                .with_wager(wager)
                .with_bonus(bonus),
        };
        Ok(bet)
    }
}

impl TryFrom<BetSpec> for Bet {
    type Error = HedgeError;

    fn try_from(spec: BetSpec) -> Result<Self> {
        spec.into_bet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    // ==================== Normal Bet Tests ====================

    #[test]
    fn test_normal_bet_payout() {
        let s = Bet::normal().with_wager(100.0).with_odds(0.5).settle().unwrap();
        assert_close(s.payout, 200.0);
        assert_close(s.spent, 100.0);
        assert_close(s.profit(), 100.0);
    }

    #[test]
    fn test_normal_bet_with_bonus() {
        let bonus = BonusRule::new(50.0, 0.2, 0.6).unwrap();
        let s = Bet::normal()
            .with_wager(100.0)
            .with_odds(0.5)
            .with_bonus(bonus)
            .settle()
            .unwrap();
        assert_close(s.payout, 210.0);
        assert_close(s.spent, 100.0);
    }

    // ==================== Free Bet Tests ====================

    #[test]
    fn test_free_bet_full_amount() {
        let bet = Bet::free(600.0, false).with_wager(600.0).with_odds(0.5);
        assert_close(bet.promotional_principal(600.0, 0.5), 600.0);
        let s = bet.settle().unwrap();
        assert_close(s.payout, 600.0);
        assert_close(s.spent, 0.0);
    }

    #[test]
    fn test_free_bet_not_splitable_below_amount() {
        let bet = Bet::free(600.0, false).with_wager(300.0).with_odds(0.5);
        assert_eq!(bet.promotional_principal(300.0, 0.5), 0.0);
        let s = bet.settle().unwrap();
        assert_close(s.payout, 600.0);
        assert_close(s.spent, 300.0);
    }

    #[test]
    fn test_free_bet_splitable_below_amount() {
        let bet = Bet::free(600.0, true).with_wager(300.0).with_odds(0.5);
        let s = bet.settle().unwrap();
        assert_close(s.payout, 300.0);
        assert_close(s.spent, 0.0);
    }

    #[test]
    fn test_free_bet_above_amount() {
        let bet = Bet::free(100.0, false).with_wager(250.0).with_odds(0.5);
        let s = bet.settle().unwrap();
        assert_close(s.payout, 400.0);
        assert_close(s.spent, 150.0);
    }

    #[test]
    fn test_free_bet_bonus_on_cash_part_only() {
        let bonus = BonusRule::new(f64::INFINITY, 0.1, 1.0).unwrap();
        let bet = Bet::free(100.0, false)
            .with_wager(250.0)
            .with_odds(0.5)
            .with_bonus(bonus);
        let s = bet.settle().unwrap();
        assert_close(s.payout, 500.0 - 100.0 + 15.0);
    }

    // ==================== Insured Bet Tests ====================

    #[test]
    fn test_insured_bet() {
        let bet = Bet::insured(1000.0, false).with_wager(1000.0).with_odds(0.4);
        let s = bet.settle().unwrap();
        assert_close(s.payout, 2500.0 - 700.0);
        assert_close(s.spent, 300.0);
        assert_close(bet.promotional_value(1000.0, 0.4).unwrap(), 700.0);
    }

    #[test]
    fn test_insured_bet_not_splitable_below_amount() {
        let bet = Bet::insured(1000.0, false).with_wager(500.0).with_odds(0.4);
        let s = bet.settle().unwrap();
        assert_close(s.payout, 1250.0);
        assert_close(s.spent, 500.0);
    }

    // ==================== Profit Boost Tests ====================

    #[test]
    fn test_profit_boost_full() {
        let rule = ProfitBoostRule::uncapped(250.0, 1.0).unwrap();
        let bet = Bet::profit_boost(rule).with_wager(250.0).with_odds(0.5);
        let s = bet.settle().unwrap();
        // +100 boosted 100% pays +200: 250 * 3.
        assert_close(s.payout, 750.0);
        assert_close(s.spent, 250.0);
    }

    #[test]
    fn test_profit_boost_partial() {
        let rule = ProfitBoostRule::uncapped(100.0, 1.0).unwrap();
        let bet = Bet::profit_boost(rule).with_wager(300.0).with_odds(0.5);
        let s = bet.settle().unwrap();
        assert_close(s.payout, 200.0 * 2.0 + 100.0 * 3.0);
        assert!(bet.promotional_value(300.0, 0.5).is_none());
    }

    // ==================== Invariants ====================

    #[test]
    fn test_spend_never_exceeds_wager() {
        let rule = ProfitBoostRule::uncapped(100.0, 0.5).unwrap();
        let bets = [
            Bet::normal(),
            Bet::free(100.0, false),
            Bet::free(100.0, true),
            Bet::insured(100.0, false),
            Bet::insured(100.0, true),
            Bet::profit_boost(rule),
        ];
        for bet in bets {
            for wager in [0.0, 50.0, 100.0, 250.0] {
                for odds in [0.1, 0.5, 0.9] {
                    let s = bet.with_wager(wager).with_odds(odds).settle().unwrap();
                    assert!(s.spent <= wager + EPS, "{bet} {wager} {odds}");
                    assert!(s.spent >= -EPS);
                }
            }
        }
    }

    #[test]
    fn test_clamp_principal_idempotent() {
        for splitable in [false, true] {
            for wager in [0.0, 50.0, 100.0, 150.0] {
                let once = clamp_principal(wager, 100.0, splitable);
                assert_eq!(clamp_principal(once, 100.0, splitable), once);
            }
        }
    }

    // ==================== Validation ====================

    #[test]
    fn test_settle_requires_known_values() {
        let err = Bet::normal().settle().unwrap_err();
        assert!(matches!(err, HedgeError::Underdetermined(_)));
        let err = Bet::normal().with_wager(10.0).settle().unwrap_err();
        assert!(matches!(err, HedgeError::Underdetermined(_)));
    }

    #[test]
    fn test_settle_rejects_invalid_input() {
        let err = Bet::normal().with_wager(-1.0).with_odds(0.5).settle().unwrap_err();
        assert!(matches!(err, HedgeError::InvalidInput(_)));
        for odds in [0.0, 1.0, 1.5] {
            let err = Bet::normal().with_wager(1.0).with_odds(odds).settle().unwrap_err();
            assert!(matches!(err, HedgeError::InvalidInput(_)));
        }
    }

    // ==================== Bet Spec ====================

    #[test]
    fn test_bet_spec_free_defaults_amount_to_wager() {
        let spec: BetSpec = serde_json::from_str(r#"{"kind": "free", "wager": 600}"#).unwrap();
        let bet = spec.into_bet().unwrap();
        assert_eq!(
            *bet.kind(),
            BetKind::Free {
                free_amount: 600.0,
                splitable: false
            }
        );
        assert_eq!(bet.wager(), Some(600.0));
        assert_eq!(bet.odds(), None);
    }

    #[test]
    fn test_bet_spec_profit_boost() {
        let spec: BetSpec = serde_json::from_str(
            r#"{"kind": "profit_boost", "wager": 250,
                "profit_boost": {"max_bet": 250, "boost_rate": 1.0}}"#,
        )
        .unwrap();
        let bet = Bet::try_from(spec).unwrap();
        assert!(matches!(bet.kind(), BetKind::ProfitBoost(_)));
    }

    #[test]
    fn test_bet_spec_normal_with_bonus() {
        let spec: BetSpec = serde_json::from_str(
            r#"{"kind": "normal", "wager": 5000,
                "bonus": {"bonus_rate": 0.1666, "min_odds": "-200"}}"#,
        )
        .unwrap();
        let bet = spec.into_bet().unwrap();
        assert!((bet.bonus().bonus_rate() - 0.1666).abs() < EPS);
    }

    #[test]
    fn test_bet_spec_rejects_negative_wager() {
        let spec: BetSpec = serde_json::from_str(r#"{"kind": "normal", "wager": -5}"#).unwrap();
        assert!(spec.into_bet().is_err());
    }
}
