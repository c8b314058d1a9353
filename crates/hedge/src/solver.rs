//! Hedge sizing: find the unknown wager (or odds) that makes a bet pay out
//! exactly what the other side of the hedge already pays.
//!
//! Every payout relation in [`crate::bet`] is affine in the wager except for
//! two clamps: the bonus only applies to `min(max_bet, stake)`, and the
//! promotional principal depends on the wager itself. Both are resolved in
//! closed form:
//!
//! - The bonus clamp gives a piecewise-linear equation with two cases
//!   (`stake <= max_bet`, `stake > max_bet`). The payout is continuous and
//!   increasing in the wager, so exactly one case is self-consistent.
//! - The principal clamp is resolved in two passes: solve once assuming the
//!   whole wager is promotional, clamp that threshold, then re-solve with the
//!   clamped principal fixed.

use tracing::trace;

use crate::bet::{
    clamp_principal, unknown_names, validate_odds, validate_wager, Bet, BetKind, Settlement,
    INSURED_REFUND_RATE,
};
use crate::error::{HedgeError, Result};

/// Relative slack when checking a root against its own case assumption.
const CASE_TOLERANCE: f64 = 1e-12;

/// Which value of a bet was solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unknown {
    Wager,
    Odds,
}

impl std::fmt::Display for Unknown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wager => write!(f, "wager"),
            Self::Odds => write!(f, "odds"),
        }
    }
}

/// A bet completed by the solver, with totals across the whole hedge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedBet {
    /// The bet with the unknown filled in.
    pub bet: Bet,
    pub unknown: Unknown,
    /// The solved wager or odds.
    pub value: f64,
    /// Promotional principal the completed bet uses.
    pub principal: f64,
    /// This bet's own payout and spend.
    pub settlement: Settlement,
    /// Payout of the hedge whichever side wins.
    pub total_payout: f64,
    /// Total outlay across every bet of the hedge.
    pub total_spent: f64,
}

impl MatchedBet {
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.total_payout - self.total_spent
    }
}

/// Net payout still to be matched and total outlay of already placed bets.
///
/// Bets on the right side add their payout, bets on the left subtract it;
/// every bet adds its spend.
///
/// # Errors
///
/// Propagates the first settlement error of any bet.
pub fn sum_sides(left: &[Bet], right: &[Bet]) -> Result<Settlement> {
    let mut total = Settlement {
        payout: 0.0,
        spent: 0.0,
    };
    for bet in left {
        let s = bet.settle()?;
        total.payout -= s.payout;
        total.spent += s.spent;
    }
    for bet in right {
        let s = bet.settle()?;
        total.payout += s.payout;
        total.spent += s.spent;
    }
    Ok(total)
}

impl Bet {
    /// Solves this bet's single unknown so that it pays out what `left` and
    /// `right` net to (see [`sum_sides`]).
    ///
    /// # Errors
    ///
    /// - [`HedgeError::NoSolution`] when the sides net to zero or no
    ///   non-negative wager / valid odds satisfies the relation.
    /// - [`HedgeError::Underdetermined`] when both wager and odds are unknown.
    /// - [`HedgeError::Overdetermined`] when neither is unknown.
    /// - [`HedgeError::UnsupportedSolve`] when solving a profit boost for odds.
    /// - Settlement errors of the already placed bets.
    pub fn solve_matching(&self, left: &[Bet], right: &[Bet]) -> Result<MatchedBet> {
        let placed = sum_sides(left, right)?;
        if placed.payout == 0.0 {
            return Err(HedgeError::NoSolution(
                "cannot match a bet to a zero payout".to_string(),
            ));
        }

        let (bet, unknown, value, principal) = self.solve_for_payout(placed.payout)?;
        let settlement = bet.settle_with_principal(
            bet.wager().unwrap_or_default(),
            bet.odds().unwrap_or_default(),
            principal,
        );

        trace!(
            kind = %self.kind(),
            %unknown,
            value,
            target = placed.payout,
            payout = settlement.payout,
            "Solved matching bet"
        );

        Ok(MatchedBet {
            bet,
            unknown,
            value,
            principal,
            settlement,
            total_payout: settlement.payout,
            total_spent: placed.spent + settlement.spent,
        })
    }

    /// Fills in the single unknown so that the bet pays `target`.
    ///
    /// Returns the completed bet, which value was solved, the solved value and
    /// the promotional principal used.
    fn solve_for_payout(&self, target: f64) -> Result<(Bet, Unknown, f64, f64)> {
        match (self.wager(), self.odds()) {
            (None, Some(odds)) => {
                validate_odds(odds)?;
                let (wager, principal) = self.solve_wager(target, odds)?;
                check_wager(wager, target)?;
                Ok((self.with_wager(wager), Unknown::Wager, wager, principal))
            }
            (Some(wager), None) => {
                validate_wager(wager)?;
                let (odds, principal) = self.solve_odds(target, wager)?;
                Ok((self.with_odds(odds), Unknown::Odds, odds, principal))
            }
            (None, None) => Err(HedgeError::Underdetermined(format!(
                "{} bet has unknown {}, can only solve for one",
                self.kind(),
                unknown_names(None, None)
            ))),
            (Some(_), Some(_)) => Err(HedgeError::Overdetermined(format!(
                "{} bet has no unknown to solve for",
                self.kind()
            ))),
        }
    }

    fn solve_wager(&self, target: f64, odds: f64) -> Result<(f64, f64)> {
        let bonus = self.bonus();
        let rate = bonus.effective_rate(odds);
        let cap = bonus.max_bet();

        match *self.kind() {
            BetKind::Normal => {
                let wager = CappedLinear::new(1.0 / odds, rate, cap, 0.0, target).solve()?;
                Ok((wager, 0.0))
            }
            BetKind::Free {
                free_amount,
                splitable,
            } => {
                // Fully free: w/o - w = P.
                let threshold = CappedLinear::new(1.0 / odds - 1.0, 0.0, cap, 0.0, target).solve()?;
                let free = clamp_principal(threshold, free_amount, splitable);
                // w/o - f + bonus(w - f) = P
                let wager = CappedLinear::new(1.0 / odds, rate, cap, free, target + free).solve()?;
                Ok((wager, free))
            }
            BetKind::Insured {
                insured_amount,
                splitable,
            } => {
                // Fully insured: w/o - 0.7w + bonus(w) = P.
                let threshold =
                    CappedLinear::new(1.0 / odds - INSURED_REFUND_RATE, rate, cap, 0.0, target)
                        .solve()?;
                let insured = clamp_principal(threshold, insured_amount, splitable);
                let refund = insured * INSURED_REFUND_RATE;
                // w/o - 0.7i + bonus(w) = P
                let wager = CappedLinear::new(1.0 / odds, rate, cap, 0.0, target + refund).solve()?;
                Ok((wager, insured))
            }
            BetKind::ProfitBoost(rule) => {
                let boosted = rule.boosted_odds(odds);
                // Fully boosted: w/b + bonus(w) = P.
                let threshold = CappedLinear::new(1.0 / boosted, rate, cap, 0.0, target).solve()?;
                let boost = rule.boost_amount(odds, threshold);
                // (w - b)/o + b/boosted + bonus(w) = P
                let shifted = target + boost / odds - boost / boosted;
                let wager = CappedLinear::new(1.0 / odds, rate, cap, 0.0, shifted).solve()?;
                Ok((wager, boost))
            }
        }
    }

    fn solve_odds(&self, target: f64, wager: f64) -> Result<(f64, f64)> {
        let bonus = self.bonus();

        match *self.kind() {
            BetKind::Normal => {
                let qualifying_bonus = bonus.max_bet().min(wager) * bonus.bonus_rate();
                let odds = solve_odds(wager, target, qualifying_bonus, bonus.qualifying_odds())?;
                Ok((odds, 0.0))
            }
            BetKind::Free {
                free_amount,
                splitable,
            } => {
                let free = clamp_principal(wager, free_amount, splitable);
                let qualifying_bonus = bonus.max_bet().min(wager - free) * bonus.bonus_rate();
                let odds = solve_odds(
                    wager,
                    target + free,
                    qualifying_bonus,
                    bonus.qualifying_odds(),
                )?;
                Ok((odds, free))
            }
            BetKind::Insured {
                insured_amount,
                splitable,
            } => {
                let insured = clamp_principal(wager, insured_amount, splitable);
                let qualifying_bonus = bonus.max_bet().min(wager) * bonus.bonus_rate();
                let odds = solve_odds(
                    wager,
                    target + insured * INSURED_REFUND_RATE,
                    qualifying_bonus,
                    bonus.qualifying_odds(),
                )?;
                Ok((odds, insured))
            }
            BetKind::ProfitBoost(_) => Err(HedgeError::UnsupportedSolve(
                "solving a profit boost bet for its odds is not supported".to_string(),
            )),
        }
    }
}

fn check_wager(wager: f64, target: f64) -> Result<()> {
    if wager.is_finite() && wager >= 0.0 {
        Ok(())
    } else {
        Err(HedgeError::NoSolution(format!(
            "no non-negative wager pays {target} (solved {wager})"
        )))
    }
}

/// Solves `wager / odds + [odds <= threshold] * bonus = target` for `odds`.
///
/// The left side is strictly decreasing in `odds` (with a downward step at
/// the threshold), so at most one branch is consistent.
fn solve_odds(wager: f64, target: f64, qualifying_bonus: f64, threshold: f64) -> Result<f64> {
    let qualifying = wager / (target - qualifying_bonus);
    if qualifying > 0.0 && qualifying <= threshold && qualifying < 1.0 {
        return Ok(qualifying);
    }

    let plain = wager / target;
    if plain > threshold && plain > 0.0 && plain < 1.0 {
        return Ok(plain);
    }

    Err(HedgeError::NoSolution(format!(
        "no odds in (0, 1) make a {wager} wager pay {target}"
    )))
}

/// `slope * x + rate * min(cap, x - shift) = target`, solved for `x`.
#[derive(Debug, Clone, Copy)]
struct CappedLinear {
    slope: f64,
    rate: f64,
    cap: f64,
    shift: f64,
    target: f64,
}

impl CappedLinear {
    fn new(slope: f64, rate: f64, cap: f64, shift: f64, target: f64) -> Self {
        Self {
            slope,
            rate,
            cap,
            shift,
            target,
        }
    }

    fn solve(self) -> Result<f64> {
        if self.slope.is_nan() || self.slope <= 0.0 || !self.target.is_finite() {
            return Err(HedgeError::NoSolution(format!(
                "degenerate payout relation {self:?}"
            )));
        }
        if self.rate == 0.0 {
            return Ok(self.target / self.slope);
        }

        let slack = CASE_TOLERANCE * self.cap.abs().max(1.0);

        // Bonus stake below the cap.
        let below = (self.target + self.rate * self.shift) / (self.slope + self.rate);
        if below - self.shift <= self.cap + slack {
            return Ok(below);
        }

        // Cap binds.
        let above = (self.target - self.rate * self.cap) / self.slope;
        if above - self.shift >= self.cap - slack {
            return Ok(above);
        }

        Err(HedgeError::NoSolution(format!(
            "no root consistent with its bonus case for {self:?}"
        )))
    }
}
