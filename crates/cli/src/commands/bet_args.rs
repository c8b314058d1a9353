//! Flags describing the promotional bet to hedge.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use odds_hedge_core::parse_odds;
use odds_hedge_engine::{Bet, BetSpec, BonusRule, ProfitBoostRule, ALWAYS_QUALIFIES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum BetKindArg {
    /// Plain cash wager
    #[default]
    Normal,
    /// Site credit that is not returned with the winnings
    Free,
    /// Losing stake refunded at 70%
    Insured,
    /// Part of the stake paid at boosted odds
    ProfitBoost,
}

impl std::fmt::Display for BetKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetKindArg::Normal => write!(f, "normal"),
            BetKindArg::Free => write!(f, "free"),
            BetKindArg::Insured => write!(f, "insured"),
            BetKindArg::ProfitBoost => write!(f, "profit-boost"),
        }
    }
}

/// The primary bet: kind, stake and promotion terms.
#[derive(Args, Debug, Clone)]
pub struct BetArgs {
    /// Promotion attached to the bet
    #[arg(long, value_enum, default_value = "normal")]
    pub kind: BetKindArg,

    /// Total stake
    #[arg(long)]
    pub wager: f64,

    /// Free part of the stake (defaults to the whole wager)
    #[arg(long)]
    pub free_amount: Option<f64>,

    /// Insured part of the stake (defaults to the whole wager)
    #[arg(long)]
    pub insured_amount: Option<f64>,

    /// Promotion may cover part of a smaller wager
    #[arg(long)]
    pub splitable: bool,

    /// Bonus paid on the qualifying stake, as a fraction
    #[arg(long, default_value = "0")]
    pub bonus_rate: f64,

    /// Largest stake the bonus applies to
    #[arg(long)]
    pub bonus_max_bet: Option<f64>,

    /// Longest odds that still earn the bonus (e.g. "-200", "2.50")
    #[arg(long, allow_hyphen_values = true)]
    pub bonus_min_odds: Option<String>,

    /// Profit boost, as a fraction (1.0 doubles the profit)
    #[arg(long)]
    pub boost_rate: Option<f64>,

    /// Largest stake the boost applies to (defaults to the wager)
    #[arg(long)]
    pub boost_max_bet: Option<f64>,

    /// Cap on boosted winnings
    #[arg(long)]
    pub boost_max_winnings: Option<f64>,

    /// Longest odds that still get the boost
    #[arg(long, allow_hyphen_values = true)]
    pub boost_min_odds: Option<String>,
}

impl BetArgs {
    /// Bonus rule from the `--bonus-*` flags.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid limits or unparseable odds.
    pub fn bonus(&self) -> Result<BonusRule> {
        let max_bet = self.bonus_max_bet.unwrap_or(f64::INFINITY);
        let rule = match &self.bonus_min_odds {
            Some(min_odds) => BonusRule::with_min_odds(max_bet, self.bonus_rate, min_odds),
            None => BonusRule::new(max_bet, self.bonus_rate, ALWAYS_QUALIFIES),
        };
        rule.context("invalid bonus terms")
    }

    /// Profit boost rule from the `--boost-*` flags.
    ///
    /// # Errors
    ///
    /// Returns an error if `--boost-rate` is missing or a term is invalid.
    pub fn profit_boost(&self) -> Result<ProfitBoostRule> {
        let Some(rate) = self.boost_rate else {
            bail!("--boost-rate is required for a profit boost bet");
        };
        let threshold = match &self.boost_min_odds {
            Some(min_odds) => parse_odds(min_odds)
                .with_context(|| format!("invalid --boost-min-odds {min_odds:?}"))?,
            None => ALWAYS_QUALIFIES,
        };
        ProfitBoostRule::new(
            self.boost_max_bet.unwrap_or(self.wager),
            rate,
            threshold,
            self.boost_max_winnings.unwrap_or(f64::INFINITY),
        )
        .context("invalid profit boost terms")
    }

    /// Declarative form of the bet.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid promotion terms.
    pub fn spec(&self) -> Result<BetSpec> {
        let bonus = self.bonus()?;
        let spec = match self.kind {
            BetKindArg::Normal => BetSpec::Normal {
                wager: self.wager,
                bonus,
            },
            BetKindArg::Free => BetSpec::Free {
                wager: self.wager,
                free_amount: self.free_amount,
                splitable: self.splitable,
                bonus,
            },
            BetKindArg::Insured => BetSpec::Insured {
                wager: self.wager,
                insured_amount: self.insured_amount,
                splitable: self.splitable,
                bonus,
            },
            BetKindArg::ProfitBoost => BetSpec::ProfitBoost {
                wager: self.wager,
                profit_boost: self.profit_boost()?,
                bonus,
            },
        };
        Ok(spec)
    }

    /// The bet with its wager fixed and odds unknown.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative wager or invalid promotion terms.
    pub fn to_bet(&self) -> Result<Bet> {
        self.spec()?.into_bet().context("invalid bet")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use odds_hedge_engine::BetKind;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        bet: BetArgs,
    }

    fn parse(args: &[&str]) -> BetArgs {
        TestCli::parse_from(std::iter::once("test").chain(args.iter().copied())).bet
    }

    #[test]
    fn test_free_bet_flags() {
        let bet = parse(&["--kind", "free", "--wager", "600"]).to_bet().unwrap();
        assert_eq!(
            *bet.kind(),
            BetKind::Free {
                free_amount: 600.0,
                splitable: false
            }
        );
    }

    #[test]
    fn test_bonus_with_american_threshold() {
        let args = parse(&[
            "--wager",
            "5000",
            "--bonus-rate",
            "0.1666",
            "--bonus-min-odds",
            "-200",
        ]);
        let bonus = args.bonus().unwrap();
        assert!((bonus.qualifying_odds() - 200.0 / 300.0).abs() < 1e-12);
        assert!(bonus.max_bet().is_infinite());
    }

    #[test]
    fn test_profit_boost_requires_rate() {
        let args = parse(&["--kind", "profit-boost", "--wager", "250"]);
        assert!(args.to_bet().is_err());

        let args = parse(&["--kind", "profit-boost", "--wager", "250", "--boost-rate", "1"]);
        let bet = args.to_bet().unwrap();
        match bet.kind() {
            BetKind::ProfitBoost(rule) => assert_eq!(rule.max_bet(), 250.0),
            other => panic!("unexpected kind {other}"),
        }
    }
}
