//! `match`: size the hedge for one known bet.
//!
//! ```bash
//! odds-hedge match --wager 100 --odds +150 --hedge-odds -150
//! odds-hedge match --kind insured --wager 1000 --odds 0.4 --hedge-odds 0.62
//! ```

use anyhow::{Context, Result};
use clap::Args;
use odds_hedge_core::implied_to_american;
use odds_hedge_engine::{Bet, MatchedBet};
use tracing::debug;

use super::bet_args::BetArgs;
use super::convert::parse_price;

#[derive(Args, Debug, Clone)]
pub struct MatchArgs {
    #[command(flatten)]
    pub bet: BetArgs,

    /// Price of the primary bet
    #[arg(long, allow_hyphen_values = true)]
    pub odds: String,

    /// Price available for the opposing outcome
    #[arg(long, allow_hyphen_values = true)]
    pub hedge_odds: String,
}

/// Solves the hedge for the primary bet.
///
/// # Errors
///
/// Returns an error for unparseable prices, invalid terms, or when no hedge
/// wager balances the payouts.
pub fn solve(args: &MatchArgs) -> Result<(Bet, MatchedBet)> {
    let odds = parse_price(&args.odds).context("invalid --odds")?;
    let hedge_odds = parse_price(&args.hedge_odds).context("invalid --hedge-odds")?;
    let primary = args.bet.to_bet()?.with_odds(odds);
    debug!(%primary, hedge_odds, "Solving hedge");

    let matched = Bet::normal()
        .with_odds(hedge_odds)
        .solve_matching(&[], &[primary])
        .context("no hedge balances this bet")?;
    Ok((primary, matched))
}

/// Prints the hedge for the primary bet.
///
/// # Errors
///
/// See [`solve`].
pub fn run_match(args: &MatchArgs) -> Result<()> {
    let (primary, matched) = solve(args)?;
    let odds = primary.odds().unwrap_or_default();
    let wager = primary.wager().unwrap_or_default();
    let settlement = primary.settle()?;

    println!("{primary}");
    println!(
        "  pays ${:.2}, costs ${:.2} ({})",
        settlement.payout,
        settlement.spent,
        implied_to_american(odds)?
    );
    println!("Hedge: {}", matched.bet);
    println!(
        "  ${:.2} @ {}",
        matched.value,
        implied_to_american(matched.bet.odds().unwrap_or_default())?
    );
    println!("Payout: {:.2}", matched.total_payout);
    println!("Spent: {:.2}", matched.total_spent);
    println!("Profit: {:.2}", matched.profit());
    if let Some(value) = primary.promotional_value(wager, odds).filter(|v| *v > 0.0) {
        println!("Efficiency: {:.2}%", matched.profit() / value * 100.0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: MatchArgs,
    }

    fn parse(args: &[&str]) -> MatchArgs {
        TestCli::parse_from(std::iter::once("test").chain(args.iter().copied())).args
    }

    #[test]
    fn test_solve_normal_hedge() {
        let args = parse(&["--wager", "100", "--odds", "0.4", "--hedge-odds", "0.6"]);
        let (_, matched) = solve(&args).unwrap();
        assert!((matched.value - 150.0).abs() < 1e-9);
        assert!(matched.profit().abs() < 1e-9);
    }

    #[test]
    fn test_solve_with_american_prices() {
        let args = parse(&[
            "--kind",
            "free",
            "--wager",
            "600",
            "--odds",
            "+100",
            "--hedge-odds",
            "-120",
        ]);
        let (_, matched) = solve(&args).unwrap();
        // Free 600 @ +100 pays 600; hedge @ -120 (6/11).
        assert!((matched.value - 600.0 * 6.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_solve_rejects_bad_price() {
        let args = parse(&["--wager", "100", "--odds", "abc", "--hedge-odds", "0.6"]);
        assert!(solve(&args).is_err());
    }
}
