//! `convert`: show a quoted price as implied probability and American odds.
//!
//! ```bash
//! odds-hedge convert -- -200
//! odds-hedge convert 2.50
//! ```

use anyhow::{anyhow, Result};
use clap::Args;
use odds_hedge_core::{implied_to_american, parse_odds};

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// American (+150, -200), decimal (2.50) or implied probability (0.4)
    #[arg(allow_hyphen_values = true)]
    pub odds: String,
}

/// Parses a price in any accepted notation into an implied probability.
///
/// Bare values in `(0, 1)` are taken as implied probabilities already.
///
/// # Errors
///
/// Returns an error when the string is not a recognizable price.
pub fn parse_price(odds: &str) -> Result<f64> {
    match parse_odds(odds) {
        Ok(ip) => Ok(ip),
        Err(e) => match odds.trim().parse::<f64>() {
            Ok(ip) if ip > 0.0 && ip < 1.0 => Ok(ip),
            _ => Err(anyhow!(e)),
        },
    }
}

/// Prints the conversions of `args.odds`.
///
/// # Errors
///
/// Returns an error when the odds cannot be parsed.
pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    let ip = parse_price(&args.odds)?;
    println!("Implied probability: {ip:.6}");
    println!("American: {}", implied_to_american(ip)?);
    println!("Decimal: {:.3}", 1.0 / ip);
    Ok(())
}
