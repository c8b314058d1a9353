//! `find`: rank hedges for a promotional bet across every loaded book.
//!
//! ```bash
//! odds-hedge find --records data/records.json --source site_2 --kind free --wager 600
//! odds-hedge find --records data/records.json --source site_1 --wager 5000 \
//!     --bonus-rate 0.1666 --bonus-min-odds -200 --top 3 --order desc
//! ```

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use odds_hedge_core::{RankOrder, SearchConfig};
use odds_hedge_engine::{render, HedgeCandidate, HedgeSearch, OddsIndex};
use serde::Serialize;
use tracing::info;

use super::bet_args::BetArgs;
use crate::loader::load_records;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Worst first
    Asc,
    /// Best first
    Desc,
}

impl From<OrderArg> for RankOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Asc => RankOrder::Ascending,
            OrderArg::Desc => RankOrder::Descending,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FindArgs {
    /// Event records file (JSON array or .jsonl)
    #[arg(long)]
    pub records: PathBuf,

    /// Book the primary bet is placed at
    #[arg(long)]
    pub source: String,

    #[command(flatten)]
    pub bet: BetArgs,

    /// Best complementary prices to try per outcome
    #[arg(long)]
    pub top: Option<usize>,

    /// Ranking order of the printed list
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Drop hedges with a lower profit
    #[arg(long, allow_hyphen_values = true)]
    pub min_profit: Option<f64>,

    /// Print at most this many hedges
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print candidates as JSON instead of text reports
    #[arg(long)]
    pub json: bool,
}

impl FindArgs {
    /// Flags layered over the loaded search settings.
    #[must_use]
    pub fn search_config(&self, base: &SearchConfig) -> SearchConfig {
        SearchConfig {
            max_per_outcome: self.top.or(base.max_per_outcome),
            order: self.order.map_or(base.order, RankOrder::from),
            min_profit: self.min_profit.or(base.min_profit),
            limit: self.limit.or(base.limit),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    source: &'a str,
    kind: String,
    wager: f64,
    candidates: Vec<&'a HedgeCandidate>,
}

/// Runs the search and prints the ranked hedges to stdout.
///
/// # Errors
///
/// Returns an error if the records cannot be loaded or the bet is invalid.
pub fn run_find(args: &FindArgs, base: &SearchConfig) -> Result<()> {
    let config = args.search_config(base);
    let bet = args.bet.to_bet()?;

    let loaded = load_records(&args.records)?;
    let primary: Vec<_> = loaded.from_source(&args.source).collect();
    if primary.is_empty() {
        bail!(
            "no records from source {:?} in {}",
            args.source,
            args.records.display()
        );
    }

    let index = OddsIndex::from_records(loaded.records.iter().cloned());
    info!(
        events = index.len(),
        records = index.record_count(),
        primary = primary.len(),
        bet = %bet,
        "Searching hedges"
    );

    let ranked = HedgeSearch::new(&index)
        .with_config(config.clone())
        .find_hedges(&bet, primary);

    if args.json {
        let mut candidates = ranked.ordered(config.order);
        if let Some(limit) = config.limit {
            candidates.truncate(limit);
        }
        let report = JsonReport {
            source: &args.source,
            kind: bet.kind().to_string(),
            wager: args.bet.wager,
            candidates,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if ranked.is_empty() {
        println!("No hedges found for {bet} at {}", args.source);
    } else {
        println!("{bet}\n");
        println!("{}", render(&ranked, config.order, config.limit));
    }
    Ok(())
}
