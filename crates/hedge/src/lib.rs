//! Promotional-bet hedging across sportsbooks.
//!
//! Sportsbooks hand out free bets, insured bets, profit boosts and
//! deposit-style bonuses. Each promotion changes how a wager pays out, which
//! makes it possible to lock in a profit by betting the opposing outcome at a
//! different book.
//!
//! # Overview
//!
//! ```text
//! Book A: $600 free bet on HOME @ +100 (0.50)   pays  600 if HOME wins
//! Book B: hedge AWAY           @ -120 (0.545)
//!
//! Hedge stake so both sides pay 600:  600 * 0.545 = $327.27
//!   HOME wins: 600 - 327.27 spent   = +272.73
//!   AWAY wins: 600 - 327.27 spent   = +272.73
//! ```
//!
//! # Modules
//!
//! - [`types`]: Validated event records and event identity
//! - [`rules`]: Bonus and profit-boost rules
//! - [`bet`]: Bet kinds, their payout algebra and the declarative [`BetSpec`]
//! - [`solver`]: Sizing the matching bet of a hedge
//! - [`index`]: Best odds per outcome across sources
//! - [`search`]: Candidate hedge generation and ranking
//!
//! # Example
//!
//! ```ignore
//! use odds_hedge_engine::{Bet, HedgeSearch, OddsIndex};
//!
//! let index = OddsIndex::from_records(records.clone());
//! let primary = Bet::free(600.0, false).with_wager(600.0);
//! let ranked = HedgeSearch::new(&index).find_hedges(&primary, &site_a_records);
//!
//! for candidate in ranked.descending().take(5) {
//!     println!("{candidate}\n");
//! }
//! ```
//!
//! All odds are implied probabilities in `(0, 1)`; lower is a longer price.

pub mod bet;
pub mod error;
pub mod index;
pub mod rules;
pub mod search;
pub mod solver;
pub mod types;

pub use bet::{clamp_principal, Bet, BetKind, BetSpec, Settlement, INSURED_REFUND_RATE};
pub use error::{HedgeError, Result};
pub use index::{EventBook, IndexEntry, OddsIndex};
pub use rules::{boost_odds, BonusRule, ProfitBoostRule, ALWAYS_QUALIFIES};
pub use search::{render, HedgeCandidate, HedgeLeg, HedgeSearch, RankedHedges, SearchStats};
pub use solver::{sum_sides, MatchedBet, Unknown};
pub use types::{EventId, EventRecord, OddsTable, RawEventRecord};
