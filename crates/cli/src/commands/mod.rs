//! CLI commands for the hedging engine.

pub mod bet_args;
pub mod convert;
pub mod find;
pub mod matching;

pub use bet_args::{BetArgs, BetKindArg};
pub use convert::{parse_price, run_convert, ConvertArgs};
pub use find::{run_find, FindArgs, OrderArg};
pub use matching::{run_match, MatchArgs};
