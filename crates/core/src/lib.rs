pub mod config;
pub mod config_loader;
pub mod odds;

pub use config::{AppConfig, LoggingConfig, RankOrder, SearchConfig};
pub use config_loader::ConfigLoader;
pub use odds::{
    american_to_implied, decimal_to_implied, implied_to_american, parse_odds, OddsFormatError,
};
