use anyhow::Result;
use clap::{Parser, Subcommand};
use odds_hedge_cli::commands::{
    run_convert, run_find, run_match, ConvertArgs, FindArgs, MatchArgs,
};
use odds_hedge_cli::init_tracing;
use odds_hedge_core::{AppConfig, ConfigLoader};
use tracing::debug;

#[derive(Parser)]
#[command(name = "odds-hedge")]
#[command(about = "Find profitable hedges for sportsbook promotions", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Config profile layered over the base file (Config.<profile>.toml)
    #[arg(long, global = true, env = "ODDS_HEDGE_PROFILE")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank hedges for a promotional bet across all loaded books
    Find(FindArgs),
    /// Size the hedge for a single bet at known prices
    Match(MatchArgs),
    /// Convert a price between notations
    Convert(ConvertArgs),
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.profile {
        Some(profile) => ConfigLoader::load_with_profile(&cli.config, profile),
        None => ConfigLoader::load(&cli.config),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging)?;
    debug!(config = %cli.config, profile = ?cli.profile, "Configuration loaded");

    match &cli.command {
        Commands::Find(args) => run_find(args, &config.search),
        Commands::Match(args) => run_match(args),
        Commands::Convert(args) => run_convert(args),
    }
}
