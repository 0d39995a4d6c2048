//! Trustgate CLI — query trust scores and tiers from a snapshot.
//!
//! Subcommands: score, tier, gate, progress.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Trustgate — attestation-based trust scores and tier gating.
#[derive(Parser, Debug)]
#[command(name = "trustgate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the trust score for an identity.
    Score(commands::score::ScoreArgs),
    /// Show an identity's tier, requirements, and next-tier progress.
    Tier(commands::tier::TierArgs),
    /// Check whether an identity meets a minimum tier.
    Gate(commands::gate::GateArgs),
    /// Show per-requirement progress toward a target tier.
    Progress(commands::progress::ProgressArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Score(args) => commands::score::run(args).await,
        Commands::Tier(args) => commands::tier::run(args).await,
        Commands::Gate(args) => commands::gate::run(args).await,
        Commands::Progress(args) => commands::progress::run(args).await,
    }
}
