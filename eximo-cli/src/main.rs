//! EXIMO CLI - Command-line interface
//!
//! Commands:
//! - play: Play a single game (any mix of human and AI controllers)
//! - bench: Run AI-vs-AI benchmark games and report search statistics

mod bench;
mod play;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eximo")]
#[command(about = "EXIMO board game: rules engine and minimax AI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play::PlayArgs),
    /// Run AI-vs-AI benchmark games
    Bench(bench::BenchArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
        Commands::Bench(args) => bench::run(args),
    }
}
