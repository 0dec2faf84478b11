//! Bench command - AI-vs-AI games comparing two search configurations
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_bench(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: formatting utilities

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use eximo_core::{Evaluator, GameState, Player, Searcher, EVALUATORS};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchArgs {
    /// Number of games to play (sides alternate between games)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Search depth for side A
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=9))]
    pub depth_a: u32,

    /// Search depth for side B
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=9))]
    pub depth_b: u32,

    /// Evaluator for side A (1-4)
    #[arg(long, default_value = "2")]
    pub eval_a: u8,

    /// Evaluator for side B (1-4)
    #[arg(long, default_value = "3")]
    pub eval_b: u8,

    /// Disable alpha-beta pruning on both sides
    #[arg(long)]
    pub no_pruning: bool,

    /// Disable best-first move ordering on both sides
    #[arg(long)]
    pub no_ordering: bool,

    /// Maximum turns per game
    #[arg(long, default_value = "200")]
    pub max_turns: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Output one CSV line per game (for batch scripting)
    #[arg(long, conflicts_with = "json")]
    pub csv: bool,
}

/// One search configuration under test
#[derive(Clone, Copy, Debug)]
struct Side {
    name: &'static str,
    depth: u32,
    evaluator: Evaluator,
    pruning: bool,
    ordering: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    /// Winning side's name; `None` when the game hit the turn limit
    winner: Option<&'static str>,
    turns: u32,
    search_time: Duration,
    leaves: u64,
    cuts: u64,
}

/// Aggregated benchmark results
#[derive(Clone, Debug)]
struct BenchResults {
    games: Vec<GameRecord>,
    a_wins: usize,
    b_wins: usize,
    unfinished: usize,
    avg_turns: f64,
    total_search_time: Duration,
    total_leaves: u64,
    total_cuts: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run bench command
pub fn run(args: BenchArgs) -> Result<()> {
    let side_a = Side {
        name: "A",
        depth: args.depth_a,
        evaluator: evaluator_from_index(args.eval_a)?,
        pruning: !args.no_pruning,
        ordering: !args.no_ordering,
    };
    let side_b = Side {
        name: "B",
        depth: args.depth_b,
        evaluator: evaluator_from_index(args.eval_b)?,
        pruning: !args.no_pruning,
        ordering: !args.no_ordering,
    };

    tracing::info!(
        "Starting benchmark: {:?} vs {:?} ({} games)",
        side_a,
        side_b,
        args.games
    );

    let results = play_bench(side_a, side_b, &args);

    report_results(&results, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all benchmark games, alternating which side moves first
fn play_bench(side_a: Side, side_b: Side, args: &BenchArgs) -> BenchResults {
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        // Alternate the first mover for fairness
        let swap = game_num % 2 == 1;
        let record = if swap {
            play_single_game(side_b, side_a, game_num + 1, args.max_turns)
        } else {
            play_single_game(side_a, side_b, game_num + 1, args.max_turns)
        };

        tracing::info!(
            "Game {}: winner {} in {} turns ({:.3}s search)",
            record.game_number,
            record.winner.unwrap_or("none"),
            record.turns,
            record.search_time.as_secs_f64()
        );
        games.push(record);
    }

    compute_statistics(games)
}

/// Report benchmark results
fn report_results(results: &BenchResults, args: &BenchArgs) {
    if args.json {
        print_json_results(results);
    } else if args.csv {
        print_csv_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game; `first` controls player one, `second` player two
fn play_single_game(first: Side, second: Side, game_number: usize, max_turns: u32) -> GameRecord {
    let mut state = GameState::new();
    let mut turns = 0;
    let mut search_time = Duration::ZERO;
    let mut leaves = 0;
    let mut cuts = 0;

    let winner = loop {
        if state.is_game_over() {
            break Some(match state.current_player() {
                Player::One => second.name,
                Player::Two => first.name,
            });
        }
        if turns >= max_turns {
            break None;
        }

        let side = match state.current_player() {
            Player::One => first,
            Player::Two => second,
        };
        let outcome = Searcher::new(
            side.depth,
            state.current_player(),
            side.evaluator,
            side.pruning,
            side.ordering,
        )
        .search(&state);

        search_time += outcome.stats.duration;
        leaves += outcome.stats.leaf_count;
        cuts += outcome.stats.cut_count;
        state = outcome.state;
        turns += 1;
    };

    GameRecord {
        game_number,
        winner,
        turns,
        search_time,
        leaves,
        cuts,
    }
}

/// Compute aggregate statistics from game records
fn compute_statistics(games: Vec<GameRecord>) -> BenchResults {
    let a_wins = games.iter().filter(|g| g.winner == Some("A")).count();
    let b_wins = games.iter().filter(|g| g.winner == Some("B")).count();
    let unfinished = games.iter().filter(|g| g.winner.is_none()).count();

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f64 / games.len() as f64
    };
    let total_search_time = games.iter().map(|g| g.search_time).sum();
    let total_leaves = games.iter().map(|g| g.leaves).sum();
    let total_cuts = games.iter().map(|g| g.cuts).sum();

    BenchResults {
        games,
        a_wins,
        b_wins,
        unfinished,
        avg_turns,
        total_search_time,
        total_leaves,
        total_cuts,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Resolve a 1-based evaluator index from the command line
fn evaluator_from_index(index: u8) -> Result<Evaluator> {
    (index as usize)
        .checked_sub(1)
        .and_then(|i| EVALUATORS.get(i))
        .copied()
        .with_context(|| format!("evaluator index {index} not in 1-4"))
}

/// Print results as JSON
fn print_json_results(results: &BenchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        winner: Option<&'static str>,
        turns: u32,
        search_seconds: f64,
        leaves: u64,
        cuts: u64,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        a_wins: usize,
        b_wins: usize,
        unfinished: usize,
        avg_turns: f64,
        total_search_seconds: f64,
        total_leaves: u64,
        total_cuts: u64,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        a_wins: results.a_wins,
        b_wins: results.b_wins,
        unfinished: results.unfinished,
        avg_turns: results.avg_turns,
        total_search_seconds: results.total_search_time.as_secs_f64(),
        total_leaves: results.total_leaves,
        total_cuts: results.total_cuts,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                winner: g.winner,
                turns: g.turns,
                search_seconds: g.search_time.as_secs_f64(),
                leaves: g.leaves,
                cuts: g.cuts,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print one CSV line per game
fn print_csv_results(results: &BenchResults) {
    println!("game,winner,turns,search_seconds,leaves,cuts");
    for game in &results.games {
        println!(
            "{},{},{},{:.6},{},{}",
            game.game_number,
            game.winner.unwrap_or("none"),
            game.turns,
            game.search_time.as_secs_f64(),
            game.leaves,
            game.cuts
        );
    }
}

/// Print results as text
fn print_text_results(results: &BenchResults) {
    let total = results.games.len();

    println!("\n=== Benchmark Results ===");
    println!("Total games: {}", total);
    println!("Side A wins: {} ({:.1}%)", results.a_wins, percent(results.a_wins, total));
    println!("Side B wins: {} ({:.1}%)", results.b_wins, percent(results.b_wins, total));
    println!(
        "Unfinished:  {} ({:.1}%)",
        results.unfinished,
        percent(results.unfinished, total)
    );
    println!("Avg turns:   {:.1}", results.avg_turns);
    println!(
        "Search time: {:.3}s total, {} leaves, {} cuts",
        results.total_search_time.as_secs_f64(),
        results.total_leaves,
        results.total_cuts
    );

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: winner {} in {} turns ({:.3}s search)",
            game.game_number,
            game.winner.unwrap_or("none"),
            game.turns,
            game.search_time.as_secs_f64()
        );
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
