//! Play command - run one game between any mix of human and AI controllers
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_game(), report_outcome()
//! - Level 3: human_turn(), ai_turn()
//! - Level 4: input parsing and formatting utilities

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use eximo_core::{Coord, Evaluator, GameState, Phase, Player, SearchStats, Searcher, EVALUATORS};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Controller {
    Human,
    Ai,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Controller for player one (moves first)
    #[arg(long, value_enum, default_value_t = Controller::Human)]
    pub one: Controller,

    /// Controller for player two
    #[arg(long, value_enum, default_value_t = Controller::Ai)]
    pub two: Controller,

    /// Search depth for player one's AI
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..=9))]
    pub depth_one: u32,

    /// Search depth for player two's AI
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..=9))]
    pub depth_two: u32,

    /// Evaluator for player one's AI (1-4)
    #[arg(long, default_value = "2")]
    pub eval_one: u8,

    /// Evaluator for player two's AI (1-4)
    #[arg(long, default_value = "2")]
    pub eval_two: u8,

    /// Disable alpha-beta pruning
    #[arg(long)]
    pub no_pruning: bool,

    /// Disable best-first move ordering
    #[arg(long)]
    pub no_ordering: bool,

    /// Stop the game as unfinished after this many turns
    #[arg(long, default_value = "500")]
    pub max_turns: u32,
}

/// One side's controller, fully configured
#[derive(Clone, Copy, Debug)]
enum Agent {
    Human,
    Ai {
        depth: u32,
        evaluator: Evaluator,
        pruning: bool,
        ordering: bool,
    },
}

/// Per-side aggregate of the search statistics
#[derive(Clone, Debug, Default)]
struct AgentTotals {
    searches: u64,
    duration: Duration,
    leaves: u64,
    expansions: u64,
    expanded_children: u64,
    cuts: u64,
    /// Element-wise sum of the per-level cut buckets (index 0 = root)
    cut_levels: Vec<u64>,
}

impl AgentTotals {
    fn absorb(&mut self, stats: &SearchStats) {
        self.searches += 1;
        self.duration += stats.duration;
        self.leaves += stats.leaf_count;
        self.expansions += stats.expansion_count;
        self.expanded_children += stats.expansion_total;
        self.cuts += stats.cut_count;
        if self.cut_levels.len() < stats.cut_levels.len() {
            self.cut_levels.resize(stats.cut_levels.len(), 0);
        }
        for (total, count) in self.cut_levels.iter_mut().zip(&stats.cut_levels) {
            *total += count;
        }
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs) -> Result<()> {
    let one = build_agent(args.one, args.depth_one, args.eval_one, &args)?;
    let two = build_agent(args.two, args.depth_two, args.eval_two, &args)?;

    tracing::info!("Starting game: {:?} vs {:?}", one, two);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let (winner, turns, totals) = play_game(one, two, args.max_turns, &mut input)?;

    report_outcome(winner, turns, &totals);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play until one side has no legal turn or the turn limit is reached.
/// Returns the winner (None when unfinished), the turn count and per-side
/// search totals indexed by player.
fn play_game(
    one: Agent,
    two: Agent,
    max_turns: u32,
    input: &mut dyn BufRead,
) -> Result<(Option<Player>, u32, [AgentTotals; 2])> {
    let mut state = GameState::new();
    let mut totals = [AgentTotals::default(), AgentTotals::default()];
    let mut turns = 0;

    loop {
        // Idempotent on freshly derived states; re-establishes phase and
        // origins when the loop starts from an arbitrary position
        state.full_checkup();
        if state.is_game_over() {
            // The side to move is stuck; the opponent takes the game
            return Ok((Some(state.current_player().opponent()), turns, totals));
        }
        if turns >= max_turns {
            return Ok((None, turns, totals));
        }

        let mover = state.current_player();
        let agent = match mover {
            Player::One => one,
            Player::Two => two,
        };
        state = match agent {
            Agent::Human => human_turn(&state, input)?,
            Agent::Ai {
                depth,
                evaluator,
                pruning,
                ordering,
            } => ai_turn(&state, depth, evaluator, pruning, ordering, &mut totals)?,
        };
        turns += 1;
    }
}

/// Print the final board-game outcome and the AI search totals
fn report_outcome(winner: Option<Player>, turns: u32, totals: &[AgentTotals; 2]) {
    println!("\n=== Game Over ===");
    match winner {
        Some(player) => println!("Winner: player {:?} after {} turns", player, turns),
        None => println!("Unfinished after {} turns", turns),
    }

    for (player, total) in [Player::One, Player::Two].into_iter().zip(totals) {
        if total.searches == 0 {
            continue;
        }
        println!("\nPlayer {:?} search totals:", player);
        println!("  Searches:       {}", total.searches);
        println!("  Total time:     {:.3}s", total.duration.as_secs_f64());
        println!(
            "  Avg time/turn:  {:.3}s",
            total.duration.as_secs_f64() / total.searches as f64
        );
        println!("  Leaves scored:  {}", total.leaves);
        println!("  Expansions:     {}", total.expansions);
        println!(
            "  Avg branching:  {:.2}",
            if total.expansions == 0 {
                0.0
            } else {
                total.expanded_children as f64 / total.expansions as f64
            }
        );
        println!("  Alpha-beta cuts: {}", total.cuts);
        println!("  Cuts by level:   {:?}", total.cut_levels);
    }
}

// ============================================================================
// LEVEL 3 - TURNS
// ============================================================================

/// Prompt the human through every action of one full turn. A turn may span
/// several inputs (jump and capture chains, double re-entry).
fn human_turn(state: &GameState, input: &mut dyn BufRead) -> Result<GameState> {
    let mover = state.current_player();
    let mut current = state.clone();

    while current.current_player() == mover && !current.is_game_over() {
        println!("\n{}", current.board());
        println!("Player {:?} to act: {}", mover, phase_hint(current.phase()));
        println!("From: {}", origin_list(&current));

        let line = prompt_line(input)?;
        let Some((origin, dest)) = parse_input(&line) else {
            println!("Enter coordinates as 'col row' or 'col row col row' (1-8).");
            continue;
        };
        match current.try_move(origin, dest) {
            Ok(next) => current = next,
            Err(err) => println!("Illegal: {err}"),
        }
    }
    Ok(current)
}

/// Let the searcher pick the full turn and fold its statistics into the
/// mover's totals.
fn ai_turn(
    state: &GameState,
    depth: u32,
    evaluator: Evaluator,
    pruning: bool,
    ordering: bool,
    totals: &mut [AgentTotals; 2],
) -> Result<GameState> {
    let mover = state.current_player();
    let outcome = Searcher::new(depth, mover, evaluator, pruning, ordering).search(state);

    if outcome.state == *state {
        bail!("searcher returned no successor for a live position");
    }

    tracing::info!(
        "Player {:?}: value {:.2}, {} leaves in {:.3}s",
        mover,
        outcome.stats.value,
        outcome.stats.leaf_count,
        outcome.stats.duration.as_secs_f64()
    );
    totals[mover as usize].absorb(&outcome.stats);

    println!("\n{}", outcome.state.board());
    Ok(outcome.state)
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Resolve a 1-based evaluator index from the command line
fn build_agent(kind: Controller, depth: u32, eval_index: u8, args: &PlayArgs) -> Result<Agent> {
    match kind {
        Controller::Human => Ok(Agent::Human),
        Controller::Ai => {
            let evaluator = *(eval_index as usize)
                .checked_sub(1)
                .and_then(|i| EVALUATORS.get(i))
                .with_context(|| format!("evaluator index {eval_index} not in 1-4"))?;
            Ok(Agent::Ai {
                depth,
                evaluator,
                pruning: !args.no_pruning,
                ordering: !args.no_ordering,
            })
        }
    }
}

/// Sorted, space-separated origin tiles for the prompt
fn origin_list(state: &GameState) -> String {
    let mut origins: Vec<Coord> = state.origins().iter().copied().collect();
    origins.sort();
    origins
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn phase_hint(phase: Phase) -> &'static str {
    match phase {
        Phase::Free => "move or jump (from-to)",
        Phase::Jump => "continue the jump chain (from-to)",
        Phase::Capture => "capture is mandatory (from-to)",
        Phase::AddSecond => "place a piece, two to go (tile)",
        Phase::AddFirst => "place a piece, one to go (tile)",
    }
}

fn prompt_line(input: &mut dyn BufRead) -> Result<String> {
    print!("> ");
    io::stdout().flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        bail!("input closed before the game finished");
    }
    Ok(line)
}

/// Parse 'col row' (re-entry tile) or 'col row col row' (origin and
/// destination); all values must be on the board.
fn parse_input(line: &str) -> Option<(Coord, Option<Coord>)> {
    let nums: Vec<u8> = line
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if !nums.iter().all(|n| (1..=8).contains(n)) {
        return None;
    }
    match nums.as_slice() {
        [col, row] => Some((Coord::new(*col, *row), None)),
        [c1, r1, c2, r2] => Some((Coord::new(*c1, *r1), Some(Coord::new(*c2, *r2)))),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
