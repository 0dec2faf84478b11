//! EXIMO Core - Game engine and AI
//!
//! This crate provides the core game logic for EXIMO:
//! - Board storage (8x8 grid, 1-indexed coordinates)
//! - Turn phases, move generation and the mandatory-capture rule
//! - Piece re-entry when a soldier reaches the far row
//! - Four static position evaluators
//! - Depth-limited minimax with optional alpha-beta pruning and
//!   best-first move ordering

pub mod board;
pub mod game;
pub mod eval;
pub mod search;

// Re-exports for convenient access
pub use board::{Board, Coord, BOARD_SIZE};
pub use game::{Action, GameState, IllegalAction, Phase, Player};
pub use eval::{Evaluator, EVALUATORS};
pub use search::{SearchOutcome, SearchStats, Searcher};
