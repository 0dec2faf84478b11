//! Static position evaluation
//!
//! Four interchangeable scoring functions, all single passes over the full
//! board, all from one player's perspective (higher is better for that
//! player). Every evaluator mixes in a small deterministic tie-break term so
//! equal positions resolve without bias while search stays reproducible.

use crate::game::{GameState, Player};
use serde::{Deserialize, Serialize};

/// Selects one of the static scoring functions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Evaluator {
    /// Advance distance + material difference
    MaterialAdvance,
    /// Distance/3 + 3x material + 2x own edge-column pieces
    EdgeWeighted,
    /// As EdgeWeighted but 2.3x the edge-piece differential
    EdgeDifferential,
    /// Distance/3 + 2.4x material + column-weighted center proximity
    CenterWeighted,
}

/// Column weights for `CenterWeighted` (columns 1..=8)
const CENTER_WEIGHTS: [f64; 8] = [9.0, 1.0, 2.0, 4.5, 4.5, 2.0, 1.0, 9.0];

/// Per-cell tallies shared by all four evaluators
struct Tally {
    own: f64,
    enemy: f64,
    advance: f64,
    own_edge: f64,
    enemy_edge: f64,
    center: f64,
}

fn tally(state: &GameState, perspective: Player) -> Tally {
    let enemy = perspective.opponent();
    let mut t = Tally {
        own: 0.0,
        enemy: 0.0,
        advance: 0.0,
        own_edge: 0.0,
        enemy_edge: 0.0,
        center: 0.0,
    };

    for row in 1..=8u8 {
        for col in 1..=8u8 {
            let cell = state.board().get(crate::board::Coord::new(col, row));
            if cell == Some(perspective) {
                t.own += 1.0;
                // Row distance traveled from the piece's own starting edge
                t.advance += match perspective {
                    Player::One => (9 - row) as f64,
                    Player::Two => row as f64,
                };
                if col == 1 || col == 8 {
                    t.own_edge += 1.0;
                }
                t.center += CENTER_WEIGHTS[col as usize - 1];
            } else if cell == Some(enemy) {
                t.enemy += 1.0;
                if col == 1 || col == 8 {
                    t.enemy_edge += 1.0;
                }
            }
        }
    }
    t
}

/// Deterministic stand-in for the tie-break: a hash of the board reduced to
/// 0..3, stable across runs.
fn tie_break(state: &GameState) -> f64 {
    (state.board().fingerprint() % 3) as f64
}

impl Evaluator {
    /// Score `state` from `perspective`'s point of view
    pub fn score(self, state: &GameState, perspective: Player) -> f64 {
        let t = tally(state, perspective);
        let material = t.own - t.enemy;
        let base = match self {
            Evaluator::MaterialAdvance => t.advance + material,
            Evaluator::EdgeWeighted => t.advance / 3.0 + material * 3.0 + t.own_edge * 2.0,
            Evaluator::EdgeDifferential => {
                t.advance / 3.0 + material * 3.0 + (t.own_edge - t.enemy_edge) * 2.3
            }
            Evaluator::CenterWeighted => {
                t.advance / 3.0 + material * 2.4 + t.center / 3.5
            }
        };
        base + tie_break(state)
    }
}

pub const EVALUATORS: [Evaluator; 4] = [
    Evaluator::MaterialAdvance,
    Evaluator::EdgeWeighted,
    Evaluator::EdgeDifferential,
    Evaluator::CenterWeighted,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Coord};

    #[test]
    fn test_starting_position_is_symmetric() {
        let state = GameState::new();
        for evaluator in EVALUATORS {
            let one = evaluator.score(&state, Player::One);
            let two = evaluator.score(&state, Player::Two);
            assert!(
                (one - two).abs() < 1e-9,
                "{evaluator:?}: {one} vs {two} on the mirrored start"
            );
        }
    }

    #[test]
    fn test_material_advantage_scores_higher() {
        let even = GameState::new();
        let mut board = even.board().clone();
        // Remove an enemy piece
        board.clear(Coord::new(2, 1));
        let up_one = GameState::with_board(board, Player::One);

        for evaluator in EVALUATORS {
            // Tie-break shifts scores by at most 2
            assert!(
                evaluator.score(&up_one, Player::One) + 2.0
                    > evaluator.score(&even, Player::One),
                "{evaluator:?} ignores captured material"
            );
        }
    }

    #[test]
    fn test_advance_counts_toward_goal() {
        let mut near = Board::empty();
        near.set(Coord::new(4, 2), Player::One);
        near.set(Coord::new(4, 7), Player::Two);
        let state = GameState::with_board(near, Player::One);

        let mut far = Board::empty();
        far.set(Coord::new(4, 7), Player::One);
        far.set(Coord::new(4, 2), Player::Two);
        let behind = GameState::with_board(far, Player::One);

        let evaluator = Evaluator::MaterialAdvance;
        assert!(
            evaluator.score(&state, Player::One) - evaluator.score(&behind, Player::One) > 2.0
        );
    }

    #[test]
    fn test_edge_pieces_weighted() {
        let mut edges = Board::empty();
        edges.set(Coord::new(1, 5), Player::One);
        edges.set(Coord::new(4, 4), Player::Two);
        let state = GameState::with_board(edges, Player::One);

        let mut middle = Board::empty();
        middle.set(Coord::new(4, 5), Player::One);
        middle.set(Coord::new(4, 4), Player::Two);
        let inner = GameState::with_board(middle, Player::One);

        // Same advance and material; the +2 edge bonus at least offsets the
        // worst-case tie-break spread of 2
        let evaluator = Evaluator::EdgeWeighted;
        let diff = evaluator.score(&state, Player::One) - evaluator.score(&inner, Player::One);
        assert!(diff >= 0.0);
    }

    #[test]
    fn test_tie_break_is_stable() {
        let a = GameState::new();
        let b = GameState::new();
        for evaluator in EVALUATORS {
            assert_eq!(
                evaluator.score(&a, Player::One),
                evaluator.score(&b, Player::One)
            );
        }
    }
}
