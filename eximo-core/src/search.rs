//! Depth-limited minimax over full-turn successors
//!
//! Depth counts full turns: each node's children are the completed-turn
//! states from `GameState::successors`, so maximizing and minimizing levels
//! alternate cleanly even though a turn may span several micro-actions.
//! Alpha-beta pruning and best-first ordering are both optional and must
//! never change the root value, only the node counts.

use crate::eval::Evaluator;
use crate::game::{GameState, Player};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

// ============================================================================
// STATISTICS
// ============================================================================

/// Counters collected during one search
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Wall-clock duration of the search
    pub duration: Duration,
    /// Nodes scored by the evaluator at the depth limit
    pub leaf_count: u64,
    /// Internal nodes expanded
    pub expansion_count: u64,
    /// Children generated across all expansions
    pub expansion_total: u64,
    /// Alpha-beta cuts
    pub cut_count: u64,
    /// Cuts bucketed by the ply at which they occurred (index 0 = root)
    pub cut_levels: Vec<u64>,
    /// Minimax value of the chosen successor
    pub value: f64,
}

impl SearchStats {
    /// Children per expansion, 0.0 before anything was expanded
    pub fn average_branching(&self) -> f64 {
        if self.expansion_count == 0 {
            0.0
        } else {
            self.expansion_total as f64 / self.expansion_count as f64
        }
    }
}

/// Chosen successor plus the collected statistics
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Best completed-turn successor; the root itself when the mover has no
    /// legal turn (the caller reads that as a loss)
    pub state: GameState,
    pub stats: SearchStats,
}

// ============================================================================
// SEARCHER
// ============================================================================

/// One-shot minimax searcher; construct per turn, consume with `search`
pub struct Searcher {
    depth: u32,
    player: Player,
    evaluator: Evaluator,
    use_pruning: bool,
    use_ordering: bool,
    stats: SearchStats,
}

impl Searcher {
    pub fn new(
        depth: u32,
        player: Player,
        evaluator: Evaluator,
        use_pruning: bool,
        use_ordering: bool,
    ) -> Self {
        Self {
            depth,
            player,
            evaluator,
            use_pruning,
            use_ordering,
            stats: SearchStats {
                cut_levels: vec![0; depth as usize + 1],
                ..SearchStats::default()
            },
        }
    }

    /// Explore the tree under `root` and pick the best full-turn successor
    pub fn search(mut self, root: &GameState) -> SearchOutcome {
        let start = Instant::now();
        let (value, best) = if self.use_ordering {
            self.max_value_ordered(root, f64::NEG_INFINITY, f64::INFINITY, self.depth)
        } else {
            self.max_value(root, f64::NEG_INFINITY, f64::INFINITY, self.depth)
        };
        self.stats.duration = start.elapsed();
        self.stats.value = value;
        SearchOutcome {
            state: best.unwrap_or_else(|| root.clone()),
            stats: self.stats,
        }
    }

    fn evaluate(&self, state: &GameState) -> f64 {
        self.evaluator.score(state, self.player)
    }

    fn record_cut(&mut self, remaining: u32) {
        self.stats.cut_count += 1;
        self.stats.cut_levels[(self.depth - remaining) as usize] += 1;
    }

    /// Expand and count; empty means game over at this node
    fn expand(&mut self, state: &GameState) -> Vec<GameState> {
        let children = state.successors();
        self.stats.expansion_count += 1;
        self.stats.expansion_total += children.len() as u64;
        children
    }

    // ========================================================================
    // PLAIN MINIMAX (optional pruning)
    // ========================================================================

    fn max_value(
        &mut self,
        state: &GameState,
        mut alpha: f64,
        beta: f64,
        depth: u32,
    ) -> (f64, Option<GameState>) {
        if depth == 0 {
            self.stats.leaf_count += 1;
            return (self.evaluate(state), None);
        }

        let children = self.expand(state);
        if children.is_empty() {
            return (self.evaluate(state), None);
        }

        let mut value = f64::NEG_INFINITY;
        let mut best = None;
        for child in children {
            let (child_value, _) = self.min_value(&child, alpha, beta, depth - 1);
            if child_value > value {
                value = child_value;
                best = Some(child);
            }
            if self.use_pruning && value >= beta {
                self.record_cut(depth);
                return (value, best);
            }
            alpha = alpha.max(value);
        }
        (value, best)
    }

    fn min_value(
        &mut self,
        state: &GameState,
        alpha: f64,
        mut beta: f64,
        depth: u32,
    ) -> (f64, Option<GameState>) {
        if depth == 0 {
            self.stats.leaf_count += 1;
            return (self.evaluate(state), None);
        }

        let children = self.expand(state);
        if children.is_empty() {
            return (self.evaluate(state), None);
        }

        let mut value = f64::INFINITY;
        let mut best = None;
        for child in children {
            let (child_value, _) = self.max_value(&child, alpha, beta, depth - 1);
            if child_value < value {
                value = child_value;
                best = Some(child);
            }
            if self.use_pruning && value <= alpha {
                self.record_cut(depth);
                return (value, best);
            }
            beta = beta.min(value);
        }
        (value, best)
    }

    // ========================================================================
    // BEST-FIRST ORDERED MINIMAX
    // ========================================================================

    fn order_children(&self, children: Vec<GameState>, sign: f64) -> BinaryHeap<OrderedChild> {
        children
            .into_iter()
            .map(|child| OrderedChild {
                key: sign * self.evaluate(&child),
                tie: child.board().fingerprint(),
                state: child,
            })
            .collect()
    }

    fn max_value_ordered(
        &mut self,
        state: &GameState,
        mut alpha: f64,
        beta: f64,
        depth: u32,
    ) -> (f64, Option<GameState>) {
        if depth == 0 {
            self.stats.leaf_count += 1;
            return (self.evaluate(state), None);
        }

        let children = self.expand(state);
        if children.is_empty() {
            return (self.evaluate(state), None);
        }
        // Highest shallow score pops first
        let mut heap = self.order_children(children, 1.0);

        let mut value = f64::NEG_INFINITY;
        let mut best = None;
        while let Some(node) = heap.pop() {
            let child_value = if depth == 1 {
                // The best-ordered child's shallow score already is the
                // extremum over this node's leaves
                self.stats.leaf_count += 1;
                heap.clear();
                node.key
            } else {
                self.min_value_ordered(&node.state, alpha, beta, depth - 1).0
            };

            if child_value > value {
                value = child_value;
                best = Some(node.state);
            }
            if self.use_pruning && value >= beta {
                self.record_cut(depth);
                return (value, best);
            }
            alpha = alpha.max(value);
        }
        (value, best)
    }

    fn min_value_ordered(
        &mut self,
        state: &GameState,
        alpha: f64,
        mut beta: f64,
        depth: u32,
    ) -> (f64, Option<GameState>) {
        if depth == 0 {
            self.stats.leaf_count += 1;
            return (self.evaluate(state), None);
        }

        let children = self.expand(state);
        if children.is_empty() {
            return (self.evaluate(state), None);
        }
        // Lowest shallow score pops first
        let mut heap = self.order_children(children, -1.0);

        let mut value = f64::INFINITY;
        let mut best = None;
        while let Some(node) = heap.pop() {
            let child_value = if depth == 1 {
                self.stats.leaf_count += 1;
                heap.clear();
                -node.key
            } else {
                self.max_value_ordered(&node.state, alpha, beta, depth - 1).0
            };

            if child_value < value {
                value = child_value;
                best = Some(node.state);
            }
            if self.use_pruning && value <= alpha {
                self.record_cut(depth);
                return (value, best);
            }
            beta = beta.min(value);
        }
        (value, best)
    }
}

/// Heap node for best-first ordering: shallow evaluation as the key, the
/// board fingerprint as a stable deterministic tie-break.
struct OrderedChild {
    key: f64,
    tie: u64,
    state: GameState,
}

impl PartialEq for OrderedChild {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedChild {}

impl PartialOrd for OrderedChild {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedChild {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.tie.cmp(&other.tie))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Coord};
    use crate::game::Phase;

    /// Player One is forced into a single capture; exactly one completed
    /// turn exists.
    fn single_turn_state() -> GameState {
        let mut board = Board::empty();
        board.set(Coord::new(1, 2), Player::One);
        board.set(Coord::new(2, 2), Player::Two);
        board.set(Coord::new(5, 5), Player::Two);
        GameState::with_board(board, Player::One)
    }

    #[test]
    fn test_single_successor_depth_one() {
        let state = single_turn_state();
        assert_eq!(state.phase(), Phase::Capture);
        assert_eq!(state.successors().len(), 1);

        let outcome = Searcher::new(1, Player::One, Evaluator::MaterialAdvance, false, false)
            .search(&state);
        assert_eq!(outcome.stats.leaf_count, 1);
        assert_eq!(outcome.state.current_player(), Player::Two);
        assert!(outcome.state.board().is_empty(Coord::new(2, 2)));
        assert_eq!(outcome.state.board().get(Coord::new(3, 2)), Some(Player::One));
    }

    #[test]
    fn test_game_over_root_returns_itself() {
        let mut board = Board::empty();
        board.set(Coord::new(1, 2), Player::One);
        board.set(Coord::new(1, 1), Player::Two);
        board.set(Coord::new(2, 1), Player::Two);
        board.set(Coord::new(2, 2), Player::Two);
        board.set(Coord::new(3, 2), Player::Two);
        let state = GameState::with_board(board, Player::One);
        assert!(state.is_game_over());

        let evaluator = Evaluator::MaterialAdvance;
        let outcome = Searcher::new(3, Player::One, evaluator, true, false).search(&state);
        assert_eq!(outcome.state, state);
        assert_eq!(outcome.stats.value, evaluator.score(&state, Player::One));
    }

    #[test]
    fn test_pruning_preserves_root_value() {
        let state = GameState::new();
        for evaluator in [Evaluator::MaterialAdvance, Evaluator::CenterWeighted] {
            let plain = Searcher::new(2, Player::One, evaluator, false, false).search(&state);
            let pruned = Searcher::new(2, Player::One, evaluator, true, false).search(&state);
            assert_eq!(plain.stats.value, pruned.stats.value, "{evaluator:?}");
            // Pruning only skips work
            assert!(pruned.stats.leaf_count <= plain.stats.leaf_count);
        }
    }

    #[test]
    fn test_ordering_preserves_root_value() {
        let state = GameState::new();
        let evaluator = Evaluator::MaterialAdvance;
        let plain = Searcher::new(2, Player::One, evaluator, false, false).search(&state);
        let ordered = Searcher::new(2, Player::One, evaluator, false, true).search(&state);
        let both = Searcher::new(2, Player::One, evaluator, true, true).search(&state);
        assert_eq!(plain.stats.value, ordered.stats.value);
        assert_eq!(plain.stats.value, both.stats.value);
    }

    #[test]
    fn test_stats_shape() {
        let state = GameState::new();
        let outcome =
            Searcher::new(2, Player::One, Evaluator::EdgeWeighted, true, false).search(&state);
        assert_eq!(outcome.stats.cut_levels.len(), 3);
        assert!(outcome.stats.expansion_count > 0);
        assert!(outcome.stats.average_branching() > 1.0);
        assert_eq!(
            outcome.stats.cut_count,
            outcome.stats.cut_levels.iter().sum::<u64>()
        );
    }

    #[test]
    fn test_search_is_deterministic() {
        let state = GameState::new();
        let a = Searcher::new(2, Player::One, Evaluator::EdgeDifferential, true, true)
            .search(&state);
        let b = Searcher::new(2, Player::One, Evaluator::EdgeDifferential, true, true)
            .search(&state);
        assert_eq!(a.state, b.state);
        assert_eq!(a.stats.value, b.stats.value);
        assert_eq!(a.stats.leaf_count, b.stats.leaf_count);
    }
}
