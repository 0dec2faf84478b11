//! Integration tests for the EXIMO engine
//!
//! Tests the full stack: rules engine, evaluators and minimax search

use eximo_core::{
    board::{Board, Coord},
    eval::Evaluator,
    game::{GameState, Phase, Player},
    search::Searcher,
};
use std::time::Instant;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// A quiet midgame position with no capture pending
fn simple_game() -> GameState {
    let mut board = Board::empty();
    board.set(Coord::new(3, 5), Player::One);
    board.set(Coord::new(4, 6), Player::One);
    board.set(Coord::new(6, 5), Player::One);
    board.set(Coord::new(3, 3), Player::Two);
    board.set(Coord::new(5, 3), Player::Two);
    board.set(Coord::new(6, 2), Player::Two);
    GameState::with_board(board, Player::One)
}

// ============================================================================
// GAME LOGIC TESTS
// ============================================================================

#[test]
fn test_game_creation_and_successors() {
    let game = GameState::new();

    assert_eq!(game.current_player(), Player::One);
    assert_eq!(game.phase(), Phase::Free);
    assert_eq!(game.origins().len(), 16);
    assert!(!game.is_game_over());

    // Every successor is a completed turn
    let successors = game.successors();
    assert!(!successors.is_empty(), "Should have legal turns");
    for next in &successors {
        assert_eq!(next.current_player(), Player::Two);
    }
}

#[test]
fn test_forced_capture_full_stack() {
    let mut board = Board::empty();
    board.set(Coord::new(4, 4), Player::One);
    board.set(Coord::new(4, 3), Player::Two);
    board.set(Coord::new(2, 2), Player::Two);
    let game = GameState::with_board(board, Player::One);

    // The capture preempts every quiet move
    assert_eq!(game.phase(), Phase::Capture);
    assert_eq!(game.origins().len(), 1);

    let successors = game.successors();
    assert_eq!(successors.len(), 1);
    let next = &successors[0];
    assert_eq!(next.current_player(), Player::Two);
    assert_eq!(next.board().pieces_of(Player::Two).len(), 1);
    assert_eq!(next.board().get(Coord::new(4, 2)), Some(Player::One));
}

#[test]
fn test_far_row_reentry_round_trip() {
    let mut board = Board::empty();
    board.set(Coord::new(4, 3), Player::One);
    board.set(Coord::new(4, 2), Player::Two);
    board.set(Coord::new(6, 6), Player::Two);
    let game = GameState::with_board(board, Player::One);
    assert_eq!(game.phase(), Phase::Capture);

    // Capture into the far row: the landed piece leaves and two come back
    let after_capture = game.try_move(Coord::new(4, 3), Some(Coord::new(4, 1))).unwrap();
    assert_eq!(after_capture.current_player(), Player::One);
    assert_eq!(after_capture.phase(), Phase::AddSecond);
    assert_eq!(after_capture.origins().len(), 12);
    assert!(after_capture.board().is_empty(Coord::new(4, 1)));

    let after_first = after_capture.try_move(Coord::new(2, 7), None).unwrap();
    assert_eq!(after_first.phase(), Phase::AddFirst);
    assert_eq!(after_first.current_player(), Player::One);

    let after_second = after_first.try_move(Coord::new(3, 8), None).unwrap();
    assert_eq!(after_second.current_player(), Player::Two);
    assert_eq!(after_second.board().pieces_of(Player::One).len(), 2);
    assert_eq!(after_second.board().pieces_of(Player::Two).len(), 1);
}

// ============================================================================
// SEARCH TESTS
// ============================================================================

#[test]
fn test_search_finds_turn() {
    let game = simple_game();
    let outcome = Searcher::new(2, Player::One, Evaluator::EdgeWeighted, true, true).search(&game);

    assert_ne!(outcome.state, game, "Search should pick a successor");
    assert_eq!(outcome.state.current_player(), Player::Two);
    assert!(outcome.stats.leaf_count > 0);
    assert!(outcome.stats.expansion_count > 0);
}

#[test]
fn test_search_configurations_agree() {
    let game = simple_game();
    let mut values = Vec::new();
    for pruning in [false, true] {
        for ordering in [false, true] {
            let outcome = Searcher::new(3, Player::One, Evaluator::CenterWeighted, pruning, ordering)
                .search(&game);
            values.push(outcome.stats.value);
        }
    }
    for value in &values[1..] {
        assert_eq!(*value, values[0], "all configurations: {values:?}");
    }
}

#[test]
fn test_search_performance() {
    let game = GameState::new();

    for depth in [2, 3] {
        let start = Instant::now();
        let outcome =
            Searcher::new(depth, Player::One, Evaluator::EdgeDifferential, true, true).search(&game);
        let elapsed = start.elapsed();
        println!(
            "Depth {}: {:?}, {} leaves, {} cuts",
            depth, elapsed, outcome.stats.leaf_count, outcome.stats.cut_count
        );
        assert!(elapsed.as_millis() < 30000, "Depth {} took too long", depth);
    }
}

// ============================================================================
// FULL INTEGRATION TEST
// ============================================================================

#[test]
fn test_full_game_ai_vs_ai() {
    let mut state = GameState::new();
    let mut turns = 0;
    let max_turns = 150;

    while !state.is_game_over() && turns < max_turns {
        let mover = state.current_player();
        let evaluator = match mover {
            Player::One => Evaluator::MaterialAdvance,
            Player::Two => Evaluator::CenterWeighted,
        };
        let outcome = Searcher::new(2, mover, evaluator, true, true).search(&state);
        assert_ne!(outcome.state, state, "Search stalled on a live position");
        state = outcome.state;
        turns += 1;
    }

    println!("AI vs AI game: {} turns", turns);
    assert!(turns > 0, "Should have played turns");
    if state.is_game_over() {
        println!("Winner: {:?}", state.current_player().opponent());
    }
}
