//! 8x8 board storage and cell queries

use crate::game::Player;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board side length
pub const BOARD_SIZE: u8 = 8;

/// 1-indexed (column, row) coordinates, both in 1..=8
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub col: u8,
    pub row: u8,
}

impl Coord {
    /// Panics outside [1,8]x[1,8]: out-of-range coordinates are caller bugs,
    /// not game conditions.
    pub fn new(col: u8, row: u8) -> Self {
        assert!(
            (1..=BOARD_SIZE).contains(&col) && (1..=BOARD_SIZE).contains(&row),
            "coordinate ({col},{row}) outside the board"
        );
        Self { col, row }
    }

    /// Offset by (signed) column/row deltas, `None` when the result leaves
    /// the board.
    pub fn offset(self, dcol: i8, drow: i8) -> Option<Self> {
        let col = self.col as i8 + dcol;
        let row = self.row as i8 + drow;
        if (1..=BOARD_SIZE as i8).contains(&col) && (1..=BOARD_SIZE as i8).contains(&row) {
            Some(Self {
                col: col as u8,
                row: row as u8,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

/// 8x8 grid of tri-state cells. Cloned (never aliased) whenever a new game
/// state is derived, so state history is a chain of snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Player>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Board {
    /// Empty board
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
        }
    }

    /// Starting layout: each player's home 3x6 block (columns 2..=7) minus
    /// the two inner cells of the third rank. Player Two holds rows 1..3,
    /// player One rows 6..8.
    pub fn starting() -> Self {
        let mut board = Self::empty();
        for col in 2..=7 {
            let third_rank = col != 4 && col != 5;
            board.set(Coord::new(col, 1), Player::Two);
            board.set(Coord::new(col, 2), Player::Two);
            board.set(Coord::new(col, 7), Player::One);
            board.set(Coord::new(col, 8), Player::One);
            if third_rank {
                board.set(Coord::new(col, 3), Player::Two);
                board.set(Coord::new(col, 6), Player::One);
            }
        }
        board
    }

    pub fn get(&self, at: Coord) -> Option<Player> {
        self.cells[at.row as usize - 1][at.col as usize - 1]
    }

    pub fn set(&mut self, at: Coord, player: Player) {
        self.cells[at.row as usize - 1][at.col as usize - 1] = Some(player);
    }

    pub fn clear(&mut self, at: Coord) {
        self.cells[at.row as usize - 1][at.col as usize - 1] = None;
    }

    pub fn is_empty(&self, at: Coord) -> bool {
        self.get(at).is_none()
    }

    /// Whether the given row holds at least one empty cell
    pub fn row_has_empty(&self, row: u8) -> bool {
        (1..=BOARD_SIZE).any(|col| self.is_empty(Coord::new(col, row)))
    }

    /// Coordinates of every piece owned by `player`
    pub fn pieces_of(&self, player: Player) -> FxHashSet<Coord> {
        let mut pieces = FxHashSet::default();
        for row in 1..=BOARD_SIZE {
            for col in 1..=BOARD_SIZE {
                let at = Coord::new(col, row);
                if self.get(at) == Some(player) {
                    pieces.insert(at);
                }
            }
        }
        pieces
    }

    /// Deterministic hash of the cell matrix (FNV-1a over the canonical
    /// 0/1/2 cell encoding). Stable across runs and platforms; used as the
    /// evaluator tie-break and as the move-ordering tie key.
    pub fn fingerprint(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = FNV_OFFSET;
        for row in &self.cells {
            for cell in row {
                let code: u8 = match cell {
                    None => 0,
                    Some(Player::One) => 1,
                    Some(Player::Two) => 2,
                };
                hash ^= code as u64;
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }
        hash
    }
}

impl fmt::Display for Board {
    /// Fixed ASCII form: column header, separator, 8 framed rows with
    /// `X` (player One), `O` (player Two), `.` (empty).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   1 2 3 4 5 6 7 8  ")?;
        writeln!(f, " -------------------")?;
        for row in 1..=BOARD_SIZE {
            write!(f, "{row}| ")?;
            for col in 1..=BOARD_SIZE {
                let glyph = match self.get(Coord::new(col, row)) {
                    Some(Player::One) => 'X',
                    Some(Player::Two) => 'O',
                    None => '.',
                };
                write!(f, "{glyph} ")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, " -------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear() {
        let mut board = Board::empty();
        let at = Coord::new(4, 5);
        assert!(board.is_empty(at));

        board.set(at, Player::One);
        assert_eq!(board.get(at), Some(Player::One));

        board.clear(at);
        assert!(board.is_empty(at));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_is_fatal() {
        Coord::new(0, 9);
    }

    #[test]
    fn test_offset_clips_to_board() {
        assert_eq!(Coord::new(1, 1).offset(-1, 0), None);
        assert_eq!(Coord::new(8, 8).offset(0, 1), None);
        assert_eq!(Coord::new(4, 4).offset(1, -1), Some(Coord::new(5, 3)));
    }

    #[test]
    fn test_starting_layout() {
        let board = Board::starting();
        assert_eq!(board.pieces_of(Player::One).len(), 16);
        assert_eq!(board.pieces_of(Player::Two).len(), 16);

        // Inner third-rank cells stay open
        assert!(board.is_empty(Coord::new(4, 3)));
        assert!(board.is_empty(Coord::new(5, 3)));
        assert!(board.is_empty(Coord::new(4, 6)));
        assert!(board.is_empty(Coord::new(5, 6)));

        // Corner columns are never part of the setup
        for row in 1..=8 {
            assert!(board.is_empty(Coord::new(1, row)));
            assert!(board.is_empty(Coord::new(8, row)));
        }
    }

    #[test]
    fn test_row_has_empty() {
        let mut board = Board::empty();
        for col in 1..=8 {
            board.set(Coord::new(col, 3), Player::Two);
        }
        assert!(!board.row_has_empty(3));
        assert!(board.row_has_empty(4));

        board.clear(Coord::new(5, 3));
        assert!(board.row_has_empty(3));
    }

    #[test]
    fn test_fingerprint_tracks_contents() {
        let a = Board::starting();
        let b = Board::starting();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = Board::starting();
        c.clear(Coord::new(2, 1));
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_display_form() {
        let board = Board::starting();
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "   1 2 3 4 5 6 7 8  ");
        assert_eq!(lines[1], " -------------------");
        assert_eq!(lines[2], "1| . O O O O O O . |");
        assert_eq!(lines[4], "3| . O O . . O O . |");
        assert_eq!(lines[7], "6| . X X . . X X . |");
        assert_eq!(lines[10], " -------------------");
    }
}
