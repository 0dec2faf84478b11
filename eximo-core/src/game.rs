//! Game state and the rule state machine
//!
//! A `GameState` is an immutable snapshot: applying an action clones the
//! board and returns the derived state, so search can hold any number of
//! states without aliasing. The `phase` flag plus the `origins` set encode
//! which action families are legal next, including forced captures,
//! jump/capture chains and the piece re-entry mechanic.

use crate::board::{Board, Coord};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player color. One starts on rows 6..8 and advances toward row 1,
/// Two mirrors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Row delta of "north" (toward the opponent's starting edge)
    pub fn forward(self) -> i8 {
        match self {
            Player::One => -1,
            Player::Two => 1,
        }
    }

    /// The opponent's back row; landing here removes the piece and grants
    /// re-entry credits.
    pub fn far_row(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 8,
        }
    }

    /// The player's own two back rows, where re-entry happens
    pub fn home_rows(self) -> [u8; 2] {
        match self {
            Player::One => [7, 8],
            Player::Two => [1, 2],
        }
    }
}

/// Which action kinds are legal next
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Ordinary move or jump
    Free,
    /// A jump chain is in progress; only the chain piece may jump again
    Jump,
    /// Capture is compulsory, restricted to `origins`
    Capture,
    /// One piece re-entry left
    AddFirst,
    /// Up to two piece re-entries left
    AddSecond,
}

impl Phase {
    pub fn is_add(self) -> bool {
        matches!(self, Phase::AddFirst | Phase::AddSecond)
    }
}

/// Directions available to moves and jumps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDir {
    North,
    NorthEast,
    NorthWest,
}

pub const STEP_DIRS: [StepDir; 3] = [StepDir::North, StepDir::NorthWest, StepDir::NorthEast];

impl StepDir {
    /// (dcol, drow) for a player whose forward row delta is `forward`
    fn deltas(self, forward: i8) -> (i8, i8) {
        match self {
            StepDir::North => (0, forward),
            StepDir::NorthEast => (-forward, forward),
            StepDir::NorthWest => (forward, forward),
        }
    }
}

/// Directions available to captures. East/West run along the row and are
/// player-relative like the rest; there is no plain backward capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureDir {
    North,
    NorthEast,
    NorthWest,
    East,
    West,
}

pub const CAPTURE_DIRS: [CaptureDir; 5] = [
    CaptureDir::North,
    CaptureDir::NorthWest,
    CaptureDir::NorthEast,
    CaptureDir::East,
    CaptureDir::West,
];

impl CaptureDir {
    fn deltas(self, forward: i8) -> (i8, i8) {
        match self {
            CaptureDir::North => (0, forward),
            CaptureDir::NorthEast => (-forward, forward),
            CaptureDir::NorthWest => (forward, forward),
            CaptureDir::East => (-forward, 0),
            CaptureDir::West => (forward, 0),
        }
    }
}

/// A single micro-action (one step of a turn)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move { from: Coord, dir: StepDir },
    Jump { from: Coord, dir: StepDir },
    Capture { from: Coord, dir: CaptureDir },
    Add { dest: Coord },
}

/// Rejection value for an action that violates a precondition. Always
/// locally recoverable: the caller drops the input and may retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum IllegalAction {
    #[error("no such action in phase {0:?}")]
    WrongPhase(Phase),
    #[error("{0} cannot start the next action")]
    NotAnOrigin(Coord),
    #[error("destination is occupied or off the board")]
    Blocked,
    #[error("intermediate cell does not hold the required piece")]
    BadIntermediate,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// One full game snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    phase: Phase,
    /// Tiles from which the current player may legally start the next
    /// action (placement tiles while in an add phase). Empty means the
    /// current player has lost.
    origins: FxHashSet<Coord>,
    last_moved: Option<Coord>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS & ACCESSORS
    // ========================================================================

    /// Starting position, player One to act, origins already scanned
    pub fn new() -> Self {
        Self::with_board(Board::starting(), Player::One)
    }

    /// Arbitrary position with `to_play` to act; runs the mandatory-capture
    /// scan so the state is ready for play.
    pub fn with_board(board: Board, to_play: Player) -> Self {
        let mut state = Self {
            board,
            current_player: to_play,
            phase: Phase::Free,
            origins: FxHashSet::default(),
            last_moved: None,
        };
        state.full_checkup();
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn origins(&self) -> &FxHashSet<Coord> {
        &self.origins
    }

    pub fn last_moved(&self) -> Option<Coord> {
        self.last_moved
    }

    /// The current player has no legal start left and has lost
    pub fn is_game_over(&self) -> bool {
        self.origins.is_empty()
    }

    // ========================================================================
    // CHECKUP / MANDATORY-CAPTURE SCAN
    // ========================================================================

    /// Idempotent bookkeeping: an add phase with no viable re-entry tile
    /// reverts to Free and the turn passes. Any other state is untouched.
    pub fn checkup(&mut self) {
        if self.phase.is_add() && self.origins.is_empty() {
            self.phase = Phase::Free;
            self.pass_turn();
        }
    }

    /// `checkup` plus, in Free phase, the mandatory-capture scan: if any
    /// piece can capture, phase becomes Capture with exactly the capturing
    /// pieces as origins; otherwise origins are the pieces with at least one
    /// legal move or jump. Idempotent; safe at the top of every turn.
    pub fn full_checkup(&mut self) {
        if self.phase != Phase::Free {
            self.checkup();
            return;
        }
        self.scan();
    }

    fn scan(&mut self) {
        let mut captors = FxHashSet::default();
        let mut movers = FxHashSet::default();
        for piece in self.board.pieces_of(self.current_player) {
            if self.can_capture(piece) {
                captors.insert(piece);
            } else if self.can_step(piece) || self.can_jump(piece) {
                movers.insert(piece);
            }
        }
        if captors.is_empty() {
            self.phase = Phase::Free;
            self.origins = movers;
        } else {
            self.phase = Phase::Capture;
            self.origins = captors;
        }
    }

    /// Turn passes to the opponent; their mandatory-capture scan runs
    /// immediately so the emitted state carries correct phase/origins.
    fn pass_turn(&mut self) {
        self.current_player = self.current_player.opponent();
        self.phase = Phase::Free;
        self.origins.clear();
        self.scan();
    }

    // ========================================================================
    // GEOMETRY
    // ========================================================================

    fn step_target(&self, from: Coord, dir: StepDir) -> Option<Coord> {
        let (dc, dr) = dir.deltas(self.current_player.forward());
        from.offset(dc, dr)
    }

    /// (intermediate, destination) of a jump, if both are on the board
    fn jump_targets(&self, from: Coord, dir: StepDir) -> Option<(Coord, Coord)> {
        let (dc, dr) = dir.deltas(self.current_player.forward());
        Some((from.offset(dc, dr)?, from.offset(2 * dc, 2 * dr)?))
    }

    fn capture_targets(&self, from: Coord, dir: CaptureDir) -> Option<(Coord, Coord)> {
        let (dc, dr) = dir.deltas(self.current_player.forward());
        Some((from.offset(dc, dr)?, from.offset(2 * dc, 2 * dr)?))
    }

    fn can_step(&self, from: Coord) -> bool {
        STEP_DIRS.iter().any(|&dir| {
            self.step_target(from, dir)
                .is_some_and(|dest| self.board.is_empty(dest))
        })
    }

    fn can_jump(&self, from: Coord) -> bool {
        STEP_DIRS.iter().any(|&dir| {
            self.jump_targets(from, dir).is_some_and(|(mid, dest)| {
                self.board.get(mid) == Some(self.current_player) && self.board.is_empty(dest)
            })
        })
    }

    fn can_capture(&self, from: Coord) -> bool {
        CAPTURE_DIRS.iter().any(|&dir| {
            self.capture_targets(from, dir).is_some_and(|(mid, dest)| {
                self.board.get(mid) == Some(self.current_player.opponent())
                    && self.board.is_empty(dest)
            })
        })
    }

    // ========================================================================
    // ACTION APPLICATION
    // ========================================================================

    /// Apply one micro-action, returning the derived state or a rejection
    pub fn apply(&self, action: Action) -> Result<GameState, IllegalAction> {
        match action {
            Action::Move { from, dir } => self.apply_move(from, dir),
            Action::Jump { from, dir } => self.apply_jump(from, dir),
            Action::Capture { from, dir } => self.apply_capture(from, dir),
            Action::Add { dest } => self.apply_add(dest),
        }
    }

    fn own_piece_at(&self, from: Coord) -> Result<(), IllegalAction> {
        if self.board.get(from) == Some(self.current_player) {
            Ok(())
        } else {
            Err(IllegalAction::NotAnOrigin(from))
        }
    }

    fn apply_move(&self, from: Coord, dir: StepDir) -> Result<GameState, IllegalAction> {
        if self.phase != Phase::Free {
            return Err(IllegalAction::WrongPhase(self.phase));
        }
        self.own_piece_at(from)?;

        let dest = self.step_target(from, dir).ok_or(IllegalAction::Blocked)?;
        if !self.board.is_empty(dest) {
            return Err(IllegalAction::Blocked);
        }

        let mut next = self.child();
        next.board.clear(from);
        next.board.set(dest, self.current_player);
        next.last_moved = Some(dest);
        if next.reached_far_row(dest) {
            next.enter_add_phase(dest);
        } else {
            next.pass_turn();
        }
        Ok(next)
    }

    fn apply_jump(&self, from: Coord, dir: StepDir) -> Result<GameState, IllegalAction> {
        match self.phase {
            Phase::Free => {}
            // A chain in progress restricts the origin to the chain piece
            Phase::Jump => {
                if !self.origins.contains(&from) {
                    return Err(IllegalAction::NotAnOrigin(from));
                }
            }
            phase => return Err(IllegalAction::WrongPhase(phase)),
        }
        self.own_piece_at(from)?;

        let (mid, dest) = self.jump_targets(from, dir).ok_or(IllegalAction::Blocked)?;
        if !self.board.is_empty(dest) {
            return Err(IllegalAction::Blocked);
        }
        if self.board.get(mid) != Some(self.current_player) {
            return Err(IllegalAction::BadIntermediate);
        }

        let mut next = self.child();
        next.board.clear(from);
        next.board.set(dest, self.current_player);
        next.last_moved = Some(dest);
        if next.reached_far_row(dest) {
            next.enter_add_phase(dest);
        } else if next.can_jump(dest) {
            next.phase = Phase::Jump;
            next.origins = std::iter::once(dest).collect();
        } else {
            next.pass_turn();
        }
        Ok(next)
    }

    fn apply_capture(&self, from: Coord, dir: CaptureDir) -> Result<GameState, IllegalAction> {
        if self.phase != Phase::Capture {
            return Err(IllegalAction::WrongPhase(self.phase));
        }
        if !self.origins.is_empty() && !self.origins.contains(&from) {
            return Err(IllegalAction::NotAnOrigin(from));
        }
        self.own_piece_at(from)?;

        let (mid, dest) = self.capture_targets(from, dir).ok_or(IllegalAction::Blocked)?;
        if !self.board.is_empty(dest) {
            return Err(IllegalAction::Blocked);
        }
        if self.board.get(mid) != Some(self.current_player.opponent()) {
            return Err(IllegalAction::BadIntermediate);
        }

        let mut next = self.child();
        next.board.clear(from);
        next.board.clear(mid);
        next.board.set(dest, self.current_player);
        next.last_moved = Some(dest);
        if next.reached_far_row(dest) {
            next.enter_add_phase(dest);
        } else if next.can_capture(dest) {
            next.phase = Phase::Capture;
            next.origins = std::iter::once(dest).collect();
        } else {
            next.pass_turn();
        }
        Ok(next)
    }

    fn apply_add(&self, dest: Coord) -> Result<GameState, IllegalAction> {
        if !self.phase.is_add() {
            return Err(IllegalAction::WrongPhase(self.phase));
        }
        let [near, back] = self.current_player.home_rows();
        if !self.board.row_has_empty(near) && !self.board.row_has_empty(back) {
            return Err(IllegalAction::Blocked);
        }
        // Corner columns of the back rows are not valid re-entry tiles
        if !(2..=7).contains(&dest.col) || (dest.row != near && dest.row != back) {
            return Err(IllegalAction::Blocked);
        }
        if !self.board.is_empty(dest) {
            return Err(IllegalAction::Blocked);
        }

        let mut next = self.child();
        next.board.set(dest, self.current_player);
        next.last_moved = Some(dest);
        match self.phase {
            Phase::AddSecond => {
                next.phase = Phase::AddFirst;
                next.origins = self.origins.clone();
                next.origins.remove(&dest);
                next.checkup();
            }
            Phase::AddFirst => next.pass_turn(),
            _ => unreachable!("phase checked above"),
        }
        Ok(next)
    }

    /// Fresh same-player snapshot with a cloned board, postconditions fill
    /// in the rest
    fn child(&self) -> GameState {
        GameState {
            board: self.board.clone(),
            current_player: self.current_player,
            phase: Phase::Free,
            origins: FxHashSet::default(),
            last_moved: None,
        }
    }

    fn reached_far_row(&self, at: Coord) -> bool {
        at.row == self.current_player.far_row()
    }

    /// A piece reached the far row: it leaves the board and the player gets
    /// up to two re-entries onto the viable back-row tiles.
    fn enter_add_phase(&mut self, landed: Coord) {
        self.board.clear(landed);
        self.phase = Phase::AddSecond;
        self.origins = self.add_tiles();
        self.checkup();
    }

    /// Empty tiles of the player's own two back rows, columns 2..=7
    fn add_tiles(&self) -> FxHashSet<Coord> {
        let mut tiles = FxHashSet::default();
        for row in self.current_player.home_rows() {
            for col in 2..=7 {
                let at = Coord::new(col, row);
                if self.board.is_empty(at) {
                    tiles.insert(at);
                }
            }
        }
        tiles
    }

    // ========================================================================
    // TURN RESOLUTION
    // ========================================================================

    /// All states reachable by the current player completing an entire turn:
    /// chains and double re-entries are followed to their natural end, so
    /// every returned state has the opponent to act.
    pub fn successors(&self) -> Vec<GameState> {
        let mut state = self.clone();
        if state.phase == Phase::Free {
            // Mandatory-capture origins are computed fresh
            state.scan();
        }
        if state.phase == Phase::AddSecond {
            return state.double_add_successors();
        }

        let mut origins: Vec<Coord> = state.origins.iter().copied().collect();
        origins.sort();

        let mut result = Vec::new();
        for from in origins {
            let mut children = Vec::new();
            let mut push = |action| {
                if let Ok(child) = state.apply(action) {
                    children.push(child);
                }
            };
            match state.phase {
                Phase::Capture => {
                    for dir in CAPTURE_DIRS {
                        push(Action::Capture { from, dir });
                    }
                }
                Phase::Jump => {
                    for dir in STEP_DIRS {
                        push(Action::Jump { from, dir });
                    }
                }
                Phase::Free => {
                    for dir in STEP_DIRS {
                        push(Action::Jump { from, dir });
                    }
                    for dir in STEP_DIRS {
                        push(Action::Move { from, dir });
                    }
                }
                Phase::AddFirst => push(Action::Add { dest: from }),
                Phase::AddSecond => unreachable!("handled above"),
            }

            for child in children {
                if child.current_player != state.current_player {
                    result.push(child);
                } else {
                    // Same player continues (chain or second re-entry):
                    // emit the grandchildren instead of the child
                    result.extend(child.successors());
                }
            }
        }
        result
    }

    /// AddSecond enumerated directly as unordered tile pairs (or the single
    /// remaining tile), avoiding the duplicate states that ordered
    /// recursion over both re-entries would produce.
    fn double_add_successors(&self) -> Vec<GameState> {
        let mut tiles: Vec<Coord> = self.origins.iter().copied().collect();
        tiles.sort();

        let mut result = Vec::new();
        if tiles.len() == 1 {
            let mut child = self.child();
            child.board.set(tiles[0], self.current_player);
            child.last_moved = Some(tiles[0]);
            child.pass_turn();
            result.push(child);
        }
        for (i, &first) in tiles.iter().enumerate() {
            for &second in &tiles[i + 1..] {
                let mut child = self.child();
                child.board.set(first, self.current_player);
                child.board.set(second, self.current_player);
                child.last_moved = Some(second);
                child.pass_turn();
                result.push(child);
            }
        }
        result
    }

    // ========================================================================
    // SINGLE-MOVE LOOKUP (human input)
    // ========================================================================

    /// Resolve an origin/destination pair to the action it denotes and apply
    /// it. `dest` is `None` for a re-entry placement, where `origin` names
    /// the tile to fill.
    pub fn try_move(&self, origin: Coord, dest: Option<Coord>) -> Result<GameState, IllegalAction> {
        if let Some(dest) = dest {
            if !self.board.is_empty(dest) {
                return Err(IllegalAction::Blocked);
            }
        }
        if !self.origins.contains(&origin) {
            return Err(IllegalAction::NotAnOrigin(origin));
        }

        if self.phase.is_add() {
            return self.apply(Action::Add { dest: origin });
        }

        let dest = dest.ok_or(IllegalAction::Blocked)?;
        let candidates = STEP_DIRS
            .into_iter()
            .map(|dir| Action::Move { from: origin, dir })
            .chain(
                STEP_DIRS
                    .into_iter()
                    .map(|dir| Action::Jump { from: origin, dir }),
            )
            .chain(
                CAPTURE_DIRS
                    .into_iter()
                    .map(|dir| Action::Capture { from: origin, dir }),
            );
        for action in candidates {
            if let Ok(next) = self.apply(action) {
                if next.last_moved == Some(dest) {
                    return Ok(next);
                }
            }
        }
        Err(IllegalAction::Blocked)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
