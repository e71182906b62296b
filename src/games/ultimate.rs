//! # Ultimate Tic-Tac-Toe Game State
//!
//! Composes one [`MetaBoard`] with nine [`BitBoard`]s and implements the
//! nested rules:
//!
//! - The cell played decides the sub-board the opponent must play next
//! - If that sub-board is already won or drawn the opponent may play in any
//!   open sub-board ([`FREE_CHOICE`])
//! - A sub-board won is claimed on the meta-board; a full sub-board without a
//!   winner is neutralized
//! - Three claimed sub-boards in a line win the game; a meta-board that fills
//!   up without a line goes to the player with more claimed sub-boards
//!
//! The whole state is a handful of `u16`s, so copying it is a plain memcpy.
//! The search engine copies the live state into a scratch state once per
//! iteration with [`GameState::duplicate`].

use super::{cells_of, BitBoard, MetaBoard, Occupancy, Player};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uttt_shared::{from_absolute, to_absolute, CELLS};

/// Forced sub-board sentinel: the next player may choose any open sub-board.
pub const FREE_CHOICE: u8 = 9;

/// A move: a sub-board index and a cell index inside it, both row-major 0..=8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Move {
    pub sub: u8,
    pub cell: u8,
}

impl Move {
    /// The centre cell of the centre sub-board.
    pub const CENTER: Move = Move { sub: 4, cell: 4 };

    pub const fn new(sub: u8, cell: u8) -> Self {
        Self { sub, cell }
    }

    /// Builds a move from absolute 9×9 coordinates.
    ///
    /// Returns `None` if either coordinate is off the board.
    pub fn from_absolute(row: u8, col: u8) -> Option<Self> {
        if row >= 9 || col >= 9 {
            return None;
        }
        let (sub, cell) = from_absolute(row, col);
        Some(Self { sub, cell })
    }

    /// Absolute `(row, col)` of this move on the 9×9 grid.
    pub const fn to_absolute(self) -> (u8, u8) {
        to_absolute(self.sub, self.cell)
    }
}

impl fmt::Display for Move {
    /// Formats the move the way the referee expects it: `"row col"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (row, col) = self.to_absolute();
        write!(f, "{} {}", row, col)
    }
}

impl FromStr for Move {
    type Err = String;

    /// Parses absolute coordinates, e.g. `"4 4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(row), Some(col), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected \"row col\", got {:?}", s));
        };
        let row = row.parse::<u8>().map_err(|e| e.to_string())?;
        let col = col.parse::<u8>().map_err(|e| e.to_string())?;
        Move::from_absolute(row, col).ok_or_else(|| format!("coordinates out of range: {}", s))
    }
}

/// Result of applying a single move, from the mover's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The game goes on.
    Ongoing,
    Win,
    Tie,
    Loss,
}

impl Outcome {
    /// The reward the search backs up for this outcome, `None` while the game
    /// is still running.
    #[inline]
    pub fn reward(self) -> Option<f64> {
        match self {
            Outcome::Ongoing => None,
            Outcome::Win => Some(1.0),
            Outcome::Tie => Some(0.5),
            Outcome::Loss => Some(0.0),
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Outcome::Ongoing
    }

    fn from_claims(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => Outcome::Win,
            Ordering::Less => Outcome::Loss,
            Ordering::Equal => Outcome::Tie,
        }
    }
}

/// Status of the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    InProgress,
    Won(Player),
    Drawn,
}

impl GameResult {
    pub fn is_over(self) -> bool {
        self != GameResult::InProgress
    }
}

/// Complete ultimate tic-tac-toe position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameState {
    meta: MetaBoard,
    subs: [BitBoard; 9],
    /// Sub-board the next move must be played in, or [`FREE_CHOICE`].
    forced: u8,
    to_move: Player,
    result: GameResult,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Empty board, `X` to move, free choice of sub-board.
    pub const fn new() -> Self {
        Self {
            meta: MetaBoard::new(),
            subs: [BitBoard::new(); 9],
            forced: FREE_CHOICE,
            to_move: Player::X,
            result: GameResult::InProgress,
        }
    }

    #[inline]
    pub fn meta(&self) -> &MetaBoard {
        &self.meta
    }

    #[inline]
    pub fn sub_board(&self, sub: u8) -> &BitBoard {
        &self.subs[sub as usize]
    }

    /// Sub-board the next move must go to, or [`FREE_CHOICE`].
    #[inline]
    pub fn forced_sub(&self) -> u8 {
        self.forced
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Returns true if the sub-board is open on the meta-board and the cell
    /// is free inside it.
    ///
    /// This does not look at the forced sub-board; see [`GameState::accepts`].
    #[inline]
    pub fn is_legal(&self, mv: Move) -> bool {
        mv.sub < CELLS
            && mv.cell < CELLS
            && self.meta.is_playable(mv.sub)
            && self.subs[mv.sub as usize].is_playable(mv.cell)
    }

    /// Full rules check for the next move: game running, forced sub-board
    /// respected, target cell open.
    pub fn accepts(&self, mv: Move) -> bool {
        !self.result.is_over()
            && (self.forced == FREE_CHOICE || self.forced == mv.sub)
            && self.is_legal(mv)
    }

    /// Plays `mv` for `player` and reports the result from `player`'s side.
    ///
    /// The move must satisfy [`GameState::is_legal`]. The sub-board is
    /// updated first, then the meta-board, then the game result; a meta-board
    /// that fills up without a line is settled by comparing claim counts.
    pub fn apply_move(&mut self, mv: Move, player: Player) -> Outcome {
        debug_assert!(self.is_legal(mv), "illegal move {:?}", mv);
        let board = &mut self.subs[mv.sub as usize];
        board.apply(mv.cell, player);

        let outcome = if board.has_won(player) {
            self.meta.claim(mv.sub, player);
            if self.meta.has_won(player) {
                Outcome::Win
            } else {
                self.settle_if_full(player)
            }
        } else if board.is_full() {
            self.meta.neutralize(mv.sub);
            self.settle_if_full(player)
        } else {
            Outcome::Ongoing
        };

        self.forced = if self.meta.is_playable(mv.cell) {
            mv.cell
        } else {
            FREE_CHOICE
        };
        self.to_move = player.opponent();
        self.result = match outcome {
            Outcome::Ongoing => GameResult::InProgress,
            Outcome::Win => GameResult::Won(player),
            Outcome::Loss => GameResult::Won(player.opponent()),
            Outcome::Tie => GameResult::Drawn,
        };
        outcome
    }

    /// Plays `mv` for the player to move.
    #[inline]
    pub fn make_move(&mut self, mv: Move) -> Outcome {
        self.apply_move(mv, self.to_move)
    }

    fn settle_if_full(&self, player: Player) -> Outcome {
        if self.meta.is_full() {
            Outcome::from_claims(self.meta.compare_claims(player))
        } else {
            Outcome::Ongoing
        }
    }

    /// Calls `f` for every move playable under the forced sub-board rule,
    /// sub-board ascending then cell ascending.
    ///
    /// If `forced` names a decided sub-board, or is [`FREE_CHOICE`], every
    /// open sub-board is scanned.
    #[inline]
    pub fn for_each_legal_move(&self, forced: u8, mut f: impl FnMut(Move)) {
        if forced < CELLS && self.meta.is_playable(forced) {
            for cell in cells_of(self.subs[forced as usize].free_cells()) {
                f(Move::new(forced, cell));
            }
        } else {
            for sub in cells_of(self.meta.free_cells()) {
                for cell in cells_of(self.subs[sub as usize].free_cells()) {
                    f(Move::new(sub, cell));
                }
            }
        }
    }

    /// Number of moves [`GameState::for_each_legal_move`] would produce.
    pub fn legal_move_count(&self, forced: u8) -> usize {
        if forced < CELLS && self.meta.is_playable(forced) {
            self.subs[forced as usize].free_cells().count_ones() as usize
        } else {
            cells_of(self.meta.free_cells())
                .map(|sub| self.subs[sub as usize].free_cells().count_ones() as usize)
                .sum()
        }
    }

    /// Appends the moves playable under `forced` to `out`.
    pub fn legal_moves_into(&self, forced: u8, out: &mut Vec<Move>) {
        self.for_each_legal_move(forced, |mv| out.push(mv));
    }

    /// All moves open to the player to move. Empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        if !self.result.is_over() {
            self.legal_moves_into(self.forced, &mut moves);
        }
        moves
    }

    /// Overwrites `self` with `source` without touching the heap.
    #[inline]
    pub fn duplicate(&mut self, source: &GameState) {
        *self = *source;
    }
}

impl fmt::Display for GameState {
    /// Plain 9×9 dump followed by the meta-board.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..9u8 {
            if row % 3 == 0 && row > 0 {
                writeln!(f, "------+-------+------")?;
            }
            for col in 0..9u8 {
                if col % 3 == 0 && col > 0 {
                    write!(f, "| ")?;
                }
                let (sub, cell) = from_absolute(row, col);
                let symbol = match self.subs[sub as usize].cell(cell) {
                    Some(player) => player.symbol(),
                    None => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.meta)?;
        let forced = if self.forced == FREE_CHOICE {
            "any".to_string()
        } else {
            self.forced.to_string()
        };
        writeln!(f, "to move: {}, forced: {}", self.to_move, forced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uttt_shared::mask_of;

    fn play_all(state: &mut GameState, moves: &[(u8, u8, Player)]) -> Outcome {
        let mut last = Outcome::Ongoing;
        for &(sub, cell, player) in moves {
            last = state.apply_move(Move::new(sub, cell), player);
        }
        last
    }

    #[test]
    fn test_new_game() {
        let state = GameState::new();
        assert_eq!(state.to_move(), Player::X);
        assert_eq!(state.forced_sub(), FREE_CHOICE);
        assert_eq!(state.result(), GameResult::InProgress);
        assert_eq!(state.legal_moves().len(), 81);
        assert_eq!(state.legal_move_count(FREE_CHOICE), 81);
    }

    #[test]
    fn test_center_opening_forces_center_board() {
        let mut state = GameState::new();
        assert_eq!(state.make_move(Move::CENTER), Outcome::Ongoing);
        assert_eq!(state.forced_sub(), 4);
        let moves = state.legal_moves();
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|mv| mv.sub == 4 && mv.cell != 4));
        assert!(state.accepts(Move::new(4, 0)));
        assert!(!state.accepts(Move::new(3, 0)));
        assert!(state.is_legal(Move::new(3, 0)));
    }

    #[test]
    fn test_row_win_claims_sub_board_and_frees_choice() {
        let mut state = GameState::new();
        let outcome = play_all(
            &mut state,
            &[(0, 1, Player::X), (0, 2, Player::X), (0, 0, Player::X)],
        );
        assert_eq!(outcome, Outcome::Ongoing);
        assert_eq!(state.meta().winner_of(0), Some(Player::X));
        assert_eq!(state.meta().claims(Player::X), 1);
        assert_eq!(state.forced_sub(), FREE_CHOICE);
        // Sub-board 0 is gone from the move list.
        let moves = state.legal_moves();
        assert_eq!(moves.len(), 72);
        assert!(moves.iter().all(|mv| mv.sub != 0));
    }

    #[test]
    fn test_forced_to_open_board_after_win_elsewhere() {
        let mut state = GameState::new();
        play_all(
            &mut state,
            &[(0, 0, Player::X), (0, 1, Player::X), (0, 2, Player::X)],
        );
        assert_eq!(state.meta().winner_of(0), Some(Player::X));
        assert_eq!(state.forced_sub(), 2);
        assert!(state.legal_moves().iter().all(|mv| mv.sub == 2));
    }

    #[test]
    fn test_drawn_sub_board_is_neutralized_once() {
        let mut state = GameState::new();
        // X O X / X O O / O X X on sub-board 3
        let sequence = [
            (3, 0, Player::X),
            (3, 1, Player::O),
            (3, 2, Player::X),
            (3, 4, Player::O),
            (3, 3, Player::X),
            (3, 5, Player::O),
            (3, 7, Player::X),
            (3, 6, Player::O),
        ];
        play_all(&mut state, &sequence);
        assert_eq!(state.meta().neutral(), 0);
        state.apply_move(Move::new(3, 8), Player::X);
        let meta = state.meta();
        assert_eq!(meta.neutral(), mask_of(3));
        assert_eq!(meta.owned(Player::X) & mask_of(3), 0);
        assert_eq!(meta.owned(Player::O) & mask_of(3), 0);
        assert!(meta.is_decided(3));
    }

    #[test]
    fn test_meta_win_ends_game() {
        let mut state = GameState::new();
        let mut last = Outcome::Ongoing;
        for sub in [0, 4, 8] {
            for cell in [0, 1, 2] {
                last = state.apply_move(Move::new(sub, cell), Player::O);
            }
        }
        assert_eq!(last, Outcome::Win);
        assert_eq!(state.result(), GameResult::Won(Player::O));
        assert!(state.legal_moves().is_empty());
        assert!(!state.accepts(Move::new(1, 0)));
    }

    #[test]
    fn test_full_meta_board_settled_by_claim_count() {
        let mut state = GameState::new();
        // X claims 0 and 2, O claims 1, everything else is drawn.
        for cell in [0, 1, 2] {
            state.apply_move(Move::new(0, cell), Player::X);
            state.apply_move(Move::new(2, cell), Player::X);
            state.apply_move(Move::new(1, cell), Player::O);
        }
        // Remaining six boards drawn with the X O X / X O O / O X X pattern.
        let draw = [
            (0, Player::X),
            (1, Player::O),
            (2, Player::X),
            (4, Player::O),
            (3, Player::X),
            (5, Player::O),
            (7, Player::X),
            (6, Player::O),
            (8, Player::X),
        ];
        let mut last = Outcome::Ongoing;
        for sub in 3..9 {
            for &(cell, player) in &draw {
                // O closes the final board so the claim count is read from O's side.
                let player = if sub == 8 && cell == 8 { Player::O } else { player };
                last = state.apply_move(Move::new(sub, cell), player);
            }
        }
        assert!(state.meta().is_full());
        assert!(!state.meta().has_won(Player::X));
        assert_eq!(last, Outcome::Loss);
        assert_eq!(state.result(), GameResult::Won(Player::X));
    }

    #[test]
    fn test_legal_moves_with_decided_forced_board() {
        let mut state = GameState::new();
        state.apply_move(Move::new(5, 0), Player::O);
        state.apply_move(Move::new(5, 4), Player::O);
        state.apply_move(Move::new(5, 8), Player::O);
        assert!(state.meta().is_decided(5));

        let mut moves = Vec::new();
        state.legal_moves_into(5, &mut moves);
        let expected: usize = (0..9)
            .filter(|&sub| !state.meta().is_decided(sub))
            .map(|sub| state.sub_board(sub).free_cells().count_ones() as usize)
            .sum();
        assert_eq!(moves.len(), expected);
        assert!(moves.iter().all(|mv| mv.sub != 5 && state.is_legal(*mv)));
        assert_eq!(state.legal_move_count(5), expected);

        moves.clear();
        state.legal_moves_into(FREE_CHOICE, &mut moves);
        assert_eq!(moves.len(), expected);

        moves.clear();
        state.legal_moves_into(1, &mut moves);
        assert_eq!(moves.len(), 9);
        assert!(moves.iter().all(|mv| mv.sub == 1));
    }

    #[test]
    fn test_duplicate_copies_everything() {
        let mut live = GameState::new();
        live.make_move(Move::CENTER);
        live.make_move(Move::new(4, 0));
        let mut scratch = GameState::new();
        scratch.duplicate(&live);
        assert_eq!(scratch, live);
        scratch.make_move(Move::new(0, 4));
        assert_ne!(scratch, live);
    }

    #[test]
    fn test_move_parsing_and_display() {
        let mv: Move = "1 6".parse().unwrap();
        assert_eq!(mv, Move::new(2, 3));
        assert_eq!(mv.to_string(), "1 6");
        assert!("9 0".parse::<Move>().is_err());
        assert!("1".parse::<Move>().is_err());
        assert!("a b".parse::<Move>().is_err());
        assert_eq!(Move::from_absolute(4, 4), Some(Move::CENTER));
    }
}
