//! # Ultimate Tic-Tac-Toe Game Model
//!
//! This module contains the bit-packed rules engine the search runs on.
//! Nine 3×3 sub-boards sit inside a 3×3 meta-board; winning a sub-board claims
//! the matching meta-cell and three claimed meta-cells in a row win the game.
//!
//! ## Layout
//! - [`BitBoard`]: one sub-board, two 9-bit occupancy masks
//! - [`MetaBoard`]: a `BitBoard` of claimed sub-boards plus a drawn ("neutral")
//!   mask and per-player claim counters for the tie-break
//! - [`GameState`]: the meta-board, the nine sub-boards and the forced
//!   sub-board rule, with move application and legal-move enumeration
//!
//! `BitBoard` and `MetaBoard` are not substitutable: the meta-board treats a
//! neutral cell as taken, a sub-board has no such notion. The only behaviour
//! they share is mask arithmetic, captured by the [`Occupancy`] trait.

pub mod bit_board;
pub mod meta_board;
pub mod ultimate;

pub use bit_board::BitBoard;
pub use meta_board::MetaBoard;
pub use ultimate::{GameResult, GameState, Move, Outcome, FREE_CHOICE};

use std::fmt;
use uttt_shared::{mask_of, FULL_BOARD};

/// Occupancy queries shared by every 3×3 bit board.
pub trait Occupancy {
    /// Mask of every cell that can no longer be played.
    fn occupied(&self) -> u16;

    /// Returns true if the cell at `index` is still open.
    #[inline]
    fn is_playable(&self, index: u8) -> bool {
        self.occupied() & mask_of(index) == 0
    }

    /// Returns true if no cell is open.
    #[inline]
    fn is_full(&self) -> bool {
        self.occupied() == FULL_BOARD
    }

    /// Mask of the cells still open.
    #[inline]
    fn free_cells(&self) -> u16 {
        !self.occupied() & FULL_BOARD
    }
}

/// One of the two players.
///
/// `X` moves first in a fresh game. The discriminant doubles as the index into
/// per-player arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    X = 0,
    O = 1,
}

impl Player {
    /// Index into per-player mask arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Iterates the set bits of a 9-bit mask, lowest index first.
#[inline]
pub(crate) fn cells_of(mut mask: u16) -> impl Iterator<Item = u8> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let cell = mask.trailing_zeros() as u8;
        mask &= mask - 1;
        Some(cell)
    })
}
