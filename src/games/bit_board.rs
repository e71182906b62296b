//! A single 3×3 sub-board stored as two 9-bit masks.

use super::{Occupancy, Player};
use std::fmt;
use uttt_shared::{has_line, mask_of};

/// One 3×3 sub-board.
///
/// `owned[p]` holds the cells taken by player `p`. The two masks never
/// overlap as long as callers only apply playable cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BitBoard {
    owned: [u16; 2],
}

impl BitBoard {
    pub const fn new() -> Self {
        Self { owned: [0, 0] }
    }

    /// Mask of the cells owned by `player`.
    #[inline]
    pub fn owned(&self, player: Player) -> u16 {
        self.owned[player.index()]
    }

    /// Marks `cell` for `player`.
    ///
    /// The cell must be playable; this is not checked in release builds.
    #[inline]
    pub fn apply(&mut self, cell: u8, player: Player) {
        debug_assert!(cell < 9, "cell {} out of range", cell);
        debug_assert!(self.is_playable(cell), "cell {} already taken", cell);
        self.owned[player.index()] ^= mask_of(cell);
    }

    /// Returns true if `player` holds a full row, column or diagonal.
    #[inline]
    pub fn has_won(&self, player: Player) -> bool {
        has_line(self.owned[player.index()])
    }

    /// Full board with no winner.
    #[inline]
    pub fn is_drawn(&self) -> bool {
        self.is_full() && !self.has_won(Player::X) && !self.has_won(Player::O)
    }

    /// The owner of `cell`, if any.
    pub fn cell(&self, cell: u8) -> Option<Player> {
        let mask = mask_of(cell);
        if self.owned[0] & mask != 0 {
            Some(Player::X)
        } else if self.owned[1] & mask != 0 {
            Some(Player::O)
        } else {
            None
        }
    }
}

impl Occupancy for BitBoard {
    #[inline]
    fn occupied(&self) -> u16 {
        self.owned[0] | self.owned[1]
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let symbol = match self.cell(row * 3 + col) {
                    Some(player) => player.symbol(),
                    None => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
