//! The meta-board: which sub-boards are claimed, drawn, or still open.

use super::{BitBoard, Occupancy, Player};
use std::cmp::Ordering;
use std::fmt;
use uttt_shared::mask_of;

/// Outcome board over the nine sub-boards.
///
/// Claimed sub-boards live in an embedded [`BitBoard`]; sub-boards that ended
/// without a winner are recorded in `neutral` and belong to nobody. A cell of
/// the meta-board never reverts to open once claimed or neutralized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MetaBoard {
    board: BitBoard,
    neutral: u16,
    claims: [u8; 2],
}

impl MetaBoard {
    pub const fn new() -> Self {
        Self {
            board: BitBoard::new(),
            neutral: 0,
            claims: [0, 0],
        }
    }

    /// Records that `player` won sub-board `sub`.
    #[inline]
    pub fn claim(&mut self, sub: u8, player: Player) {
        debug_assert!(self.is_playable(sub), "sub-board {} already decided", sub);
        self.board.apply(sub, player);
        self.claims[player.index()] += 1;
    }

    /// Records that sub-board `sub` filled up without a winner.
    #[inline]
    pub fn neutralize(&mut self, sub: u8) {
        debug_assert!(self.is_playable(sub), "sub-board {} already decided", sub);
        self.neutral ^= mask_of(sub);
    }

    /// Returns true if `player` owns three sub-boards in a line.
    #[inline]
    pub fn has_won(&self, player: Player) -> bool {
        self.board.has_won(player)
    }

    /// Sub-boards won by `player`.
    #[inline]
    pub fn owned(&self, player: Player) -> u16 {
        self.board.owned(player)
    }

    /// Sub-boards that ended drawn.
    #[inline]
    pub fn neutral(&self) -> u16 {
        self.neutral
    }

    /// Number of sub-boards `player` has claimed.
    #[inline]
    pub fn claims(&self, player: Player) -> u8 {
        self.claims[player.index()]
    }

    /// Compares `player`'s claim count against the opponent's.
    ///
    /// Used to settle a meta-board that filled up without a line.
    #[inline]
    pub fn compare_claims(&self, player: Player) -> Ordering {
        self.claims(player).cmp(&self.claims(player.opponent()))
    }

    /// Returns true if sub-board `sub` is won or drawn.
    #[inline]
    pub fn is_decided(&self, sub: u8) -> bool {
        !self.is_playable(sub)
    }

    /// Who won sub-board `sub`, if anyone.
    #[inline]
    pub fn winner_of(&self, sub: u8) -> Option<Player> {
        self.board.cell(sub)
    }
}

impl Occupancy for MetaBoard {
    #[inline]
    fn occupied(&self) -> u16 {
        self.board.occupied() | self.neutral
    }
}

impl fmt::Display for MetaBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let sub = row * 3 + col;
                let symbol = match self.winner_of(sub) {
                    Some(player) => player.symbol(),
                    None if self.neutral & mask_of(sub) != 0 => '#',
                    None => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
