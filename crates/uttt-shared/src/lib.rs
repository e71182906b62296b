#![no_std]

//! Bit-level building blocks for a 3×3 board.
//!
//! A board is a 9-bit mask, cell `i` (row-major, 0..=8) at bit `1 << i`. The
//! same encoding is used for a single sub-board and for the meta-board, so the
//! win test below serves both.

/// All nine cells occupied.
pub const FULL_BOARD: u16 = 0b111_111_111;

/// Number of cells on a 3×3 board.
pub const CELLS: u8 = 9;

/// The eight winning triplets: three rows, three columns, two diagonals.
pub const WIN_CONDITIONS: [u16; 8] = [
    0b111_000_000,
    0b000_111_000,
    0b000_000_111,
    0b100_100_100,
    0b010_010_010,
    0b001_001_001,
    0b100_010_001,
    0b001_010_100,
];

/// Returns the single-bit mask for a cell index.
#[inline]
pub const fn mask_of(index: u8) -> u16 {
    1 << index
}

/// Returns true if `mask` fully covers at least one winning triplet.
#[inline]
pub fn has_line(mask: u16) -> bool {
    WIN_CONDITIONS
        .iter()
        .any(|&condition| mask & condition == condition)
}

/// Converts a (sub-board, cell) pair into absolute `(row, col)` on the 9×9 grid.
///
/// This is the `sub/3*27 + sub%3*3 + cell/3*9 + cell%3` linear index split
/// into `index / 9` and `index % 9`.
#[inline]
pub const fn to_absolute(sub: u8, cell: u8) -> (u8, u8) {
    let index = sub / 3 * 27 + sub % 3 * 3 + cell / 3 * 9 + cell % 3;
    (index / 9, index % 9)
}

/// Converts an absolute `(row, col)` on the 9×9 grid into (sub-board, cell).
#[inline]
pub const fn from_absolute(row: u8, col: u8) -> (u8, u8) {
    (row / 3 * 3 + col / 3, row % 3 * 3 + col % 3)
}
