//! Line protocol spoken with the referee.
//!
//! Every turn the referee sends the opponent's last move as `row col` on the
//! 9×9 grid, or `-1 -1` when we play first. The bot answers with one
//! `row col` line. The Codingame referee additionally sends a count line and
//! that many legal actions after each move; [`ProtocolReader`] can skip them.

use crate::games::Move;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("input ended unexpectedly")]
    UnexpectedEof,
    #[error("malformed move line {0:?}, expected \"row col\"")]
    Malformed(String),
    #[error("coordinates out of range: row {row}, col {col}")]
    OutOfRange { row: i64, col: i64 },
    #[error("malformed action count line {0:?}")]
    BadActionCount(String),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// What the referee asks of us this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// We move first; no opponent move yet.
    First,
    /// The opponent just played this move.
    Opponent(Move),
}

/// Parses one referee line.
pub fn parse_turn(line: &str) -> Result<Turn, ProtocolError> {
    let malformed = || ProtocolError::Malformed(line.trim().to_string());
    let mut fields = line.split_whitespace();
    let row: i64 = fields
        .next()
        .ok_or_else(malformed)?
        .parse()
        .map_err(|_| malformed())?;
    if row == -1 {
        return Ok(Turn::First);
    }
    let col: i64 = fields
        .next()
        .ok_or_else(malformed)?
        .parse()
        .map_err(|_| malformed())?;
    if fields.next().is_some() {
        return Err(malformed());
    }
    if !(0..9).contains(&row) || !(0..9).contains(&col) {
        return Err(ProtocolError::OutOfRange { row, col });
    }
    Move::from_absolute(row as u8, col as u8)
        .map(Turn::Opponent)
        .ok_or(ProtocolError::OutOfRange { row, col })
}

/// Formats our answer line, without the trailing newline.
pub fn format_move(mv: Move) -> String {
    mv.to_string()
}

/// Reads referee turns from a buffered input.
pub struct ProtocolReader<R> {
    input: R,
    skip_valid_actions: bool,
    line: String,
}

impl<R: BufRead> ProtocolReader<R> {
    pub fn new(input: R, skip_valid_actions: bool) -> Self {
        Self {
            input,
            skip_valid_actions,
            line: String::new(),
        }
    }

    /// Reads the next turn. `Ok(None)` at a clean end of input.
    ///
    /// Blank lines between turns are ignored.
    pub fn next_turn(&mut self) -> Result<Option<Turn>, ProtocolError> {
        let turn = loop {
            if !self.read_line()? {
                return Ok(None);
            }
            if !self.line.trim().is_empty() {
                break parse_turn(&self.line)?;
            }
        };
        if self.skip_valid_actions {
            self.skip_actions()?;
        }
        Ok(Some(turn))
    }

    fn skip_actions(&mut self) -> Result<(), ProtocolError> {
        if !self.read_line()? {
            return Err(ProtocolError::UnexpectedEof);
        }
        let count: usize = self
            .line
            .trim()
            .parse()
            .map_err(|_| ProtocolError::BadActionCount(self.line.trim().to_string()))?;
        for _ in 0..count {
            if !self.read_line()? {
                return Err(ProtocolError::UnexpectedEof);
            }
        }
        Ok(())
    }

    /// Returns false at end of input.
    fn read_line(&mut self) -> Result<bool, ProtocolError> {
        self.line.clear();
        Ok(self.input.read_line(&mut self.line)? > 0)
    }
}
