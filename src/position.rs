//! Board coordinates.
//!
//! A [`Position`] is a plain `(row, col)` pair. It may hold out-of-range
//! values (walks off the edge produce them), so every consumer checks
//! [`Position::is_in_range`] before indexing.
//!
//! Standard Othello notation names columns `A`-`H` left to right and rows
//! `1`-`8` top to bottom: `(0, 0)` is `A1`, `(0, 7)` is `H1`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::N;

/// A square on the board, `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// True iff both coordinates lie in `[0, N)`.
    #[inline]
    pub const fn is_in_range(self) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < N && (self.col as usize) < N
    }

    /// The square one step away in direction `(d_row, d_col)`.
    #[inline]
    pub const fn offset(self, (d_row, d_col): (i8, i8)) -> Self {
        Self {
            row: self.row.saturating_add(d_row),
            col: self.col.saturating_add(d_col),
        }
    }

    /// Convert from the `[row, col]` wire form.
    ///
    /// Coordinates that do not fit in an `i8` are clamped, which keeps them
    /// out of range so the board still rejects them.
    pub fn from_pair([row, col]: [i64; 2]) -> Self {
        let clamp = |v: i64| v.clamp(i8::MIN as i64, i8::MAX as i64) as i8;
        Self::new(clamp(row), clamp(col))
    }

    /// Convert to the `[row, col]` wire form.
    pub fn to_pair(self) -> [i64; 2] {
        [self.row as i64, self.col as i64]
    }

    /// Euclidean distance from the geometric centre of the board.
    pub fn distance_from_centre(self) -> f64 {
        let centre = (N as f64 - 1.0) / 2.0;
        let dr = self.row as f64 - centre;
        let dc = self.col as f64 - centre;
        (dr * dr + dc * dc).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_in_range() {
            let col = (b'A' + self.col as u8) as char;
            write!(f, "{col}{}", self.row + 1)
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

/// Failure to parse a coordinate such as `"D3"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid coordinate {0:?}, expected a column A-H followed by a row 1-8")]
pub struct ParsePositionError(pub String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePositionError(s.to_string());
        let s = s.trim();
        let mut chars = s.chars();
        let col_char = chars.next().ok_or_else(err)?.to_ascii_uppercase();
        let row: i8 = chars.as_str().parse().map_err(|_| err())?;

        if !col_char.is_ascii_uppercase() {
            return Err(err());
        }
        let row = row.checked_sub(1).ok_or_else(err)?;
        let pos = Position::new(row, (col_char as u8 - b'A') as i8);
        if pos.is_in_range() { Ok(pos) } else { Err(err()) }
    }
}
