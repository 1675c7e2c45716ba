//! Othello board state and move rules.
//!
//! A [`Board`] owns the 8x8 grid together with everything derived from it:
//! the frontier (empty squares touching a disc), the legal moves for the side
//! to move, both scores, and the game status. The derived sets are rebuilt on
//! construction and updated incrementally by [`Board::apply_move`], which is
//! the only way to mutate a board.
//!
//! Turn management happens inside `apply_move`: when the next player has no
//! legal move the turn passes straight back, and when neither side can move
//! the game is scored. A board whose status is undetermined therefore always
//! has at least one legal move.

use std::fmt;

use thiserror::Error;

use crate::constants::{DIRECTIONS, N, START_BLACK, START_WHITE};
use crate::position::Position;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Wire value: `1` for Black, `-1` for White.
    pub const fn value(self) -> i8 {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }

    pub fn from_value(value: i64) -> Result<Self, BoardError> {
        match value {
            1 => Ok(Color::Black),
            -1 => Ok(Color::White),
            other => Err(BoardError::InvalidTurn(other)),
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Color::Black => 'X',
            Color::White => 'O',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

/// Outcome of the game so far.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Undetermined,
    BlackWins,
    WhiteWins,
    Draw,
}

impl Status {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Status::Undetermined
    }

    /// The winning colour, if the game ended with one.
    pub fn winner(self) -> Option<Color> {
        match self {
            Status::BlackWins => Some(Color::Black),
            Status::WhiteWins => Some(Color::White),
            Status::Undetermined | Status::Draw => None,
        }
    }

    fn from_scores(black: u32, white: u32) -> Self {
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Status::BlackWins,
            std::cmp::Ordering::Less => Status::WhiteWins,
            std::cmp::Ordering::Equal => Status::Draw,
        }
    }
}

/// Errors raised by board construction and move application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("position {0} is off the board")]
    MalformedPosition(Position),
    #[error("illegal move at {0}")]
    IllegalMove(Position),
    #[error("turn must be 1 (black) or -1 (white), got {0}")]
    InvalidTurn(i64),
}

/// An 8x8 Othello position with its derived move sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Color>; N]; N],
    /// Empty squares adjacent to at least one disc, in discovery order.
    frontier: Vec<Position>,
    /// Subset of `frontier` where `turn` may play.
    legal_moves: Vec<Position>,
    black_score: u32,
    white_score: u32,
    turn: Color,
    status: Status,
}

impl Default for Board {
    fn default() -> Self {
        Self::fresh_game()
    }
}

impl Board {
    /// The standard opening: four discs in the centre, Black to move.
    pub fn fresh_game() -> Self {
        let mut cells = [[None; N]; N];
        for p in START_BLACK {
            cells[p.row as usize][p.col as usize] = Some(Color::Black);
        }
        for p in START_WHITE {
            cells[p.row as usize][p.col as usize] = Some(Color::White);
        }
        Self::from_cells(cells, Color::Black)
    }

    /// Rebuild a board from externally supplied disc lists.
    ///
    /// The lists are trusted to be disjoint; a square listed in both ends up
    /// white. Out-of-range coordinates are rejected.
    pub fn reconstruct_from(
        black: &[Position],
        white: &[Position],
        turn: Color,
    ) -> Result<Self, BoardError> {
        let mut cells = [[None; N]; N];
        for (&p, color) in black
            .iter()
            .map(|p| (p, Color::Black))
            .chain(white.iter().map(|p| (p, Color::White)))
        {
            if !p.is_in_range() {
                return Err(BoardError::MalformedPosition(p));
            }
            cells[p.row as usize][p.col as usize] = Some(color);
        }
        Ok(Self::from_cells(cells, turn))
    }

    /// Shared initialisation: derive frontier, scores, legal moves and status.
    fn from_cells(cells: [[Option<Color>; N]; N], turn: Color) -> Self {
        let mut board = Board {
            cells,
            frontier: Vec::new(),
            legal_moves: Vec::new(),
            black_score: 0,
            white_score: 0,
            turn,
            status: Status::Undetermined,
        };

        for row in 0..N as i8 {
            for col in 0..N as i8 {
                let p = Position::new(row, col);
                match board.at(p) {
                    Some(Color::Black) => board.black_score += 1,
                    Some(Color::White) => board.white_score += 1,
                    None => continue,
                }
                let neighbours: Vec<Position> = board.empty_neighbours(p).collect();
                for n in neighbours {
                    if !board.frontier.contains(&n) {
                        board.frontier.push(n);
                    }
                }
            }
        }

        board.resolve_turn();
        board
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    #[inline]
    pub fn legal_moves(&self) -> &[Position] {
        &self.legal_moves
    }

    #[inline]
    pub fn frontier(&self) -> &[Position] {
        &self.frontier
    }

    #[inline]
    pub fn black_score(&self) -> u32 {
        self.black_score
    }

    #[inline]
    pub fn white_score(&self) -> u32 {
        self.white_score
    }

    pub fn score(&self, color: Color) -> u32 {
        match color {
            Color::Black => self.black_score,
            Color::White => self.white_score,
        }
    }

    /// Number of discs on the board.
    #[inline]
    pub fn occupied_count(&self) -> u32 {
        self.black_score + self.white_score
    }

    /// Disc at `pos`, or `None` for empty or off-board squares.
    pub fn cell(&self, pos: Position) -> Option<Color> {
        if pos.is_in_range() { self.at(pos) } else { None }
    }

    /// All squares holding a disc of `color`, row-major.
    pub fn discs(&self, color: Color) -> Vec<Position> {
        (0..N as i8)
            .flat_map(|row| (0..N as i8).map(move |col| Position::new(row, col)))
            .filter(|&p| self.at(p) == Some(color))
            .collect()
    }

    #[inline]
    pub fn is_legal(&self, pos: Position) -> bool {
        self.legal_moves.contains(&pos)
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    #[inline]
    pub fn is_in_range(&self, pos: Position) -> bool {
        pos.is_in_range()
    }

    /// Would placing a `turn` disc on the empty square `from` capture along `dir`?
    ///
    /// The walk must cross at least one opposing disc and then stop on a disc
    /// of the side to move, without leaving the board or meeting an empty
    /// square first.
    pub fn legal_direction(&self, dir: (i8, i8), from: Position) -> bool {
        if !from.is_in_range() || self.at(from).is_some() {
            return false;
        }

        let mut crossed = false;
        let mut p = from.offset(dir);
        while p.is_in_range() {
            match self.at(p) {
                None => return false,
                Some(c) if c == self.turn => return crossed,
                Some(_) => crossed = true,
            }
            p = p.offset(dir);
        }
        false
    }

    /// True iff at least one direction from `pos` captures.
    pub fn has_legal_direction(&self, pos: Position) -> bool {
        DIRECTIONS.iter().any(|&dir| self.legal_direction(dir, pos))
    }

    /// Frontier squares where the side to move can play.
    pub fn compute_legal_moves(&self) -> Vec<Position> {
        self.frontier
            .iter()
            .copied()
            .filter(|&p| self.has_legal_direction(p))
            .collect()
    }

    /// Place a disc for the side to move, flip captured discs, and hand the
    /// turn over (passing or ending the game as needed).
    ///
    /// Returns the number of flipped discs. On error the board is untouched.
    pub fn apply_move(&mut self, pos: Position) -> Result<u32, BoardError> {
        if !pos.is_in_range() {
            return Err(BoardError::MalformedPosition(pos));
        }
        if self.status.is_terminal() || !self.is_legal(pos) {
            return Err(BoardError::IllegalMove(pos));
        }

        let mover = self.turn;
        let mut flipped = 0u32;
        for dir in DIRECTIONS {
            if !self.legal_direction(dir, pos) {
                continue;
            }
            let mut p = pos.offset(dir);
            while self.at(p) != Some(mover) {
                self.set(p, mover);
                flipped += 1;
                p = p.offset(dir);
            }
        }
        self.set(pos, mover);

        match mover {
            Color::Black => {
                self.black_score += flipped + 1;
                self.white_score -= flipped;
            }
            Color::White => {
                self.white_score += flipped + 1;
                self.black_score -= flipped;
            }
        }

        self.frontier.retain(|&p| p != pos);
        let neighbours: Vec<Position> = self.empty_neighbours(pos).collect();
        for n in neighbours {
            if !self.frontier.contains(&n) {
                self.frontier.push(n);
            }
        }

        self.turn = mover.opponent();
        self.resolve_turn();
        Ok(flipped)
    }

    /// Recompute legal moves for `turn`, passing once if it has none and
    /// scoring the game if the other side cannot move either.
    fn resolve_turn(&mut self) {
        self.legal_moves = self.compute_legal_moves();
        if !self.legal_moves.is_empty() {
            return;
        }

        self.turn = self.turn.opponent();
        self.legal_moves = self.compute_legal_moves();
        if self.legal_moves.is_empty() {
            self.status = Status::from_scores(self.black_score, self.white_score);
        }
    }

    fn empty_neighbours(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        DIRECTIONS
            .iter()
            .map(move |&dir| pos.offset(dir))
            .filter(|&n| n.is_in_range() && self.at(n).is_none())
    }

    /// Caller guarantees `pos` is in range.
    #[inline]
    fn at(&self, pos: Position) -> Option<Color> {
        self.cells[pos.row as usize][pos.col as usize]
    }

    #[inline]
    fn set(&mut self, pos: Position, color: Color) {
        self.cells[pos.row as usize][pos.col as usize] = Some(color);
    }
}

#[cfg(test)]
impl Board {
    /// Replace the legal-move list without checking it against the grid.
    pub(crate) fn set_legal_moves_unchecked(&mut self, moves: Vec<Position>) {
        self.legal_moves = moves;
    }
}

/// Renders the grid with `X` for Black, `O` for White and `*` on the legal
/// moves of the side to move.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for col in 0..N as u8 {
            write!(f, " {}", (b'A' + col) as char)?;
        }
        writeln!(f)?;
        for row in 0..N as i8 {
            write!(f, "{}", row + 1)?;
            for col in 0..N as i8 {
                let p = Position::new(row, col);
                let ch = match self.at(p) {
                    Some(color) => color.symbol(),
                    None if self.is_legal(p) => '*',
                    None => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        match self.status {
            Status::Undetermined => writeln!(
                f,
                "X {}  O {}  ({} to move)",
                self.black_score, self.white_score, self.turn
            ),
            status => writeln!(
                f,
                "X {}  O {}  ({status:?})",
                self.black_score, self.white_score
            ),
        }
    }
}
