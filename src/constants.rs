//! Constants for board geometry, positional tables, and search budgets.
//!
//! The board is always 8x8. Positions are `(row, col)` pairs, 0-indexed from
//! the top-left corner.

use crate::position::Position;

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
pub const N: usize = 8;

/// Offsets to the eight neighbouring squares as `(d_row, d_col)`.
/// Order: N, NE, E, SE, S, SW, W, NW
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Black discs of the opening layout.
pub const START_BLACK: [Position; 2] = [Position::new(3, 4), Position::new(4, 3)];

/// White discs of the opening layout.
pub const START_WHITE: [Position; 2] = [Position::new(3, 3), Position::new(4, 4)];

// =============================================================================
// Positional Tables
// =============================================================================

/// Corners can never be flipped back.
pub const CORNERS: [Position; 4] = [
    Position::new(0, 0),
    Position::new(0, 7),
    Position::new(7, 0),
    Position::new(7, 7),
];

/// Squares orthogonally adjacent to a corner.
pub const BAD_SQUARES: [Position; 8] = [
    Position::new(0, 1),
    Position::new(1, 0),
    Position::new(6, 0),
    Position::new(7, 1),
    Position::new(7, 6),
    Position::new(6, 7),
    Position::new(0, 6),
    Position::new(1, 7),
];

/// Squares diagonally adjacent to a corner (they tend to hand the corner over).
pub const VERY_BAD_SQUARES: [Position; 4] = [
    Position::new(1, 1),
    Position::new(1, 6),
    Position::new(6, 1),
    Position::new(6, 6),
];

/// Extra draws a heuristic playout takes after landing on a very bad square.
pub const VERY_BAD_REDRAWS: usize = 2;

// =============================================================================
// Search Budgets
// =============================================================================

/// Default playouts per rollout batch.
pub const DEFAULT_SIMULATIONS: u32 = 20;

/// Default number of selection/expansion/rollout iterations.
pub const DEFAULT_ITERATIONS: u32 = 300;

// =============================================================================
// Request Boundary
// =============================================================================

/// Upper bound on an encoded request.
pub const MAX_REQUEST_BYTES: usize = 1 << 20;
