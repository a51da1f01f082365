//! Square grid coordinates for the board.
//!
//! This module provides the coordinate types the rest of the engine is built on:
//! - `Square`: a (row, column) position on the grid
//! - `Side`: one of the four sides of a square, clockwise from the top
//!
//! Rows grow downwards and columns grow to the right. The interior grid is
//! `NUM_ROWS` x `NUM_COLS`; the fixed start squares sit one step outside it,
//! so a valid row or column ranges over `-1..=NUM_ROWS`.

use serde::{Deserialize, Serialize};

/// Rows in the interior grid
pub const NUM_ROWS: i32 = 7;

/// Columns in the interior grid
pub const NUM_COLS: i32 = 7;

/// Number of exits (start squares) around the grid
pub const NUM_STARTS: usize = 12;

/// Side of a square, in clockwise order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All sides in clockwise order starting from the top
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Position of this side in the clockwise (TOP, RIGHT, BOTTOM, LEFT) tuple
    pub const fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }

    /// Side at a position of the clockwise tuple (taken modulo 4)
    pub const fn from_index(index: usize) -> Side {
        Side::ALL[index % 4]
    }

    /// The side facing this one across a shared edge
    pub const fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// (row, column) step towards the neighbour on this side
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Side::Top => (-1, 0),
            Side::Right => (0, 1),
            Side::Bottom => (1, 0),
            Side::Left => (0, -1),
        }
    }

    /// Whether this side points in the +row or +column direction
    pub const fn is_forward(self) -> bool {
        matches!(self, Side::Right | Side::Bottom)
    }
}

/// A (row, column) position.
///
/// Ordering is row-major, which is also the board's deterministic scan order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Square {
    pub row: i32,
    pub col: i32,
}

impl Square {
    /// Create a new square
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The square sharing this square's edge on `side` (may be off the board)
    pub const fn neighbor(&self, side: Side) -> Square {
        let (dr, dc) = side.offset();
        Square::new(self.row + dr, self.col + dc)
    }

    /// The four neighbours in clockwise order starting from the top
    pub fn neighbors(&self) -> [Square; 4] {
        Side::ALL.map(|side| self.neighbor(side))
    }

    /// Whether this square is part of the interior grid
    pub const fn is_interior(&self) -> bool {
        self.row >= 0 && self.row < NUM_ROWS && self.col >= 0 && self.col < NUM_COLS
    }

    /// Whether this square lies within the ring of rows/columns the board can use
    pub const fn in_bounds(&self) -> bool {
        self.row >= -1 && self.row <= NUM_ROWS && self.col >= -1 && self.col <= NUM_COLS
    }

    /// Whether this square is in the 3x3 centre region
    pub const fn is_centre(&self) -> bool {
        self.row >= 2 && self.row <= 4 && self.col >= 2 && self.col <= 4
    }

    /// All interior squares in row-major order
    pub fn interior() -> impl Iterator<Item = Square> {
        (0..NUM_ROWS).flat_map(|row| (0..NUM_COLS).map(move |col| Square::new(row, col)))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
