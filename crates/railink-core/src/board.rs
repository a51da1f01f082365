//! Board representation: the interior grid plus the fixed exit squares.
//!
//! This module contains:
//! - The twelve start (exit) positions around the grid
//! - The `Board` mapping every valid square to exactly one tile
//! - Adjacency and edge queries
//! - The legal-placement predicate used by solvers and turn validation
//! - A JSON-friendly representation and the rulebook example board

use crate::cluster::ClusterForest;
use crate::geometry::{Side, Square, NUM_COLS, NUM_ROWS};
use crate::tile::{EdgeType, Piece, Rotation, Tile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Fixed exit tiles around the grid, each pointing inwards on one side
pub const START_POSITIONS: [(Square, Piece, Rotation); 12] = [
    // Railway exits
    (Square::new(-1, 3), Piece::StartRailway, Rotation::R180),
    (Square::new(NUM_ROWS, 3), Piece::StartRailway, Rotation::R0),
    (Square::new(1, -1), Piece::StartRailway, Rotation::R90),
    (Square::new(5, -1), Piece::StartRailway, Rotation::R90),
    (Square::new(1, NUM_COLS), Piece::StartRailway, Rotation::R270),
    (Square::new(5, NUM_COLS), Piece::StartRailway, Rotation::R270),
    // Highway exits
    (Square::new(-1, 1), Piece::StartHighway, Rotation::R180),
    (Square::new(-1, 5), Piece::StartHighway, Rotation::R180),
    (Square::new(3, -1), Piece::StartHighway, Rotation::R90),
    (Square::new(3, NUM_COLS), Piece::StartHighway, Rotation::R270),
    (Square::new(NUM_ROWS, 1), Piece::StartHighway, Rotation::R0),
    (Square::new(NUM_ROWS, 5), Piece::StartHighway, Rotation::R0),
];

/// Source of mutation stamps, shared by every board in the process
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Maximum number of special pieces on one board
pub const NUM_SPECIALS: u8 = 3;

/// Errors raised by board queries, mutations and topology checks
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("Square {square} is not on the board")]
    OutOfRange { square: Square },

    #[error("Square {square} holds a fixed exit tile")]
    FixedSquare { square: Square },

    #[error("{piece:?} cannot be placed on the board")]
    UnplaceablePiece { piece: Piece },

    #[error("Railway meets highway between {square} ({side:?}) and {neighbour}")]
    EdgeClash {
        square: Square,
        side: Side,
        neighbour: Square,
    },

    #[error("Cluster containing {square} reaches no exit and no overpass")]
    DisconnectedCluster { square: Square },
}

/// The complete board
#[derive(Debug, Clone)]
pub struct Board {
    /// Every valid square, interior and exits
    tiles: HashMap<Square, Tile>,
    /// Turn each interior tile was placed on, when known
    turns: HashMap<Square, u8>,
    /// Special pieces currently on the board
    special_count: u8,
    /// Fresh process-wide stamp on every mutation, so diverging clones never
    /// share one
    generation: u64,
}

impl Board {
    /// Create an empty board with only the exit tiles in place
    pub fn new() -> Self {
        let mut tiles: HashMap<Square, Tile> =
            Square::interior().map(|square| (square, Tile::blank())).collect();
        for (square, piece, rotation) in START_POSITIONS {
            tiles.insert(square, Tile::new(piece, rotation));
        }
        Self {
            tiles,
            turns: HashMap::new(),
            special_count: 0,
            generation: 0,
        }
    }

    /// Create the board shown in the rulebook's worked example (after six turns)
    pub fn rulebook_example() -> Self {
        use Piece::*;
        use Rotation::*;

        let placements = [
            (0, 1, Tile::new(HighwayStraight, R0), 6),
            (1, 0, Tile::new(RailwayStraight, R90), 3),
            (1, 1, Tile::new(Overpass, R0), 3),
            (1, 2, Tile::new(RailwayStraight, R90), 4),
            (1, 3, Tile::new(ThreeRJunction, R180), 4),
            (1, 4, Tile::mirrored(CornerStation, R0), 6),
            (2, 1, Tile::new(HighwayStraight, R0), 2),
            (2, 3, Tile::new(HighwayCorner, R90), 5),
            (2, 5, Tile::new(HighwayCorner, R270), 6),
            (3, 0, Tile::new(HighwayStraight, R90), 2),
            (3, 1, Tile::new(HighwayT, R0), 2),
            (3, 2, Tile::new(HighwayCorner, R270), 3),
            (3, 5, Tile::new(HighwayT, R90), 6),
            (3, 6, Tile::new(HighwayStraight, R90), 4),
            (4, 2, Tile::new(HighwayStraight, R0), 3),
            (4, 3, Tile::new(CornerStation, R180), 4),
            (4, 4, Tile::new(HighwayJunction, R0), 5),
            (5, 0, Tile::new(RailwayStraight, R90), 1),
            (5, 1, Tile::new(RailwayT, R180), 1),
            (5, 2, Tile::mirrored(CornerStation, R0), 2),
            (5, 3, Tile::new(RailwayStraight, R0), 4),
            (5, 6, Tile::new(RailwayStraight, R90), 5),
            (6, 1, Tile::new(StraightStation, R0), 1),
            (6, 3, Tile::new(RailwayT, R90), 1),
            (6, 4, Tile::new(RailwayStraight, R90), 5),
            (6, 5, Tile::new(CornerStation, R270), 5),
        ];

        let mut board = Self::new();
        for (row, col, tile, turn) in placements {
            let square = Square::new(row, col);
            board.tiles.insert(square, tile);
            board.turns.insert(square, turn);
            if tile.piece.is_special() {
                board.special_count += 1;
            }
        }
        board
    }

    // ==================== Query Methods ====================

    /// Whether the square is an interior square or an exit square
    pub fn is_valid_square(&self, square: Square) -> bool {
        self.tiles.contains_key(&square)
    }

    /// Get the tile at a square, `None` if the square is not on the board
    pub fn get_tile_at(&self, square: Square) -> Option<Tile> {
        self.tiles.get(&square).copied()
    }

    /// Whether an interior square is still empty
    pub fn is_square_free(&self, square: Square) -> bool {
        square.is_interior() && self.tiles.get(&square).is_some_and(|t| t.is_blank())
    }

    /// All valid squares in row-major order, exits included
    pub fn squares(&self) -> Vec<Square> {
        let mut squares: Vec<Square> = self.tiles.keys().copied().collect();
        squares.sort();
        squares
    }

    /// Exit squares in row-major order
    pub fn start_squares() -> Vec<Square> {
        let mut squares: Vec<Square> = START_POSITIONS.iter().map(|(s, _, _)| *s).collect();
        squares.sort();
        squares
    }

    /// Non-blank interior tiles in row-major order
    pub fn placed_tiles(&self) -> Vec<(Square, Tile)> {
        Square::interior()
            .filter_map(|square| {
                let tile = self.tiles.get(&square)?;
                (!tile.is_blank()).then_some((square, *tile))
            })
            .collect()
    }

    /// Turn on which the tile at `square` was placed, if recorded
    pub fn turn_placed(&self, square: Square) -> Option<u8> {
        self.turns.get(&square).copied()
    }

    /// Number of special pieces on the board
    pub fn special_count(&self) -> u8 {
        self.special_count
    }

    pub fn all_specials_used(&self) -> bool {
        self.special_count >= NUM_SPECIALS
    }

    /// Counter that changes whenever the board is mutated
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Neighbouring squares of `square`.
    ///
    /// `internal` keeps only interior squares; otherwise any square on the
    /// board qualifies. `forward` keeps only the +row and +column neighbours.
    pub fn adjacent_squares(&self, square: Square, internal: bool, forward: bool) -> Vec<Square> {
        Side::ALL
            .into_iter()
            .filter(|side| !forward || side.is_forward())
            .map(|side| square.neighbor(side))
            .filter(|n| {
                if internal {
                    n.is_interior()
                } else {
                    self.is_valid_square(*n)
                }
            })
            .collect()
    }

    /// The same edge seen from the neighbouring square, e.g. (0,0) RIGHT is (0,1) LEFT
    pub fn opposite_edge(square: Square, side: Side) -> Result<(Square, Side), BoardError> {
        let neighbor = square.neighbor(side);
        if !neighbor.in_bounds() {
            return Err(BoardError::OutOfRange { square: neighbor });
        }
        Ok((neighbor, side.opposite()))
    }

    /// Edge type the neighbour presents back across `side`, `None` off the board
    pub fn facing_edge(&self, square: Square, side: Side) -> Option<EdgeType> {
        let tile = self.tiles.get(&square.neighbor(side))?;
        Some(tile.edge(side.opposite()))
    }

    // ==================== Validation Methods ====================

    /// Whether `tile` may be placed at `square`: the square is free, at least
    /// one route connects to an existing matching edge, and nothing clashes.
    pub fn is_valid_placement(&self, tile: &Tile, square: Square) -> bool {
        if !self.is_square_free(square) || !tile.piece.is_playable() {
            return false;
        }

        let mut connections = 0;
        for (side, edge_type) in tile.route_sides() {
            match self.facing_edge(square, side) {
                Some(existing) if existing == edge_type => connections += 1,
                Some(existing) if existing.clashes_with(edge_type) => return false,
                _ => {}
            }
        }
        connections > 0
    }

    /// Build a fresh cluster snapshot for the current contents
    pub fn clusters(&self) -> Result<ClusterForest, BoardError> {
        ClusterForest::build(self)
    }

    // ==================== Mutation Methods ====================

    /// Place a tile without recording a turn
    pub fn add_tile(&mut self, tile: Tile, square: Square) -> Result<(), BoardError> {
        self.place(tile, square, None)
    }

    /// Place a tile and remember the turn it was played on
    pub fn add_tile_on_turn(&mut self, tile: Tile, square: Square, turn: u8) -> Result<(), BoardError> {
        self.place(tile, square, Some(turn))
    }

    fn place(&mut self, tile: Tile, square: Square, turn: Option<u8>) -> Result<(), BoardError> {
        self.check_mutable(square)?;
        if tile.piece.is_start() || tile.piece.is_overpass_segment() {
            return Err(BoardError::UnplaceablePiece { piece: tile.piece });
        }

        let previous = self.tiles.insert(square, tile);
        if previous.is_some_and(|p| p.piece.is_special()) {
            self.special_count -= 1;
        }
        if tile.piece.is_special() {
            self.special_count += 1;
        }
        match turn {
            Some(turn) => self.turns.insert(square, turn),
            None => self.turns.remove(&square),
        };
        self.generation = next_generation();
        Ok(())
    }

    /// Clear an interior square, returning the tile that was there
    pub fn remove_tile(&mut self, square: Square) -> Result<Tile, BoardError> {
        self.check_mutable(square)?;
        let previous = self.tiles.insert(square, Tile::blank()).unwrap_or_default();
        if previous.piece.is_special() {
            self.special_count -= 1;
        }
        self.turns.remove(&square);
        self.generation = next_generation();
        Ok(previous)
    }

    fn check_mutable(&self, square: Square) -> Result<(), BoardError> {
        if square.is_interior() {
            Ok(())
        } else if self.is_valid_square(square) {
            Err(BoardError::FixedSquare { square })
        } else {
            Err(BoardError::OutOfRange { square })
        }
    }

    /// Convert to a JSON-friendly representation with arrays instead of HashMaps
    pub fn to_json_friendly(&self) -> BoardJson {
        BoardJson {
            tiles: self
                .placed_tiles()
                .into_iter()
                .map(|(square, tile)| PlacedTileJson {
                    row: square.row,
                    col: square.col,
                    tile,
                    turn: self.turn_placed(square),
                })
                .collect(),
        }
    }

    /// Rebuild a board from its JSON-friendly representation
    pub fn from_json_friendly(json: &BoardJson) -> Result<Self, BoardError> {
        let mut board = Self::new();
        for placed in &json.tiles {
            let square = Square::new(placed.row, placed.col);
            board.place(placed.tile, square, placed.turn)?;
        }
        Ok(board)
    }
}

/// JSON-friendly board representation: only the placed interior tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardJson {
    pub tiles: Vec<PlacedTileJson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTileJson {
    pub row: i32,
    pub col: i32,
    pub tile: Tile,
    #[serde(default)]
    pub turn: Option<u8>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_board_has_twelve_exits() {
        let board = Board::new();
        let exits = Board::start_squares();
        assert_eq!(exits.len(), 12);
        for square in &exits {
            let tile = board.get_tile_at(*square).unwrap();
            assert!(tile.piece.is_start());
        }
        assert_eq!(board.squares().len(), 49 + 12);
    }

    #[test]
    fn test_exits_point_inwards() {
        let board = Board::new();
        for square in Board::start_squares() {
            let tile = board.get_tile_at(square).unwrap();
            let inward: Vec<Side> = tile.route_sides().map(|(side, _)| side).collect();
            assert_eq!(inward.len(), 1);
            assert!(
                square.neighbor(inward[0]).is_interior(),
                "Exit at {} should face the grid",
                square
            );
        }
    }

    #[test]
    fn test_empty_interior_is_free() {
        let board = Board::new();
        assert!(Square::interior().all(|s| board.is_square_free(s)));
        assert!(!board.is_square_free(Square::new(-1, 3)));
        assert!(!board.is_square_free(Square::new(-1, 0)));
        assert!(board.get_tile_at(Square::new(-1, 0)).is_none());
    }

    #[test]
    fn test_add_and_remove_tile() {
        let mut board = Board::new();
        let square = Square::new(0, 3);
        let tile = Tile::new(Piece::RailwayStraight, Rotation::R0);
        let before = board.generation();

        board.add_tile_on_turn(tile, square, 1).unwrap();
        assert!(!board.is_square_free(square));
        assert_eq!(board.get_tile_at(square), Some(tile));
        assert_eq!(board.turn_placed(square), Some(1));
        assert!(board.generation() > before);

        let removed = board.remove_tile(square).unwrap();
        assert_eq!(removed, tile);
        assert!(board.is_square_free(square));
        assert_eq!(board.turn_placed(square), None);
    }

    #[test]
    fn test_exit_squares_are_fixed() {
        let mut board = Board::new();
        let tile = Tile::new(Piece::RailwayStraight, Rotation::R0);
        assert_eq!(
            board.add_tile(tile, Square::new(-1, 3)),
            Err(BoardError::FixedSquare {
                square: Square::new(-1, 3)
            })
        );
        assert_eq!(
            board.remove_tile(Square::new(9, 9)),
            Err(BoardError::OutOfRange {
                square: Square::new(9, 9)
            })
        );
        assert!(matches!(
            board.add_tile(Tile::new(Piece::OverpassRailway, Rotation::R0), Square::new(0, 0)),
            Err(BoardError::UnplaceablePiece { .. })
        ));
    }

    #[test]
    fn test_special_count_tracks_mutations() {
        let mut board = Board::new();
        let special = Tile::new(Piece::RailwayJunction, Rotation::R0);
        board.add_tile(special, Square::new(1, 0)).unwrap();
        board.add_tile(special, Square::new(5, 0)).unwrap();
        assert_eq!(board.special_count(), 2);
        // overwriting a special with a basic piece releases it
        board
            .add_tile(Tile::new(Piece::RailwayStraight, Rotation::R90), Square::new(5, 0))
            .unwrap();
        assert_eq!(board.special_count(), 1);
        board.remove_tile(Square::new(1, 0)).unwrap();
        assert_eq!(board.special_count(), 0);
        assert!(!board.all_specials_used());
    }

    #[test]
    fn test_adjacent_squares() {
        let board = Board::new();
        let corner = Square::new(0, 0);
        assert_eq!(board.adjacent_squares(corner, true, false).len(), 2);
        assert_eq!(
            board.adjacent_squares(corner, false, true),
            vec![Square::new(0, 1), Square::new(1, 0)]
        );

        // (0,3) borders the railway exit at (-1,3)
        let top = Square::new(0, 3);
        assert_eq!(board.adjacent_squares(top, false, false).len(), 4);
        assert_eq!(board.adjacent_squares(top, true, false).len(), 3);
        // (0,2) has nothing above it
        assert_eq!(board.adjacent_squares(Square::new(0, 2), false, false).len(), 3);
    }

    #[test]
    fn test_opposite_edge() {
        assert_eq!(
            Board::opposite_edge(Square::new(0, 0), Side::Right),
            Ok((Square::new(0, 1), Side::Left))
        );
        assert_eq!(
            Board::opposite_edge(Square::new(0, 0), Side::Top),
            Ok((Square::new(-1, 0), Side::Bottom))
        );
        assert!(Board::opposite_edge(Square::new(-1, 3), Side::Top).is_err());
    }

    #[test]
    fn test_valid_placement_needs_a_connection() {
        let board = Board::new();
        let straight = Tile::new(Piece::RailwayStraight, Rotation::R0);
        // under the railway exit at (-1, 3)
        assert!(board.is_valid_placement(&straight, Square::new(0, 3)));
        // nothing to connect to in the middle of the board
        assert!(!board.is_valid_placement(&straight, Square::new(3, 3)));
        // rotated so only blanks face the exit
        assert!(!board.is_valid_placement(&straight.rotated(), Square::new(0, 3)));
    }

    #[test]
    fn test_valid_placement_rejects_clash() {
        let mut board = Board::new();
        board
            .add_tile(Tile::new(Piece::RailwayStraight, Rotation::R0), Square::new(0, 3))
            .unwrap();
        // a highway T at (1,3) would put highway against the railway above it
        let highway_t = Tile::new(Piece::HighwayT, Rotation::R0);
        assert!(!board.is_valid_placement(&highway_t, Square::new(1, 3)));
        let railway_t = Tile::new(Piece::RailwayT, Rotation::R0);
        assert!(board.is_valid_placement(&railway_t, Square::new(1, 3)));
        // occupied squares are never valid
        assert!(!board.is_valid_placement(&railway_t, Square::new(0, 3)));
    }

    #[test]
    fn test_json_friendly_round_trip() {
        let board = Board::rulebook_example();
        let json = board.to_json_friendly();
        assert_eq!(json.tiles.len(), 26);

        let text = serde_json::to_string(&json).unwrap();
        let parsed: BoardJson = serde_json::from_str(&text).unwrap();
        let rebuilt = Board::from_json_friendly(&parsed).unwrap();
        assert_eq!(rebuilt.placed_tiles(), board.placed_tiles());
        assert_eq!(rebuilt.turn_placed(Square::new(1, 4)), Some(6));
    }

    #[test]
    fn test_rulebook_example_specials() {
        let board = Board::rulebook_example();
        // three-R junction and highway junction
        assert_eq!(board.special_count(), 2);
    }
}
