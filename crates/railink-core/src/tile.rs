//! Tiles and the piece catalog.
//!
//! This module contains:
//! - Edge types (railway, highway, blank) and the clash rule between them
//! - The closed set of piece kinds and their canonical edge signatures
//! - Rotations and the diagonal mirror used by the corner station
//! - `Tile`, an immutable (piece, rotation, flip) value with derived edges

use crate::geometry::{Side, Square};
use serde::{Deserialize, Serialize};

/// What runs across one side of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Railway,
    Highway,
    Blank,
}

impl EdgeType {
    /// The two edge types that carry a route
    pub const ROUTES: [EdgeType; 2] = [EdgeType::Railway, EdgeType::Highway];

    pub fn is_blank(self) -> bool {
        self == EdgeType::Blank
    }

    /// The route type that clashes with this one, `None` for blank edges
    pub fn clash_type(self) -> Option<EdgeType> {
        match self {
            EdgeType::Railway => Some(EdgeType::Highway),
            EdgeType::Highway => Some(EdgeType::Railway),
            EdgeType::Blank => None,
        }
    }

    /// Whether two edges meeting across a square boundary are illegal together
    pub fn clashes_with(self, other: EdgeType) -> bool {
        self.clash_type() == Some(other)
    }
}

/// Every kind of piece the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Piece {
    // Basic pieces
    RailwayCorner,
    RailwayT,
    RailwayStraight,
    HighwayCorner,
    HighwayT,
    HighwayStraight,
    // Junction pieces
    Overpass,
    StraightStation,
    CornerStation,
    // Special pieces
    ThreeHJunction,
    ThreeRJunction,
    HighwayJunction,
    RailwayJunction,
    CornerJunction,
    CrossJunction,
    // Fixed pieces on the board's exits
    StartRailway,
    StartHighway,
    /// An empty square
    Blank,
    /// Railway layer of an overpass, only used while building clusters
    OverpassRailway,
    /// Highway layer of an overpass, only used while building clusters
    OverpassHighway,
}

impl Piece {
    /// Pieces on the three basic dice
    pub const BASIC: [Piece; 6] = [
        Piece::RailwayCorner,
        Piece::RailwayT,
        Piece::RailwayStraight,
        Piece::HighwayCorner,
        Piece::HighwayT,
        Piece::HighwayStraight,
    ];

    /// Pieces on the junction die
    pub const JUNCTION: [Piece; 3] = [
        Piece::Overpass,
        Piece::StraightStation,
        Piece::CornerStation,
    ];

    /// Special pieces a player may add, at most one per turn
    pub const SPECIAL: [Piece; 6] = [
        Piece::ThreeHJunction,
        Piece::ThreeRJunction,
        Piece::HighwayJunction,
        Piece::RailwayJunction,
        Piece::CornerJunction,
        Piece::CrossJunction,
    ];

    /// Pieces fixed around the board's edge
    pub const START: [Piece; 2] = [Piece::StartRailway, Piece::StartHighway];

    /// Canonical edge signature (TOP, RIGHT, BOTTOM, LEFT) at rotation zero
    pub const fn base_edges(self) -> [EdgeType; 4] {
        use EdgeType::{Blank as B, Highway as H, Railway as R};
        match self {
            Piece::RailwayCorner => [R, B, B, R],
            Piece::RailwayT => [R, R, B, R],
            Piece::RailwayStraight => [R, B, R, B],
            Piece::HighwayCorner => [H, B, B, H],
            Piece::HighwayT => [H, H, B, H],
            Piece::HighwayStraight => [H, B, H, B],
            Piece::Overpass => [H, R, H, R],
            Piece::StraightStation => [R, B, H, B],
            Piece::CornerStation => [R, B, B, H],
            Piece::ThreeHJunction => [H, H, R, H],
            Piece::ThreeRJunction => [H, R, R, R],
            Piece::HighwayJunction => [H, H, H, H],
            Piece::RailwayJunction => [R, R, R, R],
            Piece::CornerJunction => [H, R, R, H],
            Piece::CrossJunction => [H, R, H, R],
            Piece::StartRailway => [R, B, B, B],
            Piece::StartHighway => [H, B, B, B],
            Piece::Blank => [B, B, B, B],
            Piece::OverpassRailway => [B, R, B, R],
            Piece::OverpassHighway => [H, B, H, B],
        }
    }

    /// Number of distinct rotations, and whether a mirrored set also exists
    pub const fn variation_count(self) -> (u8, bool) {
        match self {
            Piece::RailwayStraight
            | Piece::HighwayStraight
            | Piece::Overpass
            | Piece::CrossJunction
            | Piece::OverpassRailway
            | Piece::OverpassHighway => (2, false),
            Piece::HighwayJunction | Piece::RailwayJunction | Piece::Blank => (1, false),
            Piece::CornerStation => (4, true),
            _ => (4, false),
        }
    }

    pub fn is_special(self) -> bool {
        Piece::SPECIAL.contains(&self)
    }

    pub fn is_start(self) -> bool {
        Piece::START.contains(&self)
    }

    /// Whether this is one of the two synthetic overpass layers
    pub fn is_overpass_segment(self) -> bool {
        matches!(self, Piece::OverpassRailway | Piece::OverpassHighway)
    }

    /// Whether a player can be handed this piece (dice or special)
    pub fn is_playable(self) -> bool {
        Piece::BASIC.contains(&self) || Piece::JUNCTION.contains(&self) || self.is_special()
    }
}

/// Clockwise rotation of a tile
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Number of clockwise quarter turns
    pub const fn steps(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    /// Rotation after `steps` quarter turns (taken modulo 4)
    pub const fn from_steps(steps: usize) -> Rotation {
        Rotation::ALL[steps % 4]
    }

    /// This rotation followed by another quarter turn clockwise
    pub const fn turned(self) -> Rotation {
        Rotation::from_steps(self.steps() + 1)
    }
}

/// A piece in a fixed orientation. Does not know where it sits on the board.
///
/// Equality and hashing are structural over (piece, rotation, flipped); the
/// edge signature is derived from those on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub piece: Piece,
    pub rotation: Rotation,
    /// Mirrored along the top-left to bottom-right diagonal before rotating
    #[serde(default)]
    pub flipped: bool,
}

impl Tile {
    /// Create an unmirrored tile
    pub const fn new(piece: Piece, rotation: Rotation) -> Self {
        Self {
            piece,
            rotation,
            flipped: false,
        }
    }

    /// Create a mirrored tile
    pub const fn mirrored(piece: Piece, rotation: Rotation) -> Self {
        Self {
            piece,
            rotation,
            flipped: true,
        }
    }

    /// The empty-square marker
    pub const fn blank() -> Self {
        Self::new(Piece::Blank, Rotation::R0)
    }

    /// Edge type on one side: flip first, then rotate clockwise
    pub fn edge(&self, side: Side) -> EdgeType {
        let base = self.piece.base_edges();
        let unrotated = (side.index() + 4 - self.rotation.steps()) % 4;
        let source = if self.flipped { 3 - unrotated } else { unrotated };
        base[source]
    }

    /// Full edge signature (TOP, RIGHT, BOTTOM, LEFT)
    pub fn edges(&self) -> [EdgeType; 4] {
        Side::ALL.map(|side| self.edge(side))
    }

    /// Sides carrying a railway or highway
    pub fn route_sides(&self) -> impl Iterator<Item = (Side, EdgeType)> + '_ {
        Side::ALL
            .into_iter()
            .map(|side| (side, self.edge(side)))
            .filter(|(_, edge)| !edge.is_blank())
    }

    /// Whether any side carries the given edge type
    pub fn has_edge_type(&self, edge_type: EdgeType) -> bool {
        Side::ALL.iter().any(|&side| self.edge(side) == edge_type)
    }

    pub fn is_blank(&self) -> bool {
        self.piece == Piece::Blank
    }

    pub fn is_overpass(&self) -> bool {
        self.piece == Piece::Overpass
    }

    /// The same tile turned one more quarter clockwise
    pub fn rotated(&self) -> Tile {
        Tile {
            rotation: self.rotation.turned(),
            ..*self
        }
    }

    /// For an overpass, its railway and highway layers in the same orientation
    pub fn overpass_layers(&self) -> Option<[Tile; 2]> {
        if !self.is_overpass() {
            return None;
        }
        Some([
            Tile::new(Piece::OverpassRailway, self.rotation),
            Tile::new(Piece::OverpassHighway, self.rotation),
        ])
    }

    /// Every orientation a piece can be placed in
    pub fn all_variations(piece: Piece) -> Vec<Tile> {
        let (rotations, mirrored) = piece.variation_count();
        let mut variations: Vec<Tile> = (0..rotations as usize)
            .map(|steps| Tile::new(piece, Rotation::from_steps(steps)))
            .collect();
        if mirrored {
            variations.extend(
                (0..rotations as usize).map(|steps| Tile::mirrored(piece, Rotation::from_steps(steps))),
            );
        }
        variations
    }

    /// Route sides that point at another interior square if placed at `square`.
    ///
    /// Each one is a potential scoring error, so the sum over a board bounds
    /// its error count from above. Scoring itself counts errors from the
    /// board's edge scan; this per-tile bound is for external optimisers that
    /// build error constraints tile by tile.
    pub fn loose_ends(&self, square: Square) -> u32 {
        self.route_sides()
            .filter(|(side, _)| square.neighbor(*side).is_interior())
            .count() as u32
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::blank()
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}/{:?}", self.piece, self.rotation)?;
        if self.flipped {
            write!(f, "/flipped")?;
        }
        Ok(())
    }
}
