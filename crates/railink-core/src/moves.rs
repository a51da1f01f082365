//! Enumeration of every maximal way to play a set of pieces.
//!
//! The search is a depth-first backtrack over a working copy of the board.
//! Each state is identified by the *set* of placements made so far
//! (`MoveSetKey`), so the same combination reached in a different order is
//! explored only once. Results are recorded only at leaves, where none of the
//! remaining pieces can be attached anywhere.

use crate::board::{Board, BoardError};
use crate::cluster::ClusterEdge;
use crate::geometry::Square;
use crate::tile::{Piece, Tile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// A multiset of pieces available to play
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCounts {
    counts: BTreeMap<Piece, u8>,
}

impl PieceCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, piece: Piece) {
        *self.counts.entry(piece).or_insert(0) += 1;
    }

    pub fn count(&self, piece: Piece) -> u8 {
        self.counts.get(&piece).copied().unwrap_or(0)
    }

    /// Remove one copy of `piece`; returns false if none was left
    pub fn take(&mut self, piece: Piece) -> bool {
        match self.counts.get_mut(&piece) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(&piece);
                }
                true
            }
            _ => false,
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.values().map(|c| u32::from(*c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Pieces with a non-zero count, in catalog order
    pub fn pieces(&self) -> impl Iterator<Item = (Piece, u8)> + '_ {
        self.counts.iter().map(|(piece, count)| (*piece, *count))
    }
}

impl FromIterator<Piece> for PieceCounts {
    fn from_iter<I: IntoIterator<Item = Piece>>(iter: I) -> Self {
        let mut counts = Self::new();
        for piece in iter {
            counts.add(piece);
        }
        counts
    }
}

/// One tile put down on one square
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub square: Square,
    pub tile: Tile,
}

impl Placement {
    pub const fn new(square: Square, tile: Tile) -> Self {
        Self { square, tile }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.tile, self.square)
    }
}

/// Order-independent identity of a set of placements
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveSetKey(Vec<Placement>);

impl MoveSetKey {
    pub fn new(placements: &[Placement]) -> Self {
        let mut sorted = placements.to_vec();
        sorted.sort();
        Self(sorted)
    }

    /// The placements in canonical (sorted) order
    pub fn placements(&self) -> &[Placement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every placement here also appears in `other` and `other` has more
    pub fn is_strict_subset_of(&self, other: &MoveSetKey) -> bool {
        self.len() < other.len() && self.0.iter().all(|p| other.0.binary_search(p).is_ok())
    }
}

/// Bounds on how much work one enumeration may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Search states (distinct placement sets) to expand before giving up
    pub max_states: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_states: 200_000,
        }
    }
}

/// Result of an enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    /// Maximal placement sequences, each in a playable order, sorted by
    /// their canonical key
    pub sequences: Vec<Vec<Placement>>,
    /// Distinct states expanded
    pub states_visited: usize,
    /// The search hit `SearchLimits::max_states` and the list may be incomplete
    pub truncated: bool,
}

/// Every maximal, non-dominated way to attach `pieces` to `board`.
///
/// Fails only if the board itself is invalid. With no pieces, or no piece
/// that fits anywhere, the single result is the empty sequence.
pub fn enumerate_maximal_placements(
    board: &Board,
    pieces: &PieceCounts,
    limits: SearchLimits,
) -> Result<Enumeration, BoardError> {
    let forest = board.clusters()?;
    let mut search = Search {
        board: board.clone(),
        pieces: pieces.clone(),
        frontier: forest.placement_frontier(),
        moves: Vec::new(),
        visited: HashSet::new(),
        results: BTreeMap::new(),
        limits,
        truncated: false,
    };
    search.expand();

    if search.truncated {
        warn!(
            max_states = limits.max_states,
            results = search.results.len(),
            "Placement search budget exhausted, results are partial"
        );
    }

    let keys: Vec<&MoveSetKey> = search.results.keys().collect();
    let sequences: Vec<Vec<Placement>> = search
        .results
        .iter()
        .filter(|(key, _)| !keys.iter().any(|other| key.is_strict_subset_of(other)))
        .map(|(_, sequence)| sequence.clone())
        .collect();

    debug!(
        pieces = pieces.total(),
        states = search.visited.len(),
        sequences = sequences.len(),
        "Enumerated maximal placements"
    );
    Ok(Enumeration {
        sequences,
        states_visited: search.visited.len(),
        truncated: search.truncated,
    })
}

/// Shared mutable search state; every change made while descending is undone
/// before returning.
struct Search {
    board: Board,
    pieces: PieceCounts,
    frontier: BTreeSet<ClusterEdge>,
    moves: Vec<Placement>,
    visited: HashSet<MoveSetKey>,
    /// First playable order found for each maximal set
    results: BTreeMap<MoveSetKey, Vec<Placement>>,
    limits: SearchLimits,
    truncated: bool,
}

impl Search {
    fn expand(&mut self) {
        let key = MoveSetKey::new(&self.moves);
        if self.truncated || self.visited.contains(&key) {
            return;
        }
        // only unseen states count against the budget
        if self.visited.len() >= self.limits.max_states {
            self.truncated = true;
            return;
        }
        self.visited.insert(key);

        let mut extended = false;
        let available: Vec<Piece> = self.pieces.pieces().map(|(piece, _)| piece).collect();
        let edges: Vec<ClusterEdge> = self.frontier.iter().copied().collect();

        for piece in available {
            for edge in &edges {
                let target = edge.target();
                if !self.board.is_square_free(target) {
                    continue;
                }
                for tile in Tile::all_variations(piece) {
                    if tile.edge(edge.side.opposite()) != edge.edge_type {
                        continue;
                    }
                    if !self.board.is_valid_placement(&tile, target) {
                        continue;
                    }
                    extended = true;
                    self.descend(piece, Placement::new(target, tile));
                }
            }
        }

        if !extended {
            let key = MoveSetKey::new(&self.moves);
            self.results.entry(key).or_insert_with(|| self.moves.clone());
        }
    }

    fn descend(&mut self, piece: Piece, placement: Placement) {
        let Placement { square, tile } = placement;
        if !self.pieces.take(piece) {
            return;
        }
        if self.board.add_tile(tile, square).is_err() {
            self.pieces.add(piece);
            return;
        }

        // every placement point on this square is used up
        let consumed: Vec<ClusterEdge> = self
            .frontier
            .iter()
            .filter(|e| e.target() == square)
            .copied()
            .collect();
        for edge in &consumed {
            self.frontier.remove(edge);
        }

        // routes pointing at empty squares become new placement points
        let mut opened = Vec::new();
        for (side, edge_type) in tile.route_sides() {
            if self.board.is_square_free(square.neighbor(side)) {
                let edge = ClusterEdge::new(square, side, edge_type);
                if self.frontier.insert(edge) {
                    opened.push(edge);
                }
            }
        }

        self.moves.push(placement);
        self.expand();
        self.moves.pop();

        for edge in opened {
            self.frontier.remove(&edge);
        }
        self.frontier.extend(consumed);
        if let Err(error) = self.board.remove_tile(square) {
            warn!(%error, %square, "Failed to undo a search placement");
        }
        self.pieces.add(piece);
    }
}
