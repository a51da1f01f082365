//! Connected clusters of track (and of empty space) as a disjoint-set forest.
//!
//! A `ClusterForest` is a disposable snapshot of one board: it is rebuilt from
//! scratch whenever connectivity is needed and never updated in place after a
//! board mutation. Nodes live in an arena and point at their parent by index.
//!
//! Every square gets one node, except an overpass square which gets two: one
//! for its railway layer and one for its highway layer, so the two crossing
//! routes never join each other.
//!
//! The data kept on a node (frontier, members, counts) is only meaningful on
//! a representative; merged-away nodes keep stale copies that are never read.

use crate::board::{Board, BoardError};
use crate::geometry::{Side, Square};
use crate::tile::{EdgeType, Tile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// An open connection point: a route on `side` of the tile at `square` that
/// still faces an empty square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterEdge {
    pub square: Square,
    pub side: Side,
    pub edge_type: EdgeType,
}

impl ClusterEdge {
    pub const fn new(square: Square, side: Side, edge_type: EdgeType) -> Self {
        Self {
            square,
            side,
            edge_type,
        }
    }

    /// The empty square this edge points at
    pub fn target(&self) -> Square {
        self.square.neighbor(self.side)
    }
}

/// Index of a node in the forest's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// One node of the disjoint-set forest
#[derive(Debug, Clone)]
pub struct Cluster {
    parent: NodeId,
    rank: u32,
    /// The square and tile (or overpass layer) this node was seeded from
    origin: (Square, Tile),
    is_blank: bool,
    frontier: Vec<ClusterEdge>,
    members: Vec<(Square, Tile)>,
    start_count: u32,
    overpass_count: u32,
}

impl Cluster {
    fn seed(id: NodeId, square: Square, tile: Tile, board: &Board) -> Self {
        let frontier = if tile.is_blank() {
            Vec::new()
        } else {
            tile.route_sides()
                .filter(|(side, _)| board.is_valid_square(square.neighbor(*side)))
                .map(|(side, edge_type)| ClusterEdge::new(square, side, edge_type))
                .collect()
        };
        Self {
            parent: id,
            rank: 1,
            origin: (square, tile),
            is_blank: tile.is_blank(),
            frontier,
            members: vec![(square, tile)],
            start_count: u32::from(tile.piece.is_start()),
            overpass_count: u32::from(tile.piece.is_overpass_segment()),
        }
    }

    /// Whether this cluster is a region of empty squares
    pub fn is_blank(&self) -> bool {
        self.is_blank
    }

    /// Open connection points. For a blank cluster these are the routes of
    /// neighbouring tiles pointing into it, i.e. the places a tile can attach.
    pub fn frontier(&self) -> &[ClusterEdge] {
        &self.frontier
    }

    /// Squares and tiles merged into this cluster
    pub fn members(&self) -> &[(Square, Tile)] {
        &self.members
    }

    /// Number of exits the cluster touches
    pub fn start_count(&self) -> u32 {
        self.start_count
    }

    /// Number of overpass layers in the cluster
    pub fn overpass_count(&self) -> u32 {
        self.overpass_count
    }

    fn remove_frontier_edge(&mut self, edge: &ClusterEdge) {
        self.frontier.retain(|e| e != edge);
    }

    fn add_frontier_edge(&mut self, edge: ClusterEdge) {
        if !self.frontier.contains(&edge) {
            self.frontier.push(edge);
        }
    }
}

/// Disjoint-set forest over the logical tile layers of one board
#[derive(Debug, Clone)]
pub struct ClusterForest {
    clusters: Vec<Cluster>,
    /// Nodes seeded on each square (two for an overpass)
    layers: HashMap<Square, Vec<NodeId>>,
    /// Board generation this snapshot was built from
    generation: u64,
}

impl ClusterForest {
    /// Build and validate the cluster forest for a board.
    ///
    /// Squares are scanned in row-major order and joined with their TOP and
    /// LEFT neighbours, which visits every shared edge exactly once.
    pub fn build(board: &Board) -> Result<Self, BoardError> {
        let mut forest = Self::seed(board);
        for square in board.squares() {
            for side in [Side::Top, Side::Left] {
                let neighbour = square.neighbor(side);
                if board.is_valid_square(neighbour) {
                    forest.try_join_clusters(square, neighbour, side)?;
                }
            }
        }
        forest.compress();
        forest.validate()?;

        debug!(
            clusters = forest.representatives().len(),
            free_squares = forest.free_squares().len(),
            generation = forest.generation,
            "Rebuilt cluster forest"
        );
        Ok(forest)
    }

    /// Create one singleton cluster per tile layer without joining anything
    pub fn seed(board: &Board) -> Self {
        let mut forest = Self {
            clusters: Vec::new(),
            layers: HashMap::new(),
            generation: board.generation(),
        };

        for square in board.squares() {
            let Some(tile) = board.get_tile_at(square) else {
                continue;
            };
            let seeds = match tile.overpass_layers() {
                Some(layers) => layers.to_vec(),
                None => vec![tile],
            };
            for seed in seeds {
                let id = NodeId(forest.clusters.len());
                forest.clusters.push(Cluster::seed(id, square, seed, board));
                forest.layers.entry(square).or_default().push(id);
            }
        }
        forest
    }

    // ==================== Union-Find ====================

    /// Representative of a node's set, compressing the path on the way
    pub fn find_set(&mut self, node: NodeId) -> NodeId {
        let mut root = node;
        while self.clusters[root.0].parent != root {
            root = self.clusters[root.0].parent;
        }

        let mut current = node;
        while current != root {
            let next = self.clusters[current.0].parent;
            self.clusters[current.0].parent = root;
            current = next;
        }
        root
    }

    /// Representative of a node's set without modifying the forest
    pub fn representative(&self, node: NodeId) -> NodeId {
        let mut root = node;
        while self.clusters[root.0].parent != root {
            root = self.clusters[root.0].parent;
        }
        root
    }

    /// Union by rank of two representatives; returns the survivor
    fn union(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (parent, child) = if self.clusters[a.0].rank >= self.clusters[b.0].rank {
            (a, b)
        } else {
            (b, a)
        };
        if self.clusters[parent.0].rank == self.clusters[child.0].rank {
            self.clusters[parent.0].rank += 1;
        }

        let merged = &mut self.clusters[child.0];
        merged.parent = parent;
        let frontier = std::mem::take(&mut merged.frontier);
        let members = std::mem::take(&mut merged.members);
        let start_count = merged.start_count;
        let overpass_count = merged.overpass_count;

        let survivor = &mut self.clusters[parent.0];
        for edge in frontier {
            survivor.add_frontier_edge(edge);
        }
        survivor.members.extend(members);
        survivor.start_count += start_count;
        survivor.overpass_count += overpass_count;
        parent
    }

    /// Join the clusters either side of the edge between `a` and `b`, where
    /// `side` is the side of `a` facing `b`.
    ///
    /// - blank meets blank: the empty regions merge
    /// - blank meets a route: the route becomes a placement point of the blank region
    /// - route meets the same route: both open edges close and the clusters merge
    /// - railway meets highway: the board is invalid
    /// - route meets a placed tile's blank side: the route is a dead end and
    ///   leaves the frontier
    pub fn try_join_clusters(&mut self, a: Square, b: Square, side: Side) -> Result<(), BoardError> {
        let (Some(node_a), Some(node_b)) = (self.node_at(a, side), self.node_at(b, side.opposite()))
        else {
            return Ok(());
        };
        let edge_a = ClusterEdge::new(a, side, self.clusters[node_a.0].origin.1.edge(side));
        let edge_b = ClusterEdge::new(
            b,
            side.opposite(),
            self.clusters[node_b.0].origin.1.edge(side.opposite()),
        );

        let rep_a = self.find_set(node_a);
        let rep_b = self.find_set(node_b);
        let blank_a = self.clusters[rep_a.0].is_blank;
        let blank_b = self.clusters[rep_b.0].is_blank;

        match (blank_a, blank_b) {
            (true, true) => {
                if rep_a != rep_b {
                    self.union(rep_a, rep_b);
                }
            }
            (true, false) => {
                if !edge_b.edge_type.is_blank() {
                    self.clusters[rep_a.0].add_frontier_edge(edge_b);
                }
            }
            (false, true) => {
                if !edge_a.edge_type.is_blank() {
                    self.clusters[rep_b.0].add_frontier_edge(edge_a);
                }
            }
            (false, false) => {
                let (type_a, type_b) = (edge_a.edge_type, edge_b.edge_type);
                if type_a.clashes_with(type_b) {
                    return Err(BoardError::EdgeClash {
                        square: a,
                        side,
                        neighbour: b,
                    });
                }
                if type_a == type_b && !type_a.is_blank() {
                    self.clusters[rep_a.0].remove_frontier_edge(&edge_a);
                    self.clusters[rep_b.0].remove_frontier_edge(&edge_b);
                    if rep_a != rep_b {
                        self.union(rep_a, rep_b);
                    }
                } else if !type_a.is_blank() {
                    self.clusters[rep_a.0].remove_frontier_edge(&edge_a);
                } else if !type_b.is_blank() {
                    self.clusters[rep_b.0].remove_frontier_edge(&edge_b);
                }
            }
        }
        Ok(())
    }

    /// Point every node straight at its representative
    fn compress(&mut self) {
        for index in 0..self.clusters.len() {
            self.find_set(NodeId(index));
        }
    }

    /// Every route cluster must reach an exit or contain an overpass layer
    fn validate(&self) -> Result<(), BoardError> {
        for id in self.representatives() {
            let cluster = &self.clusters[id.0];
            if cluster.is_blank || cluster.start_count > 0 || cluster.overpass_count > 0 {
                continue;
            }
            let square = cluster.members.first().map(|(s, _)| *s).unwrap_or(cluster.origin.0);
            return Err(BoardError::DisconnectedCluster { square });
        }
        Ok(())
    }

    // ==================== Query Methods ====================

    /// All nodes seeded on a square
    pub fn nodes_at(&self, square: Square) -> &[NodeId] {
        self.layers.get(&square).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The node owning `side` of `square`; for an overpass this is the layer
    /// whose route runs across that side.
    pub fn node_at(&self, square: Square, side: Side) -> Option<NodeId> {
        match self.nodes_at(square) {
            [] => None,
            [only] => Some(*only),
            layers => layers
                .iter()
                .copied()
                .find(|id| !self.clusters[id.0].origin.1.edge(side).is_blank()),
        }
    }

    /// Data of the set containing `node`
    pub fn cluster(&self, node: NodeId) -> &Cluster {
        &self.clusters[self.representative(node).0]
    }

    /// Whether two nodes are in the same set
    pub fn same_cluster(&self, a: NodeId, b: NodeId) -> bool {
        self.representative(a) == self.representative(b)
    }

    /// Representatives in seeding (row-major) order
    pub fn representatives(&self) -> Vec<NodeId> {
        (0..self.clusters.len())
            .map(NodeId)
            .filter(|id| self.clusters[id.0].parent == *id)
            .collect()
    }

    /// Representatives of route clusters
    pub fn route_clusters(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.representatives()
            .into_iter()
            .map(|id| &self.clusters[id.0])
            .filter(|c| !c.is_blank)
    }

    /// Empty squares a tile could eventually reach: members of blank clusters
    /// with at least one placement point. Enclosed empty regions are excluded.
    pub fn free_squares(&self) -> BTreeSet<Square> {
        self.representatives()
            .into_iter()
            .map(|id| &self.clusters[id.0])
            .filter(|c| c.is_blank && !c.frontier.is_empty())
            .flat_map(|c| c.members.iter().map(|(square, _)| *square))
            .collect()
    }

    /// Placement points: routes of placed tiles pointing at empty squares
    pub fn placement_frontier(&self) -> BTreeSet<ClusterEdge> {
        self.representatives()
            .into_iter()
            .map(|id| &self.clusters[id.0])
            .filter(|c| c.is_blank)
            .flat_map(|c| c.frontier.iter().copied())
            .collect()
    }

    /// Open ends of route clusters, for building exit-joining and clash constraints
    pub fn cluster_ends(&self) -> BTreeSet<ClusterEdge> {
        self.route_clusters()
            .flat_map(|c| c.frontier.iter().copied())
            .collect()
    }

    /// Whether this snapshot still describes the board
    pub fn is_current(&self, board: &Board) -> bool {
        self.generation == board.generation()
    }
}
