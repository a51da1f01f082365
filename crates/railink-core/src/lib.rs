//! Railink - rules engine for a Railroad Ink style tile-laying game
//!
//! This crate provides the rules authority for the game, including:
//! - Square geometry and the tile catalog with rotations and mirroring
//! - The board: a 7x7 grid ringed by twelve fixed exits
//! - Connectivity as a disjoint-set forest of track clusters
//! - Enumeration of every maximal way to play a set of pieces
//! - Scoring: exits joined, longest routes, centre squares and errors
//!
//! # Architecture
//!
//! The engine is platform-agnostic. It can be compiled to:
//! - Native Rust for simulators and external optimisers
//! - WebAssembly for validating and scoring boards in the browser
//!
//! Connectivity is never cached on the board: every query that needs it
//! builds a fresh [`ClusterForest`] from the current contents.
//!
//! # Modules
//!
//! - [`geometry`]: Squares and sides
//! - [`tile`]: Edge types, pieces and oriented tiles
//! - [`board`]: Board contents, adjacency and the legal-placement predicate
//! - [`cluster`]: Union-find over tile layers, frontier and free squares
//! - [`moves`]: Maximal placement enumeration
//! - [`score`]: Final scoring
//! - [`dice`]: Dice rolls and their distribution
//! - [`game`]: Turn validation over a whole game
//! - [`bot`]: Automatic players

pub mod board;
pub mod bot;
pub mod cluster;
pub mod dice;
pub mod game;
pub mod geometry;
pub mod moves;
pub mod score;
pub mod tile;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use board::{Board, BoardError, BoardJson, PlacedTileJson, NUM_SPECIALS, START_POSITIONS};
pub use bot::{Bot, BotStrategy};
pub use cluster::{Cluster, ClusterEdge, ClusterForest, NodeId};
pub use dice::{DiceRoll, DiceRollSimulator};
pub use game::{Game, GameError, TURNS};
pub use geometry::{Side, Square, NUM_COLS, NUM_ROWS, NUM_STARTS};
pub use moves::{
    enumerate_maximal_placements, Enumeration, MoveSetKey, PieceCounts, Placement, SearchLimits,
};
pub use score::{score, ScoreBreakdown, MAX_EXIT_POINTS};
pub use tile::{EdgeType, Piece, Rotation, Tile};
