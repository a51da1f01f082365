//! End-of-game scoring.
//!
//! A board scores:
//! - 1 point per tile in the 3x3 centre region
//! - 4 points for every exit a route network joins beyond its first, plus one
//!   bonus point when all twelve exits are joined
//! - the length of the longest railway and of the longest highway, counted in
//!   squares
//! - minus 1 for every interior edge where a route runs into a blank side

use crate::board::{Board, BoardError};
use crate::geometry::{Side, Square, NUM_STARTS};
use crate::tile::EdgeType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Points for each exit joined to a network beyond the first
pub const POINTS_PER_JOINED_EXIT: u32 = 4;

/// Exit points of a board joining every exit into one network
pub const MAX_EXIT_POINTS: u32 = POINTS_PER_JOINED_EXIT * (NUM_STARTS as u32 - 1);

/// Every component of a board's score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: i32,
    pub exit_points: u32,
    /// 1 when `exit_points` reaches `MAX_EXIT_POINTS`
    pub bonus_point: u32,
    pub longest_railway: u32,
    pub longest_highway: u32,
    pub centre_points: u32,
    pub errors: u32,
}

impl ScoreBreakdown {
    fn with_total(mut self) -> Self {
        let gained = self.exit_points
            + self.bonus_point
            + self.longest_railway
            + self.longest_highway
            + self.centre_points;
        self.total = gained as i32 - self.errors as i32;
        self
    }
}

impl std::fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (exits {}+{}, railway {}, highway {}, centre {}, errors -{})",
            self.total,
            self.exit_points,
            self.bonus_point,
            self.longest_railway,
            self.longest_highway,
            self.centre_points,
            self.errors
        )
    }
}

/// Undirected graph of interior squares joined by one route type
type RouteGraph = BTreeMap<Square, Vec<Square>>;

/// Score a board. Fails if the board is not a legal position.
pub fn score(board: &Board) -> Result<ScoreBreakdown, BoardError> {
    let forest = board.clusters()?;

    let exit_points: u32 = forest
        .route_clusters()
        .map(|c| POINTS_PER_JOINED_EXIT * c.start_count().saturating_sub(1))
        .sum();
    let bonus_point = u32::from(exit_points >= MAX_EXIT_POINTS);

    let centre_points = board
        .placed_tiles()
        .iter()
        .filter(|(square, _)| square.is_centre())
        .count() as u32;

    let scan = scan_interior_edges(board)?;
    let breakdown = ScoreBreakdown {
        total: 0,
        exit_points,
        bonus_point,
        longest_railway: longest_path(&scan.railway),
        longest_highway: longest_path(&scan.highway),
        centre_points,
        errors: scan.errors,
    }
    .with_total();

    debug!(%breakdown, "Scored board");
    Ok(breakdown)
}

/// Route graphs and error count from one pass over the interior edges
struct EdgeScan {
    railway: RouteGraph,
    highway: RouteGraph,
    errors: u32,
}

/// Visit every edge between two interior squares once, row-major, looking
/// right and down from each square.
fn scan_interior_edges(board: &Board) -> Result<EdgeScan, BoardError> {
    let mut scan = EdgeScan {
        railway: RouteGraph::new(),
        highway: RouteGraph::new(),
        errors: 0,
    };

    for (square, tile) in board.placed_tiles() {
        for edge_type in EdgeType::ROUTES {
            if tile.has_edge_type(edge_type) {
                scan.graph_mut(edge_type).entry(square).or_default();
            }
        }
    }

    for square in Square::interior() {
        let Some(here) = board.get_tile_at(square) else {
            continue;
        };
        for side in [Side::Right, Side::Bottom] {
            let neighbour = square.neighbor(side);
            if !neighbour.is_interior() {
                continue;
            }
            let Some(there) = board.get_tile_at(neighbour) else {
                continue;
            };
            let (a, b) = (here.edge(side), there.edge(side.opposite()));
            if a.clashes_with(b) {
                return Err(BoardError::EdgeClash {
                    square,
                    side,
                    neighbour,
                });
            }
            if a == b && !a.is_blank() {
                let graph = scan.graph_mut(a);
                graph.entry(square).or_default().push(neighbour);
                graph.entry(neighbour).or_default().push(square);
            } else if a.is_blank() != b.is_blank() {
                scan.errors += 1;
            }
        }
    }
    Ok(scan)
}

impl EdgeScan {
    fn graph_mut(&mut self, edge_type: EdgeType) -> &mut RouteGraph {
        match edge_type {
            EdgeType::Highway => &mut self.highway,
            _ => &mut self.railway,
        }
    }
}

/// Longest simple path in squares, trying every start square
fn longest_path(graph: &RouteGraph) -> u32 {
    let mut best = 0;
    for start in graph.keys() {
        let mut visited = HashSet::new();
        best = best.max(dfs_path_length(graph, *start, &mut visited));
    }
    best
}

fn dfs_path_length(graph: &RouteGraph, current: Square, visited: &mut HashSet<Square>) -> u32 {
    if visited.contains(&current) {
        return 0;
    }
    visited.insert(current);

    let mut max_continuation = 0;
    for next in graph.get(&current).into_iter().flatten() {
        if !visited.contains(next) {
            let continuation = dfs_path_length(graph, *next, visited);
            max_continuation = max_continuation.max(continuation);
        }
    }

    visited.remove(&current);
    1 + max_continuation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Piece, Rotation, Tile};
    use pretty_assertions::assert_eq;

    fn board_with(tiles: &[(i32, i32, Tile)]) -> Board {
        let mut board = Board::new();
        for (row, col, tile) in tiles {
            board.add_tile(*tile, Square::new(*row, *col)).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_scores_nothing() {
        assert_eq!(score(&Board::new()).unwrap(), ScoreBreakdown::default());
    }

    #[test]
    fn test_five_segment_railway_between_two_exits() {
        // west exit (1,-1) along row 1, up through (0,3) to the north exit (-1,3)
        let board = board_with(&[
            (1, 0, Tile::new(Piece::RailwayStraight, Rotation::R90)),
            (1, 1, Tile::new(Piece::RailwayStraight, Rotation::R90)),
            (1, 2, Tile::new(Piece::RailwayStraight, Rotation::R90)),
            (1, 3, Tile::new(Piece::RailwayCorner, Rotation::R0)),
            (0, 3, Tile::new(Piece::RailwayStraight, Rotation::R0)),
        ]);
        let result = score(&board).unwrap();
        assert_eq!(
            result,
            ScoreBreakdown {
                total: 9,
                exit_points: 4,
                bonus_point: 0,
                longest_railway: 5,
                longest_highway: 0,
                centre_points: 0,
                errors: 0,
            }
        );
    }

    #[test]
    fn test_clash_is_never_scored() {
        let board = board_with(&[
            (0, 3, Tile::new(Piece::RailwayStraight, Rotation::R0)),
            (1, 3, Tile::new(Piece::HighwayStraight, Rotation::R0)),
        ]);
        assert!(matches!(score(&board), Err(BoardError::EdgeClash { .. })));
    }

    #[test]
    fn test_loop_terminates() {
        // four railway tiles closing a 2x2 loop under the north exit
        let board = board_with(&[
            (0, 2, Tile::new(Piece::RailwayCorner, Rotation::R180)),
            (0, 3, Tile::new(Piece::RailwayT, Rotation::R270)),
            (1, 2, Tile::new(Piece::RailwayCorner, Rotation::R90)),
            (1, 3, Tile::new(Piece::RailwayCorner, Rotation::R0)),
        ]);
        let result = score(&board).unwrap();
        assert_eq!(result.longest_railway, 4);
        assert_eq!(result.errors, 0);
        assert_eq!(result.exit_points, 0);
        assert_eq!(result.total, 4);
    }

    #[test]
    fn test_open_end_into_empty_square_is_an_error() {
        let board = board_with(&[(0, 3, Tile::new(Piece::RailwayStraight, Rotation::R0))]);
        let result = score(&board).unwrap();
        assert_eq!(result.errors, 1);
        assert_eq!(result.longest_railway, 1);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_error_counting() {
        let board = board_with(&[
            // railway from the north exit turning left at (1,3)
            (0, 3, Tile::new(Piece::RailwayStraight, Rotation::R0)),
            (1, 3, Tile::new(Piece::RailwayCorner, Rotation::R0)),
            // highway from the exit at (-1,1) turning right, then down at (1,2)
            (0, 1, Tile::new(Piece::HighwayStraight, Rotation::R0)),
            (1, 1, Tile::new(Piece::HighwayCorner, Rotation::R90)),
            (1, 2, Tile::new(Piece::HighwayCorner, Rotation::R270)),
        ]);
        let result = score(&board).unwrap();
        // the railway meets the blank right side of (1,2), and the highway
        // runs off into the empty (2,2)
        assert_eq!(result.errors, 2);
        assert_eq!(result.longest_railway, 2);
        assert_eq!(result.longest_highway, 3);
        assert_eq!(result.exit_points, 0);
        assert_eq!(result.total, 3);
    }

    #[test]
    fn test_centre_points() {
        let mut board = Board::new();
        for row in 0..7 {
            board
                .add_tile(Tile::new(Piece::RailwayStraight, Rotation::R0), Square::new(row, 3))
                .unwrap();
        }
        let result = score(&board).unwrap();
        assert_eq!(result.centre_points, 3);
        assert_eq!(result.exit_points, 4);
        assert_eq!(result.longest_railway, 7);
        assert_eq!(result.errors, 0);
        assert_eq!(result.total, 14);
    }

    #[test]
    fn test_rulebook_example_scores() {
        let result = score(&Board::rulebook_example()).unwrap();
        assert_eq!(
            result,
            ScoreBreakdown {
                total: 24,
                exit_points: 16,
                bonus_point: 0,
                longest_railway: 5,
                longest_highway: 7,
                centre_points: 5,
                errors: 9,
            }
        );
    }

    #[test]
    fn test_bonus_threshold() {
        assert_eq!(MAX_EXIT_POINTS, 44);
    }

    #[test]
    fn test_joining_all_exits_earns_bonus() {
        use Rotation::{R0, R180, R270, R90};
        let corner = |r| Tile::new(Piece::HighwayCorner, r);
        let straight = |r| Tile::new(Piece::HighwayStraight, r);
        let highway_exit = |r| Tile::new(Piece::HighwayT, r);
        let railway_exit = |r| Tile::new(Piece::ThreeHJunction, r);

        // a highway ring around the interior border, branching into every exit
        let board = board_with(&[
            (0, 0, corner(R180)),
            (0, 1, highway_exit(R0)),
            (0, 2, straight(R90)),
            (0, 3, railway_exit(R180)),
            (0, 4, straight(R90)),
            (0, 5, highway_exit(R0)),
            (0, 6, corner(R270)),
            (1, 0, railway_exit(R90)),
            (1, 6, railway_exit(R270)),
            (2, 0, straight(R0)),
            (2, 6, straight(R0)),
            (3, 0, highway_exit(R270)),
            (3, 6, highway_exit(R90)),
            (4, 0, straight(R0)),
            (4, 6, straight(R0)),
            (5, 0, railway_exit(R90)),
            (5, 6, railway_exit(R270)),
            (6, 0, corner(R90)),
            (6, 1, highway_exit(R180)),
            (6, 2, straight(R90)),
            (6, 3, railway_exit(R0)),
            (6, 4, straight(R90)),
            (6, 5, highway_exit(R180)),
            (6, 6, corner(R0)),
        ]);
        let forest = board.clusters().unwrap();
        assert_eq!(forest.route_clusters().count(), 1);

        let result = score(&board).unwrap();
        assert_eq!(result.exit_points, MAX_EXIT_POINTS);
        assert_eq!(result.bonus_point, 1);
        assert_eq!(result.longest_highway, 24);
        // the six railway junctions each leave a highway end facing inwards
        assert_eq!(result.errors, 6);
        assert_eq!(result.total, 64);
    }

    #[test]
    fn test_loose_ends_bound_errors() {
        let board = Board::rulebook_example();
        let bound: u32 = board
            .placed_tiles()
            .iter()
            .map(|(square, tile)| tile.loose_ends(*square))
            .sum();
        let errors = score(&board).unwrap().errors;
        assert!(errors > 0);
        assert!(errors <= bound, "{} errors above bound {}", errors, bound);
    }

    #[test]
    fn test_longest_path_counts_squares_not_edges() {
        let mut graph = RouteGraph::new();
        let a = Square::new(0, 0);
        let b = Square::new(0, 1);
        let c = Square::new(1, 1);
        graph.insert(a, vec![b]);
        graph.insert(b, vec![a, c]);
        graph.insert(c, vec![b]);
        assert_eq!(longest_path(&graph), 3);
        assert_eq!(longest_path(&RouteGraph::new()), 0);
    }
}
