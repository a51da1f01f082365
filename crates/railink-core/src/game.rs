//! A solitaire game: seven turns of placing the rolled pieces.
//!
//! `Game` owns the board and the turn counter and is the rules authority
//! for a whole turn: it checks that the placements use exactly the rolled
//! pieces (plus at most one special), that each one is legal when it is put
//! down, and that nothing rolled was skipped while it still fitted.

use crate::board::{Board, BoardError, NUM_SPECIALS};
use crate::dice::DiceRoll;
use crate::geometry::Square;
use crate::moves::Placement;
use crate::score::{score, ScoreBreakdown};
use crate::tile::{Piece, Tile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

/// Turns in a game
pub const TURNS: u8 = 7;

/// Errors that can occur when playing a turn
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Square {square} is already occupied")]
    SquareOccupied { square: Square },

    #[error("{tile} does not connect legally at {square}")]
    IllegalPlacement { square: Square, tile: Tile },

    #[error("{piece:?} was not rolled this turn")]
    PieceNotRolled { piece: Piece },

    #[error("No more special pieces may be played")]
    SpecialLimit,

    #[error("{piece:?} has already been played")]
    SpecialReused { piece: Piece },

    #[error("{piece:?} was rolled and can still be placed")]
    UnplayedPiece { piece: Piece },

    #[error("Game is over")]
    GameOver,
}

/// Game state between turns
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    /// Turns completed so far
    turn: u8,
    specials_used: BTreeSet<Piece>,
}

impl Game {
    /// Start a new game on an empty board
    pub fn new() -> Self {
        Self::from_board(Board::new(), 0)
    }

    /// Resume a game from a board after `turn` completed turns
    pub fn from_board(board: Board, turn: u8) -> Self {
        let specials_used = board
            .placed_tiles()
            .into_iter()
            .map(|(_, tile)| tile.piece)
            .filter(|piece| piece.is_special())
            .collect();
        Self {
            board,
            turn,
            specials_used,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Turns completed so far
    pub fn turn(&self) -> u8 {
        self.turn
    }

    pub fn is_finished(&self) -> bool {
        self.turn >= TURNS
    }

    pub fn specials_used(&self) -> &BTreeSet<Piece> {
        &self.specials_used
    }

    /// Specials that may still be added to a turn
    pub fn available_specials(&self) -> Vec<Piece> {
        if self.board.special_count() >= NUM_SPECIALS {
            return Vec::new();
        }
        Piece::SPECIAL
            .into_iter()
            .filter(|piece| !self.specials_used.contains(piece))
            .collect()
    }

    /// Check a turn without applying it, returning the resulting board
    pub fn validate_turn(&self, roll: &DiceRoll, placements: &[Placement]) -> Result<Board, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }

        let turn = self.turn + 1;
        let mut board = self.board.clone();
        let mut remaining = roll.pieces().clone();
        let mut special_played = false;

        for &Placement { square, tile } in placements {
            if !square.is_interior() {
                return Err(if board.is_valid_square(square) {
                    BoardError::FixedSquare { square }
                } else {
                    BoardError::OutOfRange { square }
                }
                .into());
            }
            if !board.is_square_free(square) {
                return Err(GameError::SquareOccupied { square });
            }

            let piece = tile.piece;
            if piece.is_special() {
                if special_played || board.special_count() >= NUM_SPECIALS {
                    return Err(GameError::SpecialLimit);
                }
                if self.specials_used.contains(&piece) {
                    return Err(GameError::SpecialReused { piece });
                }
                special_played = true;
            } else if !remaining.take(piece) {
                return Err(GameError::PieceNotRolled { piece });
            }

            if !board.is_valid_placement(&tile, square) {
                return Err(GameError::IllegalPlacement { square, tile });
            }
            board.add_tile_on_turn(tile, square, turn)?;
        }

        for (piece, _) in remaining.pieces() {
            if fits_anywhere(&board, piece) {
                return Err(GameError::UnplayedPiece { piece });
            }
        }

        board.clusters()?;
        Ok(board)
    }

    /// Validate and apply one turn
    pub fn play_turn(&mut self, roll: &DiceRoll, placements: &[Placement]) -> Result<(), GameError> {
        let board = self.validate_turn(roll, placements)?;
        for placement in placements {
            if placement.tile.piece.is_special() {
                self.specials_used.insert(placement.tile.piece);
            }
        }
        self.board = board;
        self.turn += 1;

        debug!(
            turn = self.turn,
            placed = placements.len(),
            specials = self.board.special_count(),
            "Turn played"
        );
        Ok(())
    }

    /// Score the board as it stands
    pub fn score(&self) -> Result<ScoreBreakdown, BoardError> {
        score(&self.board)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether any orientation of `piece` could legally go on any free square
fn fits_anywhere(board: &Board, piece: Piece) -> bool {
    let variations = Tile::all_variations(piece);
    Square::interior()
        .filter(|square| board.is_square_free(*square))
        .any(|square| variations.iter().any(|tile| board.is_valid_placement(tile, square)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::PieceCounts;
    use crate::tile::Rotation;
    use pretty_assertions::assert_eq;

    fn roll(pieces: &[Piece]) -> DiceRoll {
        DiceRoll::certain(pieces.iter().copied().collect::<PieceCounts>())
    }

    fn place(row: i32, col: i32, piece: Piece, rotation: Rotation) -> Placement {
        Placement::new(Square::new(row, col), Tile::new(piece, rotation))
    }

    #[test]
    fn test_play_turn_records_turn_number() {
        let mut game = Game::new();
        let dice = roll(&[Piece::RailwayStraight]);
        game.play_turn(&dice, &[place(0, 3, Piece::RailwayStraight, Rotation::R0)])
            .unwrap();
        assert_eq!(game.turn(), 1);
        assert_eq!(game.board().turn_placed(Square::new(0, 3)), Some(1));
    }

    #[test]
    fn test_placements_chain_within_a_turn() {
        let mut game = Game::new();
        let dice = roll(&[Piece::RailwayStraight, Piece::RailwayStraight]);
        let placements = [
            place(0, 3, Piece::RailwayStraight, Rotation::R0),
            place(1, 3, Piece::RailwayStraight, Rotation::R0),
        ];
        game.play_turn(&dice, &placements).unwrap();

        // the same tiles in the other order are not legal
        let mut game = Game::new();
        let reversed = [placements[1], placements[0]];
        assert_eq!(
            game.play_turn(&dice, &reversed),
            Err(GameError::IllegalPlacement {
                square: Square::new(1, 3),
                tile: Tile::new(Piece::RailwayStraight, Rotation::R0),
            })
        );
    }

    #[test]
    fn test_piece_must_be_rolled() {
        let game = Game::new();
        let dice = roll(&[Piece::RailwayStraight]);
        assert_eq!(
            game.validate_turn(&dice, &[place(0, 3, Piece::RailwayT, Rotation::R90)]).err(),
            Some(GameError::PieceNotRolled {
                piece: Piece::RailwayT
            })
        );
    }

    #[test]
    fn test_placeable_piece_cannot_be_skipped() {
        let game = Game::new();
        let dice = roll(&[Piece::RailwayStraight]);
        assert_eq!(
            game.validate_turn(&dice, &[]).err(),
            Some(GameError::UnplayedPiece {
                piece: Piece::RailwayStraight
            })
        );
    }

    #[test]
    fn test_occupied_and_fixed_squares() {
        let mut game = Game::new();
        let dice = roll(&[Piece::RailwayStraight]);
        game.play_turn(&dice, &[place(0, 3, Piece::RailwayStraight, Rotation::R0)])
            .unwrap();

        assert_eq!(
            game.validate_turn(&dice, &[place(0, 3, Piece::RailwayStraight, Rotation::R0)]).err(),
            Some(GameError::SquareOccupied {
                square: Square::new(0, 3)
            })
        );
        assert_eq!(
            game.validate_turn(&dice, &[place(-1, 3, Piece::RailwayStraight, Rotation::R0)]).err(),
            Some(GameError::Board(BoardError::FixedSquare {
                square: Square::new(-1, 3)
            }))
        );
    }

    #[test]
    fn test_one_special_per_turn() {
        let game = Game::new();
        let dice = roll(&[]);
        let placements = [
            place(0, 3, Piece::RailwayJunction, Rotation::R0),
            place(6, 3, Piece::CrossJunction, Rotation::R90),
        ];
        assert_eq!(
            game.validate_turn(&dice, &placements).err(),
            Some(GameError::SpecialLimit)
        );
        assert!(game.validate_turn(&dice, &placements[..1]).is_ok());
    }

    #[test]
    fn test_special_used_once_per_game() {
        let mut game = Game::new();
        let dice = roll(&[]);
        game.play_turn(&dice, &[place(0, 3, Piece::RailwayJunction, Rotation::R0)])
            .unwrap();
        assert!(game.specials_used().contains(&Piece::RailwayJunction));
        assert!(!game.available_specials().contains(&Piece::RailwayJunction));
        assert_eq!(
            game.validate_turn(&dice, &[place(6, 3, Piece::RailwayJunction, Rotation::R0)]).err(),
            Some(GameError::SpecialReused {
                piece: Piece::RailwayJunction
            })
        );
    }

    #[test]
    fn test_special_limit_per_game() {
        let game = Game::from_board(Board::rulebook_example(), 6);
        assert_eq!(game.specials_used().len(), 2);
        assert_eq!(game.available_specials().len(), 4);

        let mut board = Board::rulebook_example();
        board
            .add_tile(Tile::new(Piece::CrossJunction, Rotation::R0), Square::new(6, 6))
            .unwrap();
        let game = Game::from_board(board, 6);
        assert!(game.available_specials().is_empty());
    }

    #[test]
    fn test_game_over_after_last_turn() {
        let mut game = Game::from_board(Board::new(), TURNS - 1);
        game.play_turn(&roll(&[]), &[]).unwrap();
        assert!(game.is_finished());
        assert_eq!(game.play_turn(&roll(&[]), &[]), Err(GameError::GameOver));
    }

    #[test]
    fn test_error_messages() {
        let error = GameError::PieceNotRolled {
            piece: Piece::Overpass,
        };
        assert_eq!(error.to_string(), "Overpass was not rolled this turn");
        let error: GameError = BoardError::OutOfRange {
            square: Square::new(9, 9),
        }
        .into();
        assert_eq!(error.to_string(), "Square (9, 9) is not on the board");
    }
}
