//! WebAssembly bindings for the rules engine.
//!
//! This module exposes board validation, move enumeration and scoring to
//! JavaScript through wasm-bindgen. Values cross the boundary as JSON.

use wasm_bindgen::prelude::*;

use crate::board::{Board, BoardJson};
use crate::bot::{Bot, BotStrategy};
use crate::dice::DiceRoll;
use crate::game::Game;
use crate::geometry::Square;
use crate::moves::{enumerate_maximal_placements, PieceCounts, Placement, SearchLimits};
use crate::score::score;
use crate::tile::{Piece, Tile};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// WASM-exposed board wrapper
#[wasm_bindgen]
pub struct WasmBoard {
    board: Board,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create an empty board
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmBoard {
        WasmBoard {
            board: Board::new(),
        }
    }

    /// Load a board from its JSON-friendly form
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<WasmBoard, JsValue> {
        let parsed: BoardJson =
            serde_json::from_str(json).map_err(|e| js_error(format!("Invalid board: {}", e)))?;
        let board = Board::from_json_friendly(&parsed).map_err(js_error)?;
        Ok(WasmBoard { board })
    }

    /// The board in the rulebook's worked example
    #[wasm_bindgen(js_name = rulebookExample)]
    pub fn rulebook_example() -> WasmBoard {
        WasmBoard {
            board: Board::rulebook_example(),
        }
    }

    /// Placed tiles as JSON
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.board.to_json_friendly()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Whether a tile (JSON) may be placed at (row, col)
    #[wasm_bindgen(js_name = isValidPlacement)]
    pub fn is_valid_placement(&self, tile_json: &str, row: i32, col: i32) -> Result<bool, JsValue> {
        let tile: Tile = serde_json::from_str(tile_json).map_err(js_error)?;
        Ok(self.board.is_valid_placement(&tile, Square::new(row, col)))
    }

    /// Place a tile (JSON) at (row, col)
    #[wasm_bindgen(js_name = addTile)]
    pub fn add_tile(&mut self, tile_json: &str, row: i32, col: i32) -> Result<(), JsValue> {
        let tile: Tile = serde_json::from_str(tile_json).map_err(js_error)?;
        self.board.add_tile(tile, Square::new(row, col)).map_err(js_error)
    }

    /// Clear (row, col)
    #[wasm_bindgen(js_name = removeTile)]
    pub fn remove_tile(&mut self, row: i32, col: i32) -> Result<(), JsValue> {
        self.board.remove_tile(Square::new(row, col)).map(|_| ()).map_err(js_error)
    }

    /// Free squares as a JSON array
    #[wasm_bindgen(js_name = getFreeSquares)]
    pub fn get_free_squares(&self) -> Result<String, JsValue> {
        let forest = self.board.clusters().map_err(js_error)?;
        let squares: Vec<Square> = forest.free_squares().into_iter().collect();
        serde_json::to_string(&squares).map_err(js_error)
    }

    /// Score breakdown as JSON, or an error naming the invalid square
    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> Result<String, JsValue> {
        let breakdown = score(&self.board).map_err(js_error)?;
        serde_json::to_string(&breakdown).map_err(js_error)
    }

    /// Maximal placement sequences for a list of pieces (JSON array)
    #[wasm_bindgen(js_name = enumeratePlacements)]
    pub fn enumerate_placements(&self, pieces_json: &str, max_states: usize) -> Result<String, JsValue> {
        let pieces: Vec<Piece> = serde_json::from_str(pieces_json).map_err(js_error)?;
        let counts: PieceCounts = pieces.into_iter().collect();
        let enumeration =
            enumerate_maximal_placements(&self.board, &counts, SearchLimits { max_states })
                .map_err(js_error)?;
        serde_json::to_string(&enumeration.sequences).map_err(js_error)
    }

    /// Let the greedy bot play a turn for a roll (JSON array of pieces),
    /// returning the placements it made
    #[wasm_bindgen(js_name = botTurn)]
    pub fn bot_turn(&mut self, pieces_json: &str, turn: u8, seed: u64) -> Result<String, JsValue> {
        let pieces: Vec<Piece> = serde_json::from_str(pieces_json).map_err(js_error)?;
        let roll = DiceRoll::certain(pieces.into_iter().collect());
        let mut game = Game::from_board(self.board.clone(), turn);
        let placements: Vec<Placement> = Bot::with_seed(BotStrategy::Greedy, seed)
            .choose_placements(&game, &roll)
            .map_err(js_error)?;
        game.play_turn(&roll, &placements).map_err(js_error)?;
        self.board = game.board().clone();
        serde_json::to_string(&placements).map_err(js_error)
    }
}

impl Default for WasmBoard {
    fn default() -> Self {
        Self::new()
    }
}
