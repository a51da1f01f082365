//! Dice rolls.
//!
//! Each turn rolls three basic dice, whose faces are the six basic pieces,
//! and one junction die, whose three faces each appear twice.

use crate::moves::PieceCounts;
use crate::tile::Piece;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Basic dice rolled each turn
pub const BASIC_DICE: usize = 3;

/// The pieces rolled for one turn, with the chance of rolling exactly them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceRoll {
    pieces: PieceCounts,
    probability: f64,
}

impl DiceRoll {
    pub fn new(pieces: PieceCounts, probability: f64) -> Self {
        Self {
            pieces,
            probability,
        }
    }

    /// A roll that is known to have happened
    pub fn certain(pieces: PieceCounts) -> Self {
        Self::new(pieces, 1.0)
    }

    pub fn pieces(&self) -> &PieceCounts {
        &self.pieces
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// The roll for the last turn of the rulebook example game
    pub fn rulebook_last_turn() -> Self {
        Self::certain(
            [
                Piece::RailwayStraight,
                Piece::RailwayCorner,
                Piece::HighwayStraight,
                Piece::Overpass,
            ]
            .into_iter()
            .collect(),
        )
    }

    /// Every distinct outcome of one turn's roll.
    ///
    /// The basic dice give 56 multisets (1/216 for a triple, 3/216 for a
    /// pair, 6/216 for three different pieces) and the junction die
    /// multiplies each by three equally likely faces: 168 outcomes in all.
    pub fn full_distribution() -> Vec<DiceRoll> {
        let basic = Piece::BASIC;
        let faces = basic.len() as f64;
        let mut rolls = Vec::new();

        for a in 0..basic.len() {
            for b in a..basic.len() {
                for c in b..basic.len() {
                    let orderings = match (a == b, b == c) {
                        (true, true) => 1.0,
                        (false, false) => 6.0,
                        _ => 3.0,
                    };
                    let basic_probability = orderings / faces.powi(BASIC_DICE as i32);

                    for junction in Piece::JUNCTION {
                        let pieces: PieceCounts =
                            [basic[a], basic[b], basic[c], junction].into_iter().collect();
                        let probability = basic_probability / Piece::JUNCTION.len() as f64;
                        rolls.push(DiceRoll::new(pieces, probability));
                    }
                }
            }
        }
        rolls
    }
}

/// Seeded source of dice rolls for simulated games
pub struct DiceRollSimulator {
    rng: StdRng,
}

impl DiceRollSimulator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Roll the four dice for one turn
    pub fn roll_turn(&mut self) -> DiceRoll {
        let mut pieces = PieceCounts::new();
        for _ in 0..BASIC_DICE {
            pieces.add(Piece::BASIC[self.rng.gen_range(0..Piece::BASIC.len())]);
        }
        pieces.add(Piece::JUNCTION[self.rng.gen_range(0..Piece::JUNCTION.len())]);
        DiceRoll::certain(pieces)
    }

    /// Roll every turn of a game
    pub fn roll_game(&mut self, turns: u8) -> Vec<DiceRoll> {
        (0..turns).map(|_| self.roll_turn()).collect()
    }
}
