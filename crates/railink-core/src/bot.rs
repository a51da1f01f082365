//! Automatic players.
//!
//! This module provides two strategies, both built on the placement
//! enumerator:
//! - Random: any maximal way to play the roll
//! - Greedy: the maximal way to play the roll (optionally with one special)
//!   that scores best right now

use crate::dice::DiceRoll;
use crate::game::{Game, GameError};
use crate::moves::{enumerate_maximal_placements, Placement, SearchLimits};
use crate::score::score;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a bot picks its placements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotStrategy {
    Random,
    Greedy,
}

/// A bot player that can decide on a turn's placements
pub struct Bot {
    pub strategy: BotStrategy,
    limits: SearchLimits,
    rng: StdRng,
}

impl Bot {
    pub fn new(strategy: BotStrategy) -> Self {
        Self {
            strategy,
            limits: SearchLimits::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(strategy: BotStrategy, seed: u64) -> Self {
        Self {
            strategy,
            limits: SearchLimits::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Use a different search budget for each enumeration
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Choose the placements for this turn's roll
    pub fn choose_placements(&mut self, game: &Game, roll: &DiceRoll) -> Result<Vec<Placement>, GameError> {
        match self.strategy {
            BotStrategy::Random => self.choose_random(game, roll),
            BotStrategy::Greedy => self.choose_greedy(game, roll),
        }
    }

    /// Random: any maximal sequence for the rolled pieces
    fn choose_random(&mut self, game: &Game, roll: &DiceRoll) -> Result<Vec<Placement>, GameError> {
        let enumeration = enumerate_maximal_placements(game.board(), roll.pieces(), self.limits)?;
        let chosen = enumeration.sequences.choose(&mut self.rng).cloned();
        if chosen.is_none() {
            warn!("No placement sequence found within the search budget");
        }
        Ok(chosen.unwrap_or_default())
    }

    /// Greedy: best immediate score over the roll alone and the roll plus
    /// each special still available
    fn choose_greedy(&mut self, game: &Game, roll: &DiceRoll) -> Result<Vec<Placement>, GameError> {
        let mut candidates = vec![roll.pieces().clone()];
        for special in game.available_specials() {
            let mut pieces = roll.pieces().clone();
            pieces.add(special);
            candidates.push(pieces);
        }

        let mut best: Option<(i32, Vec<Placement>)> = None;
        for pieces in &candidates {
            let enumeration = enumerate_maximal_placements(game.board(), pieces, self.limits)?;
            for sequence in enumeration.sequences {
                let mut board = game.board().clone();
                for placement in &sequence {
                    board.add_tile(placement.tile, placement.square)?;
                }
                let total = score(&board)?.total;
                if best.as_ref().map_or(true, |(best_total, _)| total > *best_total) {
                    best = Some((total, sequence));
                }
            }
        }

        match best {
            Some((total, sequence)) => {
                debug!(total, placed = sequence.len(), "Greedy bot chose placements");
                Ok(sequence)
            }
            None => {
                warn!("No placement sequence found within the search budget");
                Ok(Vec::new())
            }
        }
    }
}
