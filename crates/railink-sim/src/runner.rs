//! Plays one seeded game with a bot.

use crate::config::SimConfig;
use railink_core::{
    Board, BoardJson, Bot, BotStrategy, DiceRollSimulator, Game, GameError, Piece, Placement,
    ScoreBreakdown, SearchLimits,
};
use serde::Serialize;
use tracing::info;

/// What happened on one turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub turn: u8,
    pub rolled: Vec<Piece>,
    pub placements: Vec<Placement>,
}

/// Summary of a finished game
#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub seed: u64,
    pub strategy: BotStrategy,
    pub turns: Vec<TurnReport>,
    pub score: ScoreBreakdown,
    pub board: BoardJson,
}

pub fn run_game(config: &SimConfig) -> Result<GameReport, GameError> {
    let mut dice = DiceRollSimulator::new(config.seed);
    let mut bot = Bot::with_seed(config.strategy, config.seed).with_limits(SearchLimits {
        max_states: config.search_budget,
    });
    let mut game = Game::from_board(Board::new(), 0);
    let mut turns = Vec::new();

    for roll in dice.roll_game(config.turns) {
        let rolled: Vec<Piece> = roll
            .pieces()
            .pieces()
            .flat_map(|(piece, count)| std::iter::repeat(piece).take(count as usize))
            .collect();
        let placements = bot.choose_placements(&game, &roll)?;
        game.play_turn(&roll, &placements)?;

        info!(
            turn = game.turn(),
            rolled = ?rolled,
            placed = placements.len(),
            "Turn complete"
        );
        turns.push(TurnReport {
            turn: game.turn(),
            rolled,
            placements,
        });
    }

    let score = game.score()?;
    Ok(GameReport {
        seed: config.seed,
        strategy: config.strategy,
        turns,
        score,
        board: game.board().to_json_friendly(),
    })
}
