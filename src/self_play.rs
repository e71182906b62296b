//! Engine-vs-engine matches.
//!
//! Two [`GameController`]s exchange moves exactly as two bots would through
//! the referee: the first opens in the centre, every later turn answers the
//! other side's last move.

use crate::config::EngineConfig;
use crate::game_controller::{GameController, MoveValidationError};
use crate::games::{GameResult, Move};
use crate::mcts::Budget;
use tracing::debug;

/// Outcome and move list of one finished match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub result: GameResult,
    pub moves: Vec<Move>,
}

/// Plays one game between an engine configured with `config_x` (moving
/// first) and one configured with `config_o`.
///
/// Both sides get `budget` for every decision. Each side validates the
/// other's moves, so an error here means the engine produced an illegal
/// move.
pub fn play_match(
    config_x: EngineConfig,
    config_o: EngineConfig,
    budget: Budget,
) -> Result<MatchRecord, MoveValidationError> {
    let mut first = GameController::new(config_x).with_fixed_budget(budget);
    let mut second = GameController::new(config_o).with_fixed_budget(budget);

    let mut moves = Vec::with_capacity(81);
    let mut last = first.play_opening().mv;
    let mut sides = [&mut second, &mut first];
    let mut turn = 0;

    while let Some(mv) = last {
        moves.push(mv);
        let side = &mut sides[turn % 2];
        last = side.respond(mv)?.mv;
        turn += 1;
    }

    let result = sides[(turn + 1) % 2].status();
    debug!(?result, plies = moves.len(), "Match finished");
    Ok(MatchRecord { result, moves })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GameState;

    #[test]
    fn test_self_play_ends_with_legal_moves() {
        let config = EngineConfig::for_testing();
        let record = play_match(
            config.clone().with_seed(Some(1)),
            config.with_seed(Some(2)),
            Budget::Iterations(40),
        )
        .unwrap();

        assert!(record.result.is_over());
        assert_eq!(record.moves[0], Move::CENTER);

        let mut state = GameState::new();
        for &mv in &record.moves {
            assert!(state.accepts(mv), "illegal move {} in {:?}", mv, record.moves);
            state.make_move(mv);
        }
        assert_eq!(state.result(), record.result);
    }
}
