//! # Game Controller Module - Central Game State Management
//!
//! This module provides the `GameController` which serves as the single source of truth
//! for the live game. It ensures proper separation between:
//!
//! - **Authoritative Game State**: The "real" position owned by the controller
//! - **Search State**: The engine's scratch copy, replayed from the live state
//!   every iteration
//!
//! ## Architecture Overview
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     GameController                       │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │            Authoritative GameState                 │  │
//! │  │  • Opponent moves validated here before applying   │  │
//! │  │  • Move history maintained                         │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │           │ every applied move            ▲              │
//! │           ▼                               │ best move    │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │   MCTS engine (root advanced in lockstep)          │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every move applied to the live state, ours or the opponent's, is committed
//! to the engine as well, so the search tree always describes the live
//! position.

use crate::arena::ChildStats;
use crate::config::EngineConfig;
use crate::games::{GameResult, GameState, Move, Player};
use crate::mcts::{Budget, SearchStatistics, MCTS};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during move validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveValidationError {
    /// Move breaks the rules in the current position
    #[error("illegal move {0}")]
    IllegalMove(Move),
    /// The game is already in a terminal state
    #[error("game is already over")]
    GameAlreadyOver,
}

/// A single entry in the move history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveHistoryEntry {
    /// Move number (1-indexed)
    pub move_number: usize,
    /// Player who made the move
    pub player: Player,
    /// The move that was made
    pub mv: Move,
}

/// The engine's answer for one turn.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Our move, `None` if the game was already decided.
    pub mv: Option<Move>,
    pub stats: SearchStatistics,
    /// Root children the move was picked from, in arena order. Empty for
    /// the opening, which is played without a search.
    pub root_children: Vec<ChildStats>,
}

/// The central game controller that owns the authoritative game state
///
/// # Usage
/// ```rust,ignore
/// let mut controller = GameController::new(EngineConfig::default());
///
/// // We move first
/// let decision = controller.play_opening();
///
/// // Or answer the opponent
/// let decision = controller.respond(opponent_move)?;
/// ```
pub struct GameController {
    /// The authoritative game state
    state: GameState,
    engine: MCTS,
    /// Complete history of moves made
    move_history: Vec<MoveHistoryEntry>,
    /// True until the first search of the game has run
    first_decision_pending: bool,
    /// Replaces the time budgets when set
    fixed_budget: Option<Budget>,
}

impl GameController {
    /// Create a new game controller for a fresh game
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: GameState::new(),
            engine: MCTS::new(config),
            move_history: Vec::new(),
            first_decision_pending: true,
            fixed_budget: None,
        }
    }

    /// Use the same budget for every decision instead of the configured times.
    pub fn with_fixed_budget(mut self, budget: Budget) -> Self {
        self.fixed_budget = Some(budget);
        self
    }

    /// Budget for the next search: the long first-turn allowance once, then
    /// the regular turn budget.
    pub fn next_budget(&mut self) -> Budget {
        if let Some(budget) = self.fixed_budget {
            self.first_decision_pending = false;
            return budget;
        }
        let config = self.engine.config();
        let budget = if self.first_decision_pending {
            config.first_turn_budget
        } else {
            config.turn_budget
        };
        self.first_decision_pending = false;
        Budget::Time(budget)
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: Move) -> Result<(), MoveValidationError> {
        if self.state.result().is_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if !self.state.accepts(mv) {
            return Err(MoveValidationError::IllegalMove(mv));
        }
        Ok(())
    }

    /// Attempt to make a move
    ///
    /// Validates the move and applies it to the live state and the search tree.
    pub fn try_make_move(&mut self, mv: Move) -> Result<MoveHistoryEntry, MoveValidationError> {
        self.validate_move(mv)?;
        Ok(self.apply_trusted_move(mv))
    }

    /// Apply a move without validation (for moves chosen by the engine)
    fn apply_trusted_move(&mut self, mv: Move) -> MoveHistoryEntry {
        let entry = MoveHistoryEntry {
            move_number: self.move_history.len() + 1,
            player: self.state.to_move(),
            mv,
        };
        self.state.make_move(mv);
        self.engine.commit(mv);
        self.move_history.push(entry);
        if self.state.result().is_over() {
            info!(result = ?self.state.result(), moves = self.move_history.len(), "Game over");
        }
        entry
    }

    /// We move first: open in the centre, then use the first-turn budget to
    /// grow the tree with the opponent to move.
    pub fn play_opening(&mut self) -> Decision {
        let opening = Move::CENTER;
        self.apply_trusted_move(opening);
        let budget = self.next_budget();
        let stats = self.engine.search(&self.state, budget);
        debug!(%opening, iterations = stats.iterations, "Played opening");
        Decision {
            mv: Some(opening),
            stats,
            root_children: Vec::new(),
        }
    }

    /// Applies the opponent's move, searches, and plays our best reply.
    pub fn respond(&mut self, opponent: Move) -> Result<Decision, MoveValidationError> {
        self.try_make_move(opponent)?;
        Ok(self.decide())
    }

    /// Searches the live position and plays the most visited move.
    pub fn decide(&mut self) -> Decision {
        let budget = self.next_budget();
        let stats = self.engine.search(&self.state, budget);
        let mv = self.engine.best_move(&self.state);
        let root_children = self.engine.get_root_children_stats();
        if let Some(mv) = mv {
            self.apply_trusted_move(mv);
        }
        Decision {
            mv,
            stats,
            root_children,
        }
    }

    /// Get a reference to the live game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn engine(&self) -> &MCTS {
        &self.engine
    }

    /// Get the current game status
    pub fn status(&self) -> GameResult {
        self.state.result()
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.state.result().is_over()
    }

    /// Get the complete move history
    pub fn move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    /// Get the number of moves made
    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Format move history as plain text, one move per line
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = String::from("=== Ultimate Tic-Tac-Toe Game History ===\n\n");
        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number, entry.player, entry.mv
            ));
        }

        match self.state.result() {
            GameResult::Won(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", winner));
            }
            GameResult::Drawn => output.push_str("\nResult: Draw\n"),
            GameResult::InProgress => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    self.state.to_move()
                ));
            }
        }
        output
    }
}
