//! # Ultimate Tic-Tac-Toe MCTS Engine
//!
//! A real-time bot for ultimate tic-tac-toe. The board is bit-packed into a
//! few `u16` masks so positions copy for free, and the search tree lives in a
//! fixed-capacity arena that is reused from turn to turn.
//!
//! ## Modules
//! - [`games`]: board representation and rules
//! - [`arena`]: node storage for the search tree
//! - [`mcts`]: the search itself
//! - [`game_controller`]: the live game and move validation
//! - [`protocol`]: referee input/output lines
//! - [`self_play`]: engine-vs-engine matches
//! - [`diagnostics`]: logging setup and stderr dumps

pub mod arena;
pub mod config;
pub mod diagnostics;
pub mod game_controller;
pub mod games;
pub mod mcts;
pub mod protocol;
pub mod self_play;
pub mod ucb;

pub use arena::{ArenaFull, ChildStats, NodeId, SearchArena};
pub use config::{ConfigError, EngineConfig};
pub use game_controller::{Decision, GameController, MoveValidationError};
pub use games::{GameResult, GameState, Move, Outcome, Player};
pub use mcts::{Budget, SearchStatistics, MCTS};
