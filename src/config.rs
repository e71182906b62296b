//! Engine configuration parameters.

use crate::ucb::INV_SQRT_CACHE_SIZE;
use std::time::Duration;
use thiserror::Error;

/// Longest possible game plus the root slot.
pub const MAX_PATH_LEN: usize = 81 + 1;

/// Configuration for the search engine and the game driver.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard node capacity of the search arena.
    /// The tree is discarded once more than 3/4 of it is in use.
    pub arena_capacity: usize,

    /// Time budget for the first decision of a game.
    /// The first turn gets a much longer allowance than later ones.
    pub first_turn_budget: Duration,

    /// Time budget for every later decision.
    pub turn_budget: Duration,

    /// The clock is read every `timer_check_interval` iterations.
    pub timer_check_interval: u64,

    /// Seed for the rollout RNG. `None` draws a fresh seed.
    pub seed: Option<u64>,

    /// Visit counts below this read `1/sqrt(k)` from a table.
    pub inv_sqrt_cache_size: usize,

    /// Maximum number of nodes on a selection path.
    pub path_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arena_capacity: 20_000_000,
            first_turn_budget: Duration::from_millis(950),
            turn_budget: Duration::from_millis(95),
            timer_check_interval: 256,
            seed: None,
            inv_sqrt_cache_size: INV_SQRT_CACHE_SIZE,
            path_capacity: MAX_PATH_LEN,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("arena capacity {0} is too small, need at least {min}", min = MIN_ARENA_CAPACITY)]
    ArenaTooSmall(usize),
    #[error("timer check interval must be positive")]
    ZeroTimerInterval,
    #[error("path capacity {0} cannot hold a full game ({max} nodes)", max = MAX_PATH_LEN)]
    PathTooShort(usize),
}

/// Enough room for a root and two full expansions of the opening.
pub const MIN_ARENA_CAPACITY: usize = 256;

impl EngineConfig {
    /// Create a small, seeded config for tests.
    pub fn for_testing() -> Self {
        Self {
            arena_capacity: 1_000_000,
            first_turn_budget: Duration::from_millis(20),
            turn_budget: Duration::from_millis(5),
            timer_check_interval: 256,
            seed: Some(0x5eed),
            inv_sqrt_cache_size: 4_096,
            path_capacity: MAX_PATH_LEN,
        }
    }

    /// Builder pattern: set arena capacity.
    pub fn with_arena_capacity(mut self, capacity: usize) -> Self {
        self.arena_capacity = capacity;
        self
    }

    /// Builder pattern: set first-turn and later-turn budgets.
    pub fn with_budgets(mut self, first_turn: Duration, turn: Duration) -> Self {
        self.first_turn_budget = first_turn;
        self.turn_budget = turn;
        self
    }

    /// Builder pattern: set RNG seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builder pattern: set timer check interval.
    pub fn with_timer_check_interval(mut self, interval: u64) -> Self {
        self.timer_check_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena_capacity < MIN_ARENA_CAPACITY {
            return Err(ConfigError::ArenaTooSmall(self.arena_capacity));
        }
        if self.timer_check_interval == 0 {
            return Err(ConfigError::ZeroTimerInterval);
        }
        if self.path_capacity < MAX_PATH_LEN {
            return Err(ConfigError::PathTooShort(self.path_capacity));
        }
        Ok(())
    }
}
