//! # Monte Carlo Tree Search Engine
//!
//! Single-threaded UCT search over a [`SearchArena`].
//!
//! Each iteration copies the live position into a scratch state and walks down
//! the tree until the game ends, expanding every node it passes through. There
//! is no separate rollout phase: the playout *is* the descent. Children are
//! tried once each in random order before UCB1 takes over. The terminal reward
//! is then backed up along the recorded path, flipping perspective at every
//! ply.
//!
//! The engine keeps its tree between turns. After every move played on the
//! board, [`MCTS::commit`] moves the root down so the statistics gathered for
//! that subtree carry over.

use crate::arena::{ArenaFull, ChildStats, NodeId, SearchArena};
use crate::config::EngineConfig;
use crate::games::{GameState, Move};
use crate::ucb::{exploration_term, InvSqrtTable};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long a search batch may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Wall-clock limit, checked every `timer_check_interval` iterations.
    Time(Duration),
    /// Exact number of iterations to attempt.
    Iterations(u64),
}

/// Summary of one search batch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStatistics {
    /// Iterations that reached a terminal position and were backed up.
    pub iterations: u64,
    /// Iterations thrown away without touching any statistic.
    pub discarded: u64,
    /// Arena slots in use when the batch ended.
    pub total_nodes: usize,
    /// Visits of the root when the batch ended.
    pub root_visits: u32,
    pub elapsed: Duration,
    /// Number of times the arena was wiped during the batch.
    pub arena_resets: u32,
}

impl SearchStatistics {
    /// Completed iterations per second.
    pub fn iterations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.iterations as f64 / secs
        } else {
            0.0
        }
    }
}

enum Iteration {
    Completed,
    Discarded,
}

/// The search engine.
pub struct MCTS {
    arena: SearchArena,
    inv_sqrt: InvSqrtTable,
    /// Position replayed by every iteration.
    scratch: GameState,
    path: Vec<NodeId>,
    rng: Xoshiro256PlusPlus,
    /// Global simulation counter `N` used by UCB1.
    simulations: u64,
    config: EngineConfig,
}

impl MCTS {
    /// Creates a new engine with an empty tree.
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(
            arena_capacity = config.arena_capacity,
            seed, "Creating search engine"
        );
        Self {
            arena: SearchArena::new(config.arena_capacity),
            inv_sqrt: InvSqrtTable::new(config.inv_sqrt_cache_size),
            scratch: GameState::new(),
            path: Vec::with_capacity(config.path_capacity),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            simulations: 0,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn arena(&self) -> &SearchArena {
        &self.arena
    }

    /// Moves the root to the child reached by `mv`.
    ///
    /// Must be called for every move played on the live board, by either side.
    /// Returns true if the existing subtree was kept.
    pub fn commit(&mut self, mv: Move) -> bool {
        let reused = self.arena.advance_root(mv);
        debug!(%mv, reused, nodes = self.arena.len(), "Advanced root");
        reused
    }

    /// Runs search iterations from `state` until `budget` is spent.
    ///
    /// `state` must be the position the current root stands for. Nothing
    /// happens if the game is already over. If the arena fills up, the tree
    /// is dropped and the batch carries on from a fresh root.
    pub fn search(&mut self, state: &GameState, budget: Budget) -> SearchStatistics {
        let start = Instant::now();
        let mut stats = SearchStatistics::default();

        self.reset_if_crowded(&mut stats);
        self.simulations = self.arena.visits(self.arena.root()) as u64;

        if !state.result().is_over() {
            let interval = self.config.timer_check_interval.max(1);
            let mut attempts = 0u64;
            loop {
                match budget {
                    Budget::Iterations(limit) => {
                        if attempts >= limit {
                            break;
                        }
                    }
                    Budget::Time(limit) => {
                        if self.simulations % interval == 0 && start.elapsed() >= limit {
                            break;
                        }
                    }
                }
                attempts += 1;
                match self.run_iteration(state) {
                    Ok(Iteration::Completed) => {
                        stats.iterations += 1;
                        self.reset_if_crowded(&mut stats);
                    }
                    Ok(Iteration::Discarded) => stats.discarded += 1,
                    Err(full) => {
                        stats.discarded += 1;
                        stats.arena_resets += 1;
                        warn!(
                            used = full.used,
                            capacity = full.capacity,
                            "{}, starting a fresh tree",
                            full
                        );
                        self.arena.reset(self.arena.root_move());
                        self.simulations = 0;
                    }
                }
            }
        }

        stats.total_nodes = self.arena.len();
        stats.root_visits = self.arena.visits(self.arena.root());
        stats.elapsed = start.elapsed();
        debug!(
            iterations = stats.iterations,
            discarded = stats.discarded,
            nodes = stats.total_nodes,
            root_visits = stats.root_visits,
            resets = stats.arena_resets,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Search batch finished"
        );
        stats
    }

    /// Applies the 3/4 reset policy, keeping `N` in step with the root.
    fn reset_if_crowded(&mut self, stats: &mut SearchStatistics) {
        if self.arena.maybe_reset() {
            stats.arena_resets += 1;
            self.simulations = 0;
            info!(
                capacity = self.arena.capacity(),
                "Search arena past 3/4 of capacity, starting a fresh tree"
            );
        }
    }

    /// One selection/expansion/backpropagation pass.
    fn run_iteration(&mut self, state: &GameState) -> Result<Iteration, ArenaFull> {
        let sqrt_log = exploration_term(self.simulations);
        self.simulations += 1;

        self.scratch.duplicate(state);
        self.path.clear();
        let mut node = self.arena.root();
        let mut player = self.scratch.to_move();

        let reward = loop {
            if self.path.len() >= self.config.path_capacity {
                return Ok(Iteration::Discarded);
            }
            self.path.push(node);
            self.arena.ensure_expanded(node, &self.scratch)?;
            if !self.arena.is_expanded(node) {
                return Ok(Iteration::Discarded);
            }

            let child = if self.arena.has_unvisited(node) {
                self.arena.draw_unvisited(node, &mut self.rng)
            } else {
                self.arena.select_ucb(node, sqrt_log, &self.inv_sqrt)
            };
            let outcome = self.scratch.apply_move(self.arena.move_of(child), player);
            player = player.opponent();
            node = child;
            if let Some(reward) = outcome.reward() {
                break reward;
            }
        };

        // `reward` is from the side that moved into `node`; each parent sees
        // the complement.
        let mut reward = reward;
        self.arena.record(node, reward);
        for &id in self.path.iter().rev() {
            reward = 1.0 - reward;
            self.arena.record(id, reward);
        }
        Ok(Iteration::Completed)
    }

    /// The most visited root child, expanding the root first if needed.
    ///
    /// Returns `None` only if `state` has no legal move.
    pub fn best_move(&mut self, state: &GameState) -> Option<Move> {
        if state.result().is_over() {
            return None;
        }
        let root = self.arena.root();
        if !self.arena.is_expanded(root) && self.arena.ensure_expanded(root, state).is_err() {
            self.arena.reset(self.arena.root_move());
            let root = self.arena.root();
            self.arena.ensure_expanded(root, state).ok()?;
        }
        let root = self.arena.root();
        self.arena
            .best_child(root)
            .map(|child| self.arena.move_of(child))
    }

    /// Returns statistics for the children of the root node.
    pub fn get_root_children_stats(&self) -> Vec<ChildStats> {
        self.arena.children(self.arena.root()).collect()
    }

    /// Global simulation counter as of the last iteration.
    pub fn simulations(&self) -> u64 {
        self.simulations
    }
}
