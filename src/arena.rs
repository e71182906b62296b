//! # Search Arena
//!
//! Append-only, fixed-capacity storage for the search tree.
//!
//! Every node lives in one preallocated `Vec`. A node's children occupy a
//! contiguous slice `[child_from, child_from + children)` that is appended in
//! one go when the node is expanded. Nodes are never freed one by one: when
//! more than three quarters of the capacity is in use, [`SearchArena::maybe_reset`]
//! throws the whole tree away and starts over from a single root.
//!
//! Nodes are addressed through the opaque [`NodeId`] handle; raw indices
//! never leave this module.
//!
//! ## Node invariants
//! - `children == 0` means the node has not been expanded
//! - While `visits < children`, exactly the first `visits` children have been
//!   visited; the remaining suffix is drawn from at random
//! - `wins` is the sum of backed-up rewards from the point of view of the
//!   player who made the move leading to the node

use crate::games::{GameState, Move};
use crate::ucb::{ucb1, InvSqrtTable};
use rand::Rng;
use thiserror::Error;

/// Handle to a node in a [`SearchArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    wins: f64,
    visits: u32,
    child_from: u32,
    children: u8,
    /// The move that leads to this node from its parent.
    mv: Move,
}

impl Node {
    const fn leaf(mv: Move) -> Self {
        Self {
            wins: 0.0,
            visits: 0,
            child_from: 0,
            children: 0,
            mv,
        }
    }
}

/// Returned when an expansion would exceed the arena's hard capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("search arena full: {used} of {capacity} nodes used, {requested} more requested")]
pub struct ArenaFull {
    pub used: usize,
    pub capacity: usize,
    pub requested: usize,
}

/// Visit statistics of one child, for move selection and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    pub mv: Move,
    pub visits: u32,
    pub wins: f64,
}

impl ChildStats {
    /// Average reward, 0 for an unvisited child.
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / self.visits as f64
        }
    }
}

/// Fixed-capacity node store with a movable root.
#[derive(Debug)]
pub struct SearchArena {
    nodes: Vec<Node>,
    capacity: usize,
    root: NodeId,
    /// Move that produced the root position, `None` for the initial position.
    root_move: Option<Move>,
}

impl SearchArena {
    /// Creates an arena holding at most `capacity` nodes, with a single root.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut nodes = Vec::with_capacity(capacity);
        nodes.push(Node::leaf(Move::default()));
        Self {
            nodes,
            capacity,
            root: NodeId(0),
            root_move: None,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Move that led to the current root, if any.
    #[inline]
    pub fn root_move(&self) -> Option<Move> {
        self.root_move
    }

    /// Number of slots in use.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is always present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn visits(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].visits
    }

    #[inline]
    pub fn wins(&self, id: NodeId) -> f64 {
        self.nodes[id.index()].wins
    }

    /// Move leading to `id`. Only meaningful for non-root nodes.
    #[inline]
    pub fn move_of(&self, id: NodeId) -> Move {
        self.nodes[id.index()].mv
    }

    #[inline]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id.index()].children as usize
    }

    #[inline]
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes[id.index()].children != 0
    }

    /// True while some child of `id` has never been visited.
    #[inline]
    pub fn has_unvisited(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.index()];
        node.visits < node.children as u32
    }

    /// Drops every node and starts over from a single root.
    pub fn reset(&mut self, root_move: Option<Move>) {
        self.nodes.clear();
        self.nodes.push(Node::leaf(root_move.unwrap_or_default()));
        self.root = NodeId(0);
        self.root_move = root_move;
    }

    /// Resets the arena if more than 3/4 of its capacity is in use.
    ///
    /// The fresh root keeps the old root's move label; every statistic is
    /// lost. Returns true if a reset happened.
    pub fn maybe_reset(&mut self) -> bool {
        if self.nodes.len() > self.capacity * 3 / 4 {
            self.reset(self.root_move);
            true
        } else {
            false
        }
    }

    /// Child of `id` reached by `mv`, if `id` has been expanded.
    pub fn find_child(&self, id: NodeId, mv: Move) -> Option<NodeId> {
        self.child_ids(id).find(|&child| self.nodes[child.index()].mv == mv)
    }

    /// Moves the root to the child reached by `mv`, keeping its subtree.
    ///
    /// If the root has no such child (not expanded yet, or the arena was
    /// reset) the arena is reset to a single root labelled `mv`. Returns true
    /// if the existing subtree was reused.
    pub fn advance_root(&mut self, mv: Move) -> bool {
        match self.find_child(self.root, mv) {
            Some(child) => {
                self.root = child;
                self.root_move = Some(mv);
                true
            }
            None => {
                self.reset(Some(mv));
                false
            }
        }
    }

    /// Appends one child per legal move of `state` if `id` has none yet.
    ///
    /// `state` must be the position at `id`. Calling this on an expanded node
    /// does nothing. A position without legal moves is left unexpanded.
    pub fn ensure_expanded(&mut self, id: NodeId, state: &GameState) -> Result<(), ArenaFull> {
        if self.is_expanded(id) {
            return Ok(());
        }
        let forced = state.forced_sub();
        let count = state.legal_move_count(forced);
        if count == 0 {
            return Ok(());
        }
        if self.nodes.len() + count > self.capacity {
            return Err(ArenaFull {
                used: self.nodes.len(),
                capacity: self.capacity,
                requested: count,
            });
        }

        let child_from = self.nodes.len() as u32;
        let nodes = &mut self.nodes;
        state.for_each_legal_move(forced, |mv| nodes.push(Node::leaf(mv)));

        let node = &mut self.nodes[id.index()];
        node.child_from = child_from;
        node.children = count as u8;
        Ok(())
    }

    /// Picks a random unvisited child of `id`.
    ///
    /// The pick is swapped into the first unvisited slot, so the unvisited
    /// children always form the suffix of the child range and a later draw
    /// only looks at what is left.
    pub fn draw_unvisited<R: Rng>(&mut self, id: NodeId, rng: &mut R) -> NodeId {
        let node = self.nodes[id.index()];
        debug_assert!(node.visits < node.children as u32);
        let first = (node.child_from + node.visits) as usize;
        let end = (node.child_from + node.children as u32) as usize;
        let pick = rng.random_range(first..end);
        self.nodes.swap(first, pick);
        let slot = &mut self.nodes[first];
        slot.wins = 0.0;
        slot.visits = 0;
        NodeId(first as u32)
    }

    /// Child of `id` with the highest UCB1 score. Ties go to the first child.
    ///
    /// Every child must have been visited at least once.
    pub fn select_ucb(&self, id: NodeId, sqrt_log: f64, inv_sqrt: &InvSqrtTable) -> NodeId {
        let node = &self.nodes[id.index()];
        let from = node.child_from as usize;
        let mut best = from;
        let mut best_score = f64::NEG_INFINITY;
        for (offset, child) in self.children_slice(node).iter().enumerate() {
            let score = ucb1(child.wins, child.visits, sqrt_log, inv_sqrt.get(child.visits));
            if score > best_score {
                best_score = score;
                best = from + offset;
            }
        }
        NodeId(best as u32)
    }

    /// Adds one visit and `reward` to node `id`.
    #[inline]
    pub fn record(&mut self, id: NodeId, reward: f64) {
        let node = &mut self.nodes[id.index()];
        node.visits += 1;
        node.wins += reward;
    }

    /// Most visited child of `id`; the first one wins ties.
    pub fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32)> = None;
        for child in self.child_ids(id) {
            let visits = self.visits(child);
            if best.map_or(true, |(_, most)| visits > most) {
                best = Some((child, visits));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Statistics of every child of `id`, in arena order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = ChildStats> + '_ {
        self.children_slice(&self.nodes[id.index()])
            .iter()
            .map(|child| ChildStats {
                mv: child.mv,
                visits: child.visits,
                wins: child.wins,
            })
    }

    fn child_ids(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        let node = &self.nodes[id.index()];
        let from = node.child_from;
        (from..from + node.children as u32).map(NodeId)
    }

    fn children_slice(&self, node: &Node) -> &[Node] {
        let from = node.child_from as usize;
        &self.nodes[from..from + node.children as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(7)
    }

    #[test]
    fn test_new_arena_has_single_root() {
        let arena = SearchArena::new(1_000);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.capacity(), 1_000);
        assert_eq!(arena.root_move(), None);
        assert!(!arena.is_expanded(arena.root()));
    }

    #[test]
    fn test_expand_is_idempotent() {
        let mut arena = SearchArena::new(1_000);
        let state = GameState::new();
        let root = arena.root();
        arena.ensure_expanded(root, &state).unwrap();
        assert_eq!(arena.child_count(root), 81);
        assert_eq!(arena.len(), 82);
        arena.ensure_expanded(root, &state).unwrap();
        assert_eq!(arena.len(), 82);

        let moves: Vec<Move> = arena.children(root).map(|c| c.mv).collect();
        assert_eq!(moves, state.legal_moves());
    }

    #[test]
    fn test_expand_respects_capacity() {
        let mut arena = SearchArena::new(50);
        let state = GameState::new();
        let err = arena.ensure_expanded(arena.root(), &state).unwrap_err();
        assert_eq!(err.requested, 81);
        assert_eq!(err.used, 1);
        assert_eq!(arena.len(), 1);
        assert!(!arena.is_expanded(arena.root()));
    }

    #[test]
    fn test_draw_unvisited_walks_every_child_once() {
        let mut arena = SearchArena::new(1_000);
        let mut state = GameState::new();
        state.make_move(Move::CENTER);
        let root = arena.root();
        arena.ensure_expanded(root, &state).unwrap();
        let mut rng = rng();

        let mut seen = Vec::new();
        while arena.has_unvisited(root) {
            let child = arena.draw_unvisited(root, &mut rng);
            seen.push(arena.move_of(child));
            arena.record(child, 1.0);
            arena.record(root, 0.0);
        }
        seen.sort_by_key(|mv| mv.cell);
        let mut expected = state.legal_moves();
        expected.sort_by_key(|mv| mv.cell);
        assert_eq!(seen, expected);
        assert!(arena.children(root).all(|c| c.visits == 1));
    }

    #[test]
    fn test_select_ucb_prefers_higher_win_rate_at_equal_visits() {
        let mut arena = SearchArena::new(1_000);
        let mut state = GameState::new();
        state.make_move(Move::CENTER);
        let root = arena.root();
        arena.ensure_expanded(root, &state).unwrap();
        let mut rng = rng();
        let mut target = None;
        while arena.has_unvisited(root) {
            let child = arena.draw_unvisited(root, &mut rng);
            let reward = if arena.move_of(child).cell == 8 { 1.0 } else { 0.0 };
            if reward > 0.0 {
                target = Some(child);
            }
            arena.record(child, reward);
            arena.record(root, 1.0 - reward);
        }
        let table = InvSqrtTable::new(64);
        let chosen = arena.select_ucb(root, 1.0, &table);
        assert_eq!(Some(chosen), target);
    }

    #[test]
    fn test_best_child_by_visits() {
        let mut arena = SearchArena::new(1_000);
        let state = GameState::new();
        let root = arena.root();
        arena.ensure_expanded(root, &state).unwrap();
        let target = arena.find_child(root, Move::new(2, 5)).unwrap();
        arena.record(target, 0.0);
        arena.record(target, 0.0);
        let other = arena.find_child(root, Move::new(7, 1)).unwrap();
        arena.record(other, 1.0);
        assert_eq!(arena.best_child(root), Some(target));
    }

    #[test]
    fn test_best_child_ties_go_to_first() {
        let mut arena = SearchArena::new(1_000);
        let state = GameState::new();
        let root = arena.root();
        assert_eq!(arena.best_child(root), None);
        arena.ensure_expanded(root, &state).unwrap();
        assert_eq!(arena.move_of(arena.best_child(root).unwrap()), Move::new(0, 0));
    }

    #[test]
    fn test_advance_root_reuses_subtree() {
        let mut arena = SearchArena::new(1_000);
        let state = GameState::new();
        let root = arena.root();
        arena.ensure_expanded(root, &state).unwrap();
        let child = arena.find_child(root, Move::CENTER).unwrap();
        arena.record(child, 1.0);
        arena.record(child, 0.5);

        assert!(arena.advance_root(Move::CENTER));
        assert_eq!(arena.root(), child);
        assert_eq!(arena.root_move(), Some(Move::CENTER));
        assert_eq!(arena.visits(arena.root()), 2);
        assert!((arena.wins(arena.root()) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_advance_root_on_unexpanded_root_resets() {
        let mut arena = SearchArena::new(1_000);
        assert!(!arena.advance_root(Move::new(1, 2)));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.root_move(), Some(Move::new(1, 2)));
        assert_eq!(arena.visits(arena.root()), 0);
    }

    #[test]
    fn test_maybe_reset_past_three_quarters() {
        let mut arena = SearchArena::new(200);
        let mut state = GameState::new();
        let root = arena.root();
        arena.ensure_expanded(root, &state).unwrap();
        assert!(!arena.maybe_reset());

        let first = arena.find_child(root, Move::new(0, 0)).unwrap();
        arena.record(first, 1.0);
        assert!(arena.advance_root(Move::new(0, 0)));
        state.make_move(Move::new(0, 0));
        arena.ensure_expanded(arena.root(), &state).unwrap();
        // 1 + 81 + 8 = 90 nodes, still under 150.
        assert!(!arena.maybe_reset());

        let mut arena = SearchArena::new(100);
        let fresh = GameState::new();
        arena.ensure_expanded(arena.root(), &fresh).unwrap();
        assert!(arena.advance_root(Move::new(3, 3)));
        assert!(arena.maybe_reset());
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.root_move(), Some(Move::new(3, 3)));
        assert_eq!(arena.visits(arena.root()), 0);
        assert!(!arena.is_expanded(arena.root()));

        let mut after = GameState::new();
        after.make_move(Move::new(3, 3));
        arena.ensure_expanded(arena.root(), &after).unwrap();
        assert_eq!(arena.child_count(arena.root()), 8);
    }

    #[test]
    fn test_maybe_reset_keeps_lone_root_in_tiny_arena() {
        for capacity in [2, 3, 5] {
            let mut arena = SearchArena::new(capacity);
            assert!(!arena.maybe_reset(), "capacity {}", capacity);
            assert_eq!(arena.len(), 1);
        }
    }
}
