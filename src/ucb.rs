//! UCB1 scoring helpers.
//!
//! Selection evaluates `wins / visits + sqrt(2 ln N) / sqrt(visits)` for every
//! child of every fully expanded node on the path, so the reciprocal square
//! roots are precomputed once per engine.

/// Visit counts below this use the lookup table.
pub const INV_SQRT_CACHE_SIZE: usize = 1_000_000;

/// Table of `1 / sqrt(k)` for small `k`, computed directly past the end.
#[derive(Debug, Clone)]
pub struct InvSqrtTable {
    table: Box<[f64]>,
}

impl InvSqrtTable {
    /// Builds a table covering `0..size`. Entry 0 is `+inf`.
    pub fn new(size: usize) -> Self {
        let table = (0..size)
            .map(|k| if k == 0 { f64::INFINITY } else { 1.0 / (k as f64).sqrt() })
            .collect();
        Self { table }
    }

    #[inline]
    pub fn get(&self, k: u32) -> f64 {
        match self.table.get(k as usize) {
            Some(&value) => value,
            None => 1.0 / (k as f64).sqrt(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for InvSqrtTable {
    fn default() -> Self {
        Self::new(INV_SQRT_CACHE_SIZE)
    }
}

/// `sqrt(2 ln N)`, the exploration numerator shared by a whole iteration.
///
/// `N` is clamped to 1 so the very first iteration gets 0 instead of NaN.
#[inline]
pub fn exploration_term(simulations: u64) -> f64 {
    (2.0 * (simulations.max(1) as f64).ln()).sqrt()
}

/// UCB1 score of a visited child.
#[inline]
pub fn ucb1(wins: f64, visits: u32, sqrt_log: f64, inv_sqrt_visits: f64) -> f64 {
    wins / visits as f64 + sqrt_log * inv_sqrt_visits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_direct_computation() {
        let table = InvSqrtTable::new(1_000);
        assert_eq!(table.len(), 1_000);
        for k in [1u32, 2, 3, 10, 999] {
            let direct = 1.0 / (k as f64).sqrt();
            assert!((table.get(k) - direct).abs() < 1e-12);
        }
        assert!(table.get(0).is_infinite());
    }

    #[test]
    fn test_values_past_table_are_computed() {
        let table = InvSqrtTable::new(16);
        assert!((table.get(10_000) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_exploration_term() {
        assert_eq!(exploration_term(0), 0.0);
        assert_eq!(exploration_term(1), 0.0);
        let expected = (2.0 * (100f64).ln()).sqrt();
        assert!((exploration_term(100) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ucb1_prefers_less_visited_at_equal_rate() {
        let table = InvSqrtTable::new(1_000);
        let sqrt_log = exploration_term(1_000);
        let rare = ucb1(5.0, 10, sqrt_log, table.get(10));
        let common = ucb1(50.0, 100, sqrt_log, table.get(100));
        assert!(rare > common);
    }
}
