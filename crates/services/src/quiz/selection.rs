use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{RngCore, SeedableRng};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use quiz_core::model::{Country, CountryCode, GameMode};

/// Per-session selection state.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    /// Unbounded draw from the unknown part of `pool`.
    Learning { pool: Vec<Country> },
    /// Shuffled queue consumed front-to-back; `total` is fixed at start.
    Queue {
        queue: VecDeque<Country>,
        total: usize,
    },
}

impl SelectionState {
    /// Size of the effective pool (learning) or of the initial queue (bounded).
    #[must_use]
    pub fn total(&self) -> usize {
        match self {
            SelectionState::Learning { pool } => pool.len(),
            SelectionState::Queue { total, .. } => *total,
        }
    }

    /// Countries still waiting in a bounded queue. `None` in learning mode.
    #[must_use]
    pub fn remaining(&self) -> Option<usize> {
        match self {
            SelectionState::Learning { .. } => None,
            SelectionState::Queue { queue, .. } => Some(queue.len()),
        }
    }

    /// The effective pool of a learning session. `None` for bounded queues.
    #[must_use]
    pub fn learning_pool(&self) -> Option<&[Country]> {
        match self {
            SelectionState::Learning { pool } => Some(pool),
            SelectionState::Queue { .. } => None,
        }
    }
}

/// Chooses which country comes next, per game mode.
pub struct SelectionPolicy {
    rng: Box<dyn RngCore + Send>,
}

impl SelectionPolicy {
    /// Policy with a `StdRng` seeded from the thread-local generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Policy with an explicit generator (seeded in tests).
    #[must_use]
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// `pool` restricted to `region` and, in custom mode, to `custom`.
    #[must_use]
    pub fn effective_pool(
        pool: &[Country],
        mode: GameMode,
        region: Option<&str>,
        custom: &BTreeSet<CountryCode>,
    ) -> Vec<Country> {
        pool.iter()
            .filter(|c| region.is_none_or(|r| c.in_region(r)))
            .filter(|c| match mode {
                GameMode::Custom => custom.contains(c.code()),
                GameMode::Learning | GameMode::Survival | GameMode::Capital => true,
            })
            .cloned()
            .collect()
    }

    /// Build the selection state for a new session.
    ///
    /// Bounded modes get a uniform permutation (Fisher–Yates) of the effective pool.
    pub fn start(
        &mut self,
        pool: &[Country],
        mode: GameMode,
        region: Option<&str>,
        custom: &BTreeSet<CountryCode>,
    ) -> SelectionState {
        let mut effective = Self::effective_pool(pool, mode, region, custom);
        match mode {
            GameMode::Learning => SelectionState::Learning { pool: effective },
            GameMode::Survival | GameMode::Capital | GameMode::Custom => {
                effective.shuffle(&mut self.rng);
                let total = effective.len();
                SelectionState::Queue {
                    queue: effective.into(),
                    total,
                }
            }
        }
    }

    /// Next country to present, or `None` when the session is exhausted.
    pub fn pick_next(
        &mut self,
        state: &mut SelectionState,
        known: &BTreeSet<CountryCode>,
    ) -> Option<Country> {
        match state {
            SelectionState::Queue { queue, .. } => queue.pop_front(),
            SelectionState::Learning { pool } => {
                let unknown: Vec<&Country> =
                    pool.iter().filter(|c| !known.contains(c.code())).collect();
                unknown.choose(&mut self.rng).map(|c| (*c).clone())
            }
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionPolicy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn country(code: &str, region: &str) -> Country {
        Country::new(CountryCode::new(code).unwrap(), code, "")
            .unwrap()
            .with_region(region)
    }

    fn pool() -> Vec<Country> {
        vec![
            country("FRA", "Europe"),
            country("DEU", "Europe"),
            country("JPN", "Asia"),
            country("KEN", "Africa"),
            country("PER", "Americas"),
        ]
    }

    fn seeded(seed: u64) -> SelectionPolicy {
        SelectionPolicy::with_rng(StdRng::seed_from_u64(seed))
    }

    fn code(raw: &str) -> CountryCode {
        CountryCode::new(raw).unwrap()
    }

    #[test]
    fn bounded_queue_is_a_permutation_and_exhausts() {
        let mut policy = seeded(7);
        let none = BTreeSet::new();
        let mut state = policy.start(&pool(), GameMode::Survival, None, &none);
        assert_eq!(state.total(), 5);

        let mut drawn = Vec::new();
        while let Some(next) = policy.pick_next(&mut state, &none) {
            drawn.push(next.code().clone());
        }
        assert_eq!(drawn.len(), 5);
        let unique: HashSet<_> = drawn.iter().collect();
        assert_eq!(unique.len(), 5);
        assert_eq!(state.remaining(), Some(0));
        assert_eq!(state.total(), 5);
    }

    #[test]
    fn region_filter_applies_to_every_mode() {
        let mut policy = seeded(1);
        let none = BTreeSet::new();
        let state = policy.start(&pool(), GameMode::Capital, Some("europe"), &none);
        assert_eq!(state.total(), 2);

        let state = policy.start(&pool(), GameMode::Learning, Some("Asia"), &none);
        assert_eq!(state.total(), 1);
        let pool = state.learning_pool().unwrap();
        assert_eq!(pool[0].code(), &code("JPN"));
    }

    #[test]
    fn custom_mode_uses_only_the_chosen_subset() {
        let mut policy = seeded(3);
        let chosen: BTreeSet<_> = [code("KEN"), code("PER")].into();
        let mut state = policy.start(&pool(), GameMode::Custom, None, &chosen);
        assert_eq!(state.total(), 2);

        let none = BTreeSet::new();
        let mut drawn = BTreeSet::new();
        while let Some(next) = policy.pick_next(&mut state, &none) {
            drawn.insert(next.code().clone());
        }
        assert_eq!(drawn, chosen);
    }

    #[test]
    fn learning_never_draws_known_countries() {
        let mut policy = seeded(11);
        let known: BTreeSet<_> = [code("FRA"), code("DEU"), code("JPN")].into();
        let mut state = policy.start(&pool(), GameMode::Learning, None, &BTreeSet::new());

        for _ in 0..50 {
            let next = policy.pick_next(&mut state, &known).unwrap();
            assert!(!known.contains(next.code()));
        }
    }

    #[test]
    fn learning_ends_when_everything_is_known() {
        let mut policy = seeded(5);
        let known: BTreeSet<_> = pool().iter().map(|c| c.code().clone()).collect();
        let mut state = policy.start(&pool(), GameMode::Learning, None, &BTreeSet::new());
        assert_eq!(policy.pick_next(&mut state, &known), None);
    }

    #[test]
    fn learning_draw_is_roughly_uniform() {
        let mut policy = seeded(42);
        let none = BTreeSet::new();
        let mut state = policy.start(&pool(), GameMode::Learning, None, &none);
        let mut counts: HashMap<CountryCode, usize> = HashMap::new();
        for _ in 0..5_000 {
            let next = policy.pick_next(&mut state, &none).unwrap();
            *counts.entry(next.code().clone()).or_default() += 1;
        }
        assert_eq!(counts.len(), 5);
        for count in counts.values() {
            assert!((800..=1_200).contains(count), "skewed draw: {counts:?}");
        }
    }

    #[test]
    fn shuffle_positions_are_roughly_uniform() {
        let mut policy = seeded(9);
        let none = BTreeSet::new();
        let mut first: HashMap<CountryCode, usize> = HashMap::new();
        for _ in 0..5_000 {
            let mut state = policy.start(&pool(), GameMode::Survival, None, &none);
            let head = policy.pick_next(&mut state, &none).unwrap();
            *first.entry(head.code().clone()).or_default() += 1;
        }
        for count in first.values() {
            assert!((800..=1_200).contains(count), "biased shuffle: {first:?}");
        }
    }

    #[test]
    fn empty_effective_pool_yields_nothing() {
        let mut policy = seeded(2);
        let none = BTreeSet::new();
        let mut state = policy.start(&pool(), GameMode::Custom, None, &none);
        assert_eq!(state.total(), 0);
        assert_eq!(policy.pick_next(&mut state, &none), None);
    }
}
