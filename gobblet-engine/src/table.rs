//! Transposition table.
//!
//! One table lives for a single move decision and is shared by every
//! iteration of that decision. Two keying schemes are supported, see
//! [`CacheMode`]:
//!
//! - `Window`: key `(state, depth, alpha, beta)`. An entry is only ever
//!   produced and consulted under the exact same window, so the stored
//!   score is returned verbatim.
//! - `Bounded`: key `(state, depth)` with a bound type, probed the usual
//!   way (exact, fail-high, fail-low).

use std::collections::HashMap;

use gobblet_core::{Move, StateKey};
use log::trace;

use crate::config::CacheMode;

/// How a stored score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The sweep finished inside the window.
    Exact,
    /// Fail-high: true value >= score.
    Lower,
    /// Fail-low: true value <= score.
    Upper,
}

impl Bound {
    /// Classify a finished sweep against the window it was searched with.
    pub fn classify(score: i32, alpha: i32, beta: i32) -> Bound {
        if score <= alpha {
            Bound::Upper
        } else if score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

pub struct TranspositionTable {
    mode: CacheMode,
    window: HashMap<(StateKey, u32, i32, i32), (i32, Option<Move>)>,
    bounded: HashMap<(StateKey, u32), Entry>,
}

impl TranspositionTable {
    pub fn new(mode: CacheMode) -> Self {
        trace!("new {:?} transposition table", mode);
        Self {
            mode,
            window: HashMap::new(),
            bounded: HashMap::new(),
        }
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.window.len() + self.bounded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a usable result for `key` searched to `depth` with the window
    /// `(alpha, beta)`.
    pub fn probe(
        &self,
        key: StateKey,
        depth: u32,
        alpha: i32,
        beta: i32,
    ) -> Option<(i32, Option<Move>)> {
        match self.mode {
            CacheMode::Window => self.window.get(&(key, depth, alpha, beta)).copied(),
            CacheMode::Bounded => {
                let entry = self.bounded.get(&(key, depth))?;
                let usable = match entry.bound {
                    Bound::Exact => true,
                    Bound::Lower => entry.score >= beta,
                    Bound::Upper => entry.score <= alpha,
                };
                usable.then_some((entry.score, entry.best_move))
            }
            CacheMode::Disabled => None,
        }
    }

    /// Best move stored for `key` at `depth`, whether or not its score is
    /// usable for the current window. Only the bounded scheme keeps one.
    pub fn best_move(&self, key: StateKey, depth: u32) -> Option<Move> {
        match self.mode {
            CacheMode::Bounded => self.bounded.get(&(key, depth))?.best_move,
            _ => None,
        }
    }

    /// Record the result of a completed sweep. `alpha` and `beta` are the
    /// window the node was entered with.
    pub fn store(
        &mut self,
        key: StateKey,
        depth: u32,
        alpha: i32,
        beta: i32,
        score: i32,
        best_move: Option<Move>,
    ) {
        match self.mode {
            CacheMode::Window => {
                self.window.insert((key, depth, alpha, beta), (score, best_move));
            }
            CacheMode::Bounded => {
                let bound = Bound::classify(score, alpha, beta);
                let entry = Entry {
                    score,
                    bound,
                    best_move,
                };
                self.bounded.insert((key, depth), entry);
            }
            CacheMode::Disabled => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gobblet_core::GameState;

    fn key() -> StateKey {
        GameState::new().canonical_key()
    }

    #[test]
    fn test_window_needs_identical_window() {
        let mut tt = TranspositionTable::new(CacheMode::Window);
        tt.store(key(), 3, -10, 10, 4, None);
        assert_eq!(tt.probe(key(), 3, -10, 10), Some((4, None)));
        assert_eq!(tt.probe(key(), 3, -10, 11), None);
        assert_eq!(tt.probe(key(), 2, -10, 10), None);
        assert_eq!(tt.best_move(key(), 3), None);
    }

    #[test]
    fn test_bounded_probe() {
        let mut tt = TranspositionTable::new(CacheMode::Bounded);

        // Fail-high at 50 with beta 40: usable only when 50 >= beta.
        tt.store(key(), 2, 0, 40, 50, None);
        assert_eq!(tt.probe(key(), 2, 0, 40), Some((50, None)));
        assert_eq!(tt.probe(key(), 2, 0, 60), None);

        // Fail-low at -5 with alpha 0: usable only when -5 <= alpha.
        tt.store(key(), 2, 0, 40, -5, None);
        assert_eq!(tt.probe(key(), 2, -3, 40), Some((-5, None)));
        assert_eq!(tt.probe(key(), 2, -20, 40), None);

        // Exact is always usable at the same depth.
        tt.store(key(), 2, 0, 40, 7, None);
        assert_eq!(tt.probe(key(), 2, 100, 200), Some((7, None)));
        assert_eq!(tt.probe(key(), 1, 0, 40), None);
    }

    #[test]
    fn test_bounded_keeps_best_move() {
        let state = GameState::new();
        let mov = state.generate_moves()[0];
        let mut tt = TranspositionTable::new(CacheMode::Bounded);
        tt.store(key(), 4, 0, 10, 20, Some(mov));
        assert_eq!(tt.best_move(key(), 4), Some(mov));
        assert_eq!(tt.probe(key(), 4, 0, 30), None);
    }

    #[test]
    fn test_disabled_stores_nothing() {
        let mut tt = TranspositionTable::new(CacheMode::Disabled);
        tt.store(key(), 1, 0, 1, 0, None);
        assert!(tt.is_empty());
        assert_eq!(tt.probe(key(), 1, 0, 1), None);

        let mut tt = TranspositionTable::new(CacheMode::Window);
        assert_eq!(tt.mode(), CacheMode::Window);
        tt.store(key(), 1, 0, 1, 0, None);
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Bound::classify(-1, 0, 10), Bound::Upper);
        assert_eq!(Bound::classify(0, 0, 10), Bound::Upper);
        assert_eq!(Bound::classify(5, 0, 10), Bound::Exact);
        assert_eq!(Bound::classify(10, 0, 10), Bound::Lower);
    }
}
