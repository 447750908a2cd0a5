//! Negamax with alpha-beta pruning, a transposition table and a polled
//! deadline.
//!
//! Scores are always relative to the side to move of the node being
//! searched; a child's score is negated on the way up. When the deadline
//! passes, every active call returns its best-so-far result and nothing
//! partial is written to the table.

use std::cmp::Reverse;

use gobblet_core::{GameResult, GameState, Move};
use web_time::Instant;

use crate::config::{CacheMode, Weights};
use crate::eval::evaluate;
use crate::stats::SearchStats;
use crate::table::TranspositionTable;

/// Window bound standing in for infinity. Safe to negate.
pub const INFINITY: i32 = i32::MAX;

/// Ordering priority: the mover's size, plus the size of the piece it would
/// cover for relocations.
pub fn move_priority(state: &GameState, mov: &Move) -> u8 {
    match mov {
        Move::Supply { piece, .. } => piece.size.value(),
        Move::Relocate { piece, to, .. } => {
            piece.size.value() + state.top(*to).map_or(0, |covered| covered.size.value())
        }
    }
}

/// Sort moves by descending priority. Ties keep generation order.
pub fn order_moves(state: &GameState, moves: &mut [Move]) {
    moves.sort_by_key(|mov| Reverse(move_priority(state, mov)));
}

/// Move `hint` to the front of `moves` if it is one of them.
fn promote(moves: &mut [Move], hint: Option<Move>) {
    if let Some(idx) = hint.and_then(|hint| moves.iter().position(|mov| *mov == hint)) {
        moves[..=idx].rotate_right(1);
    }
}

/// Searcher state for one move decision.
pub struct Searcher {
    weights: Weights,
    table: TranspositionTable,
    deadline: Option<Instant>,
    /// Searched first at the root (best move of the previous iteration).
    root_hint: Option<Move>,
    pub stats: SearchStats,
}

impl Searcher {
    /// `deadline: None` searches without a time limit.
    pub fn new(weights: Weights, cache: CacheMode, deadline: Option<Instant>) -> Self {
        Self {
            weights,
            table: TranspositionTable::new(cache),
            deadline,
            root_hint: None,
            stats: SearchStats::new(),
        }
    }

    #[inline]
    pub fn timed_out(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Search `state` to `depth` with a full window, trying `hint` first.
    ///
    /// Returns the score for the side to move and the best root move, if
    /// any move was searched.
    pub fn search_root(
        &mut self,
        state: &GameState,
        depth: u32,
        hint: Option<Move>,
    ) -> GameResult<(i32, Option<Move>)> {
        self.root_hint = hint;
        self.negamax(state, depth, -INFINITY, INFINITY, 0)
    }

    fn leaf(&mut self, state: &GameState) -> (i32, Option<Move>) {
        self.stats.evaluations += 1;
        (evaluate(state, &self.weights), None)
    }

    fn negamax(
        &mut self,
        state: &GameState,
        depth: u32,
        mut alpha: i32,
        beta: i32,
        ply: u32,
    ) -> GameResult<(i32, Option<Move>)> {
        self.stats.nodes += 1;
        self.stats.max_ply = self.stats.max_ply.max(ply);

        if self.timed_out() {
            self.stats.timeouts += 1;
            return Ok(self.leaf(state));
        }
        if depth == 0 || state.winner().is_some() {
            return Ok(self.leaf(state));
        }

        let key = state.canonical_key();
        let alpha_orig = alpha;
        // Cached moves come from a state with the same key, which may differ
        // in piece ids, so the root never answers from the table.
        if ply > 0 {
            if let Some(hit) = self.table.probe(key, depth, alpha, beta) {
                self.stats.cache_hits += 1;
                return Ok(hit);
            }
        }

        let mut moves = state.generate_moves();
        if moves.is_empty() {
            let (score, _) = self.leaf(state);
            self.table.store(key, depth, alpha_orig, beta, score, None);
            self.stats.cache_stores += 1;
            return Ok((score, None));
        }

        order_moves(state, &mut moves);
        let hint = if ply == 0 {
            self.root_hint
        } else {
            self.table.best_move(key, depth)
        };
        promote(&mut moves, hint);

        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut complete = true;

        for mov in moves {
            let child = state.apply(mov)?;
            let (child_score, _) = self.negamax(&child, depth - 1, -beta, -alpha, ply + 1)?;
            let score = -child_score;

            if best_move.is_none() || score > best_score {
                best_score = score;
                best_move = Some(mov);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
            if self.timed_out() {
                complete = false;
                break;
            }
        }

        if complete {
            self.table.store(key, depth, alpha_orig, beta, best_score, best_move);
            self.stats.cache_stores += 1;
        }
        Ok((best_score, best_move))
    }
}
