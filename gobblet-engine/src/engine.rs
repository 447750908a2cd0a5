//! Iterative-deepening driver.

use std::time::Duration;

use gobblet_core::{GameResult, GameState, Move, Pos, Size};
use log::{debug, info};
use web_time::Instant;

use crate::config::EngineConfig;
use crate::eval::WIN;
use crate::search::{order_moves, Searcher};
use crate::stats::{format_duration, SearchStats};

/// Fixed first move on an empty board: a large piece at (row 1, col 2).
pub const OPENING_CELL: Pos = Pos(6);

/// Where the chosen move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// Empty board, no search.
    Opening,
    /// Best move of the deepest iteration that returned one.
    Search,
    /// No iteration returned a move before the deadline.
    Fallback,
    /// Game already won, or the side to move has no legal move.
    NoMove,
}

/// Result of one move decision, with diagnostics.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub best_move: Option<Move>,
    /// Score of `best_move` for the side to move, when it came from search.
    pub score: Option<i32>,
    /// Deepest iteration that returned a move (0 if none).
    pub depth: u32,
    pub source: MoveSource,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// The book move for an empty board, if the mover still has a large piece.
pub fn opening_move(state: &GameState) -> Option<Move> {
    if !state.is_board_empty() {
        return None;
    }
    let piece = state.supply(state.current_player()).first_unused(Size::Large)?;
    Some(Move::Supply {
        piece,
        to: OPENING_CELL,
    })
}

/// Budget for a millisecond time limit coming from JavaScript. NaN and
/// negative limits give no time; limits too large for a `Duration` give
/// `Duration::MAX`, which means no deadline.
pub fn budget_from_millis(millis: f64) -> Duration {
    match Duration::try_from_secs_f64(millis / 1000.0) {
        Ok(budget) => budget,
        Err(_) if millis > 0.0 => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}

/// First legal move in ordering priority.
fn fallback_move(state: &GameState) -> Option<Move> {
    let mut moves = state.generate_moves();
    order_moves(state, &mut moves);
    moves.first().copied()
}

pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Choose a move for the side to move within `budget`.
    ///
    /// `Ok(None)` means there is nothing to play: the game is already won
    /// or the side to move has no legal move.
    pub fn choose_move(&self, state: &GameState, budget: Duration) -> GameResult<Option<Move>> {
        Ok(self.search(state, budget)?.best_move)
    }

    /// Same as [`Engine::choose_move`], returning diagnostics as well.
    pub fn search(&self, state: &GameState, budget: Duration) -> GameResult<SearchReport> {
        let start = Instant::now();
        let mover = state.current_player();

        if let Some(mov) = opening_move(state) {
            info!("player {} plays opening move {}", mover, mov);
            let stats = SearchStats::new();
            return Ok(self.report(Some(mov), None, 0, MoveSource::Opening, stats, start));
        }
        if state.winner().is_some() {
            info!("game is already over, nothing to play");
            return Ok(self.report(None, None, 0, MoveSource::NoMove, SearchStats::new(), start));
        }

        let deadline = start.checked_add(budget);
        let mut searcher = Searcher::new(self.config.weights, self.config.cache, deadline);
        debug!(
            "searching up to depth {} with {:?} cache",
            self.config.max_depth,
            searcher.table().mode()
        );
        let mut best: Option<(Move, i32, u32)> = None;

        for depth in 1..=self.config.max_depth.max(1) {
            if searcher.timed_out() {
                break;
            }
            let hint = best.map(|(mov, _, _)| mov);
            let (score, mov) = searcher.search_root(state, depth, hint)?;
            searcher.stats.log_iteration(depth, score, mov, searcher.table().len());

            let Some(mov) = mov else {
                // Root had no legal move, or the deadline hit before one was searched.
                break;
            };
            best = Some((mov, score, depth));
            if searcher.timed_out() || score.abs() >= WIN {
                break;
            }
        }

        let stats = searcher.stats;
        let report = match best {
            Some((mov, score, depth)) => {
                self.report(Some(mov), Some(score), depth, MoveSource::Search, stats, start)
            }
            None => match fallback_move(state) {
                Some(mov) => {
                    debug!("no iteration finished in {:?}, using fallback", budget);
                    self.report(Some(mov), None, 0, MoveSource::Fallback, stats, start)
                }
                None => self.report(None, None, 0, MoveSource::NoMove, stats, start),
            },
        };

        match report.best_move {
            Some(mov) => info!(
                "player {} plays {} (depth {}, score {:?}, {} nodes in {})",
                mover,
                mov,
                report.depth,
                report.score,
                report.stats.nodes,
                format_duration(report.elapsed),
            ),
            None => info!("player {} has no legal move", mover),
        }
        Ok(report)
    }

    fn report(
        &self,
        best_move: Option<Move>,
        score: Option<i32>,
        depth: u32,
        source: MoveSource,
        stats: SearchStats,
        start: Instant,
    ) -> SearchReport {
        SearchReport {
            best_move,
            score,
            depth,
            source,
            stats,
            elapsed: start.elapsed(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gobblet_core::Player;

    #[test]
    fn test_opening_move() {
        let state = GameState::new();
        let mov = opening_move(&state).unwrap();
        assert_eq!(mov.to(), Pos::from_row_col(1, 2));
        assert_eq!(mov.piece().size, Size::Large);
        assert_eq!(mov.piece().owner, Player::One);
        assert!(state.apply(mov).is_ok());

        // Player Two facing an empty board gets the same book move.
        let state = state.with_current_player(Player::Two);
        assert_eq!(opening_move(&state).unwrap().piece().owner, Player::Two);
    }

    #[test]
    fn test_no_opening_after_first_move() {
        let state = GameState::new();
        let state = state.apply(opening_move(&state).unwrap()).unwrap();
        assert_eq!(opening_move(&state), None);
    }

    #[test]
    fn test_opening_report() {
        let report = Engine::default().search(&GameState::new(), Duration::ZERO).unwrap();
        assert_eq!(report.source, MoveSource::Opening);
        assert_eq!(report.depth, 0);
        assert_eq!(report.stats.nodes, 0);
    }

    #[test]
    fn test_fallback_is_highest_priority() {
        let state = GameState::new();
        let state = state.apply(opening_move(&state).unwrap()).unwrap();
        let mov = fallback_move(&state).unwrap();
        assert_eq!(mov.piece().size, Size::Large);
        assert_eq!(mov.piece().owner, Player::Two);
    }

    #[test]
    fn test_budget_from_millis() {
        assert_eq!(budget_from_millis(1500.0), Duration::from_millis(1500));
        assert_eq!(budget_from_millis(0.0), Duration::ZERO);
        assert_eq!(budget_from_millis(-20.0), Duration::ZERO);
        assert_eq!(budget_from_millis(f64::NAN), Duration::ZERO);
        assert_eq!(budget_from_millis(f64::INFINITY), Duration::MAX);
        assert_eq!(budget_from_millis(1e300), Duration::MAX);
        let unbounded = budget_from_millis(f64::INFINITY);
        assert_eq!(Instant::now().checked_add(unbounded), None);
    }

    #[test]
    fn test_unbounded_budget_searches() {
        let config = EngineConfig {
            max_depth: 2,
            ..EngineConfig::default()
        };
        let state = GameState::new();
        let state = state.apply(opening_move(&state).unwrap()).unwrap();
        let report = Engine::new(config)
            .search(&state, budget_from_millis(f64::INFINITY))
            .unwrap();
        assert_eq!(report.source, MoveSource::Search);
        assert_eq!(report.depth, 2);
    }

    #[test]
    fn test_max_depth_caps_iterations() {
        let config = EngineConfig {
            max_depth: 1,
            ..EngineConfig::default()
        };
        let state = GameState::new();
        let state = state.apply(opening_move(&state).unwrap()).unwrap();
        let engine = Engine::new(config);
        assert_eq!(engine.config().max_depth, 1);
        let report = engine.search(&state, Duration::from_secs(600)).unwrap();
        assert_eq!(report.source, MoveSource::Search);
        assert_eq!(report.depth, 1);
        assert!(report.score.is_some());
    }
}
