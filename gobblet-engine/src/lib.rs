//! Move search for 4x4 Gobblet.
//!
//! The [`Engine`] picks a move for the side to move of a
//! [`gobblet_core::GameState`] within a wall-clock budget: a fixed book move
//! on an empty board, otherwise iterative-deepening negamax with alpha-beta
//! pruning over a per-decision transposition table.
//!
//! ```no_run
//! use std::time::Duration;
//! use gobblet_core::GameState;
//! use gobblet_engine::Engine;
//!
//! let engine = Engine::default();
//! let mov = engine.choose_move(&GameState::new(), Duration::from_secs(1)).unwrap();
//! println!("{:?}", mov);
//! ```

pub mod config;
pub mod engine;
pub mod eval;
pub mod search;
pub mod stats;
pub mod table;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{CacheMode, EngineConfig, Weights};
pub use engine::{budget_from_millis, opening_move, Engine, MoveSource, SearchReport};
pub use eval::{evaluate, WIN};
pub use search::Searcher;
pub use stats::SearchStats;
pub use table::{Bound, TranspositionTable};
