//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Weights of the four evaluation terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Top-control size differential.
    pub control: i32,
    /// Mobility differential.
    pub mobility: i32,
    /// Line-potential differential.
    pub lines: i32,
    /// Key-square differential.
    pub key_squares: i32,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            control: 5,
            mobility: 1,
            lines: 5,
            key_squares: 2,
        }
    }
}

/// How the transposition table keys and reuses entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Key on (state, depth, alpha, beta); a hit needs the identical window.
    #[default]
    Window,
    /// Key on (state, depth) and store a bound type with the score.
    Bounded,
    /// No caching.
    #[serde(alias = "off")]
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: Weights,
    pub cache: CacheMode,
    /// Deepest iteration the driver will start.
    pub max_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            weights: Weights::default(),
            cache: CacheMode::default(),
            max_depth: 64,
        }
    }
}
