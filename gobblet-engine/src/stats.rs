//! Search statistics tracking.

use std::time::Duration;

use gobblet_core::Move;
use log::debug;
use web_time::Instant;

/// Format a duration as `1.234s` or `56.7ms`.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 1.0 {
        format!("{:.3}s", secs)
    } else {
        format!("{:.1}ms", secs * 1000.0)
    }
}

/// Statistics collected during one move decision, across all iterations.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Nodes entered (including leaves)
    pub nodes: u64,

    /// Static evaluations (depth limit, terminal, no moves, time expiry)
    pub evaluations: u64,

    /// Results served from the transposition table
    pub cache_hits: u64,

    /// Results written to the transposition table
    pub cache_stores: u64,

    /// Alpha-beta cutoffs
    pub cutoffs: u64,

    /// Nodes cut short by the deadline
    pub timeouts: u64,

    /// Deepest ply reached from the root
    pub max_ply: u32,

    /// For rate calculation
    start_time: Option<Instant>,
}

impl SearchStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|start| start.elapsed()).unwrap_or_default()
    }

    /// Get current nodes per second
    pub fn nodes_per_sec(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.nodes as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Share of expanded nodes that ended in a cutoff, in percent.
    pub fn cutoff_pct(&self) -> f64 {
        let expanded = self.nodes.saturating_sub(self.evaluations + self.cache_hits);
        if expanded > 0 {
            100.0 * self.cutoffs as f64 / expanded as f64
        } else {
            0.0
        }
    }

    /// Log one finished (or interrupted) iteration.
    pub fn log_iteration(&self, depth: u32, score: i32, best: Option<Move>, table_size: usize) {
        let best = best.map(|mov| mov.to_string()).unwrap_or_else(|| "-".to_string());
        debug!(
            "depth={} score={} best={} nodes={} max_ply={} evals={} cache_hits={} table={} cutoffs={:.1}% rate={:.0}/s elapsed={}",
            depth,
            score,
            best,
            self.nodes,
            self.max_ply,
            self.evaluations,
            self.cache_hits,
            table_size,
            self.cutoff_pct(),
            self.nodes_per_sec(),
            format_duration(self.elapsed()),
        );
    }
}
