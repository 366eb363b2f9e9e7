//! Configuration for the solver connection, display options and buffer policy

use serde::{Deserialize, Serialize};

/// Number of solutions revealed right after a build
pub const DEFAULT_INITIAL_DISPLAY: usize = 3;

/// A build seed smaller than this is treated as the complete solution set
pub const DEFAULT_SEED_FANOUT: usize = 9;

/// Hidden buffer size at which replenishment is triggered
pub const DEFAULT_LOW_WATERMARK: usize = 4;

/// Number of new solutions each replenishment asks for
pub const DEFAULT_REPLENISH_BATCH: usize = 5;

/// Default solver location
pub const DEFAULT_SOLVER_URL: &str = "http://127.0.0.1:8000";

/// Connection settings for the solver service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SOLVER_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl SolverConfig {
    /// Read `PEXPLORE_SOLVER_URL` and `PEXPLORE_TIMEOUT_SECS`, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("PEXPLORE_SOLVER_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Some(secs) = std::env::var("PEXPLORE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Rendering options forwarded to the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Show transition labels in the diagram
    pub display_labels: bool,
    /// Recompute from formula source instead of the serialized automaton
    pub display_atomic_construction: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            display_labels: true,
            display_atomic_construction: false,
        }
    }
}

/// Batch sizes governing how solutions are revealed and prefetched
///
/// Changing any one of these independently shifts the latency/smoothness
/// trade-off, so they are kept together rather than inlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferPolicy {
    pub initial_display: usize,
    pub seed_fanout: usize,
    pub low_watermark: usize,
    pub replenish_batch: usize,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            initial_display: DEFAULT_INITIAL_DISPLAY,
            seed_fanout: DEFAULT_SEED_FANOUT,
            low_watermark: DEFAULT_LOW_WATERMARK,
            replenish_batch: DEFAULT_REPLENISH_BATCH,
        }
    }
}
