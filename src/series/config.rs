//! Configuration and statistics for the series solver.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matrix::{ConfigError, SolverConfig};

/// Configuration for [`SeriesSolver`](crate::series::SeriesSolver).
///
/// # Example
/// ```
/// use deck_series_solver::series::SeriesConfig;
///
/// let config = SeriesConfig::default();
/// assert!(config.memoize); // each subgame is solved once
/// assert!(!config.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Settings for every matrix game solved along the way.
    pub solver: SolverConfig,

    /// Cache subgame results by remaining decks.
    ///
    /// Without the cache the recursion revisits identical subgames and its
    /// cost grows exponentially with chart size.
    pub memoize: bool,

    /// Evaluate the continuation values of one stage on the rayon pool.
    pub parallel: bool,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            memoize: true,
            parallel: false,
        }
    }
}

impl SeriesConfig {
    /// Create a new SeriesConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain recursion with no cache, single-threaded (for comparison/testing).
    pub fn plain() -> Self {
        Self {
            memoize: false,
            parallel: false,
            ..Default::default()
        }
    }

    /// Memoized and parallel, for large charts.
    pub fn parallel() -> Self {
        Self {
            memoize: true,
            parallel: true,
            ..Default::default()
        }
    }

    /// Builder method: set the matrix solver configuration.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Builder method: set whether to memoize subgames.
    pub fn with_memoize(mut self, enable: bool) -> Self {
        self.memoize = enable;
        self
    }

    /// Builder method: set whether to evaluate stages in parallel.
    pub fn with_parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver.validate()
    }
}

/// Statistics from the most recent series solve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Subgame evaluations requested, cache hits included.
    pub subgames: usize,

    /// Requests answered from the cache.
    pub cache_hits: usize,

    /// Distinct subgames held in the cache at the end.
    pub cached_subgames: usize,

    /// Matrix games handed to the game solver.
    pub matrix_games: usize,

    /// Total time spent solving (in seconds).
    pub elapsed_seconds: f64,
}

impl SeriesStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of subgame requests served from the cache.
    pub fn hit_rate(&self) -> f64 {
        if self.subgames == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.subgames as f64
        }
    }
}

impl std::fmt::Display for SeriesStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} subgames ({} cached, {:.1}% hits), {} matrix games, {:.3}s",
            self.subgames,
            self.cached_subgames,
            self.hit_rate() * 100.0,
            self.matrix_games,
            self.elapsed_seconds
        )
    }
}
