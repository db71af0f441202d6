//! Configuration options for the matrix game solver.

use serde::{Deserialize, Serialize};

/// Configuration for [`GameSolver`](crate::matrix::GameSolver).
///
/// # Example
/// ```
/// use deck_series_solver::matrix::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.epsilon, 1e-12);
/// assert_eq!(config.pivot_limit(3, 3), 24); // 4 * (3 + 3)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Smallest column entry the ratio test treats as positive.
    pub epsilon: f64,

    /// Distance from 0 or 1 at which a recovered value or strategy entry
    /// is reported as a precision warning.
    pub warning_tolerance: f64,

    /// Pivots allowed per `rows + columns` of the game.
    ///
    /// A budget of 1 gives the tight `rows + columns` bound; random games
    /// have been observed to need up to about twice that.
    pub pivot_budget: usize,

    /// Fixed pivot limit overriding `pivot_budget`.
    pub max_pivots: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-12,
            warning_tolerance: 1e-9,
            pivot_budget: 4,
            max_pivots: None,
        }
    }
}

impl SolverConfig {
    /// Create a new SolverConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with the tight `rows + columns` pivot bound.
    ///
    /// Some well-formed games need more pivots than this and will fail with
    /// [`SolveError::NoConvergence`](crate::matrix::SolveError::NoConvergence).
    pub fn strict() -> Self {
        Self {
            pivot_budget: 1,
            ..Default::default()
        }
    }

    /// Builder method: set the ratio-test epsilon.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Builder method: set the precision warning tolerance.
    pub fn with_warning_tolerance(mut self, tolerance: f64) -> Self {
        self.warning_tolerance = tolerance;
        self
    }

    /// Builder method: set the pivot budget per `rows + columns`.
    pub fn with_pivot_budget(mut self, budget: usize) -> Self {
        self.pivot_budget = budget;
        self
    }

    /// Builder method: set a fixed pivot limit.
    pub fn with_max_pivots(mut self, pivots: usize) -> Self {
        self.max_pivots = Some(pivots);
        self
    }

    /// Pivot limit for an `rows x columns` game.
    pub fn pivot_limit(&self, rows: usize, columns: usize) -> usize {
        self.max_pivots.unwrap_or(self.pivot_budget * (rows + columns))
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }

        if !(self.warning_tolerance.is_finite() && self.warning_tolerance >= 0.0) {
            return Err(ConfigError::InvalidTolerance(self.warning_tolerance));
        }

        if self.pivot_budget == 0 || self.max_pivots == Some(0) {
            return Err(ConfigError::InvalidPivotLimit);
        }

        Ok(())
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Ratio-test epsilon is negative or not finite.
    InvalidEpsilon(f64),
    /// Warning tolerance is negative or not finite.
    InvalidTolerance(f64),
    /// Pivot budget or fixed limit of zero.
    InvalidPivotLimit,
    /// Reading a config file failed.
    Io(String),
    /// A config file is not valid JSON for the expected type.
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidEpsilon(val) => {
                write!(f, "Epsilon {} must be finite and non-negative", val)
            }
            ConfigError::InvalidTolerance(val) => {
                write!(f, "Warning tolerance {} must be finite and non-negative", val)
            }
            ConfigError::InvalidPivotLimit => write!(f, "Pivot limit must be at least 1"),
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pivot_limit() {
        let config = SolverConfig::default();
        assert_eq!(config.pivot_limit(3, 4), 28);
        assert_eq!(SolverConfig::strict().pivot_limit(3, 4), 7);
        assert_eq!(config.with_max_pivots(50).pivot_limit(3, 4), 50);
    }

    #[test]
    fn test_validate() {
        assert!(SolverConfig::default().validate().is_ok());
        assert_eq!(
            SolverConfig::default().with_epsilon(-1.0).validate(),
            Err(ConfigError::InvalidEpsilon(-1.0))
        );
        assert!(SolverConfig::default()
            .with_warning_tolerance(f64::NAN)
            .validate()
            .is_err());
        assert_eq!(
            SolverConfig::default().with_max_pivots(0).validate(),
            Err(ConfigError::InvalidPivotLimit)
        );
        assert_eq!(
            SolverConfig::default().with_pivot_budget(0).validate(),
            Err(ConfigError::InvalidPivotLimit)
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SolverConfig = serde_json::from_str(r#"{"max_pivots": 12}"#).unwrap();
        assert_eq!(config.max_pivots, Some(12));
        assert_eq!(config.epsilon, 1e-12);
    }
}
