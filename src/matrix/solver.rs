//! Zero-sum matrix game solver.
//!
//! Player 1 picks a row and maximizes, player 2 picks a column and minimizes.
//! The equilibrium is found by simplex pivoting on a [`Tableau`]; single-row
//! and single-column games are read off directly.

use serde::{Deserialize, Serialize};

use crate::matrix::chart::Matrix;
use crate::matrix::config::SolverConfig;
use crate::matrix::error::SolveError;
use crate::matrix::tableau::{Tableau, Variable};

/// A recovered quantity that sits suspiciously close to 0 or 1.
///
/// Warnings never abort a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrecisionWarning {
    /// The game value is within tolerance of 0 or 1 without being on it.
    Value {
        /// The reported value.
        value: f64,
    },
    /// A strategy probability is within tolerance of 0 or 1, or was clamped
    /// back into `[0, 1]`.
    Strategy {
        /// Row (`Player1`) or column (`Player2`) the probability belongs to.
        variable: Variable,
        /// Probability before clamping.
        probability: f64,
    },
}

impl std::fmt::Display for PrecisionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value { value } => write!(f, "game value {:e} is near a boundary", value),
            Self::Strategy {
                variable,
                probability,
            } => write!(f, "{:?} probability {:e} is near a boundary", variable, probability),
        }
    }
}

/// Equilibrium of a zero-sum matrix game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSolution {
    /// Equilibrium value for player 1.
    pub value: f64,
    /// Player 1's mixed strategy over rows.
    pub row_strategy: Vec<f64>,
    /// Player 2's mixed strategy over columns.
    pub column_strategy: Vec<f64>,
    /// Precision warnings raised while recovering the solution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PrecisionWarning>,
}

impl GameSolution {
    /// Index and probability of the most likely row.
    pub fn best_row(&self) -> (usize, f64) {
        argmax(&self.row_strategy)
    }

    /// Index and probability of the most likely column.
    pub fn best_column(&self) -> (usize, f64) {
        argmax(&self.column_strategy)
    }

    /// Rows played with positive probability.
    pub fn row_support(&self) -> Vec<usize> {
        support(&self.row_strategy)
    }

    /// Columns played with positive probability.
    pub fn column_support(&self) -> Vec<usize> {
        support(&self.column_strategy)
    }
}

impl std::fmt::Display for GameSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Value: {:.6}", self.value)?;
        writeln!(f, "Rows:    {}", format_strategy(&self.row_strategy))?;
        write!(f, "Columns: {}", format_strategy(&self.column_strategy))?;
        for warning in &self.warnings {
            write!(f, "\nWarning: {}", warning)?;
        }
        Ok(())
    }
}

fn format_strategy(strategy: &[f64]) -> String {
    let cells: Vec<String> = strategy.iter().map(|p| format!("{:.4}", p)).collect();
    format!("[{}]", cells.join(", "))
}

fn argmax(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best })
}

fn support(strategy: &[f64]) -> Vec<usize> {
    strategy
        .iter()
        .enumerate()
        .filter(|&(_, &p)| p > 0.0)
        .map(|(i, _)| i)
        .collect()
}

/// Solver for two-player zero-sum matrix games.
///
/// # Example
/// ```
/// use deck_series_solver::matrix::{GameSolver, Matrix, SolverConfig};
///
/// let solver = GameSolver::new(SolverConfig::default());
/// let matching_pennies = Matrix::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
///
/// let solution = solver.equilibrium(&matching_pennies).unwrap();
/// assert!((solution.value - 0.5).abs() < 1e-12);
/// assert!((solution.row_strategy[0] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameSolver {
    config: SolverConfig,
}

impl GameSolver {
    /// Create a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Equilibrium value of `matrix` for player 1.
    pub fn value(&self, matrix: &Matrix) -> Result<f64, SolveError> {
        let value = match matrix.shape() {
            (1, _) | (_, 1) => line_solution(matrix)?.0,
            (rows, columns) => {
                let (tableau, pivots) = Tableau::new(matrix)?
                    .optimize(self.config.epsilon, self.config.pivot_limit(rows, columns))?;
                log::debug!("solved {}x{} game in {} pivots", rows, columns, pivots);
                tableau.value()
            }
        };

        let mut warnings = Vec::new();
        let value = self.checked_value(matrix, value, &mut warnings);
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        Ok(value)
    }

    /// Equilibrium value and mixed strategies of `matrix`.
    pub fn equilibrium(&self, matrix: &Matrix) -> Result<GameSolution, SolveError> {
        let (value, row_strategy, column_strategy) = match matrix.shape() {
            (1, _) | (_, 1) => line_solution(matrix)?,
            (rows, columns) => {
                let (tableau, pivots) = Tableau::new(matrix)?
                    .optimize(self.config.epsilon, self.config.pivot_limit(rows, columns))?;
                log::debug!("solved {}x{} game in {} pivots", rows, columns, pivots);
                let (row_strategy, column_strategy) = tableau.strategies();
                (tableau.value(), row_strategy, column_strategy)
            }
        };

        let mut warnings = Vec::new();
        let value = self.checked_value(matrix, value, &mut warnings);
        let row_strategy = self.checked_strategy(row_strategy, Variable::Player1, &mut warnings);
        let column_strategy =
            self.checked_strategy(column_strategy, Variable::Player2, &mut warnings);

        for warning in &warnings {
            log::warn!("{}", warning);
        }

        Ok(GameSolution {
            value,
            row_strategy,
            column_strategy,
            warnings,
        })
    }

    /// Clamp into `[min, max]` of the matrix and flag values close to 0 or 1.
    fn checked_value(
        &self,
        matrix: &Matrix,
        value: f64,
        warnings: &mut Vec<PrecisionWarning>,
    ) -> f64 {
        let value = value.clamp(matrix.min(), matrix.max());
        if self.near_boundary(value) {
            warnings.push(PrecisionWarning::Value { value });
        }
        value
    }

    fn checked_strategy(
        &self,
        strategy: Vec<f64>,
        variable: fn(usize) -> Variable,
        warnings: &mut Vec<PrecisionWarning>,
    ) -> Vec<f64> {
        strategy
            .into_iter()
            .enumerate()
            .map(|(i, probability)| {
                let out_of_range = !(0.0..=1.0).contains(&probability);
                if out_of_range || self.near_boundary(probability) {
                    warnings.push(PrecisionWarning::Strategy {
                        variable: variable(i),
                        probability,
                    });
                }
                probability.clamp(0.0, 1.0)
            })
            .collect()
    }

    fn near_boundary(&self, x: f64) -> bool {
        let tolerance = self.config.warning_tolerance;
        (x != 0.0 && x.abs() < tolerance) || (x != 1.0 && (x - 1.0).abs() < tolerance)
    }
}

/// Solve a game with a single row or a single column without pivoting.
///
/// A lone row leaves player 2 to pick its smallest entry; a lone column leaves
/// player 1 to pick its largest. Earliest index wins ties.
fn line_solution(matrix: &Matrix) -> Result<(f64, Vec<f64>, Vec<f64>), SolveError> {
    if let Some((row, column, _)) = matrix.entries().find(|&(_, _, v)| !v.is_finite()) {
        return Err(SolveError::NonFinite { row, column });
    }

    let (rows, columns) = matrix.shape();
    let mut row_strategy = vec![0.0; rows];
    let mut column_strategy = vec![0.0; columns];

    let (best, value) = if rows == 1 {
        let (j, v) = matrix
            .row(0)
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (j, v)| if v < best.1 { (j, v) } else { best });
        row_strategy[0] = 1.0;
        column_strategy[j] = 1.0;
        (j, v)
    } else {
        let (i, v) = argmax(&matrix.rows().map(|r| r[0]).collect::<Vec<_>>());
        row_strategy[i] = 1.0;
        column_strategy[0] = 1.0;
        (i, v)
    };

    log::trace!("{}x{} game resolved directly at index {}", rows, columns, best);
    Ok((value, row_strategy, column_strategy))
}

/// Equilibrium value of `matrix` with the default configuration.
pub fn solve_game_value(matrix: &Matrix) -> Result<f64, SolveError> {
    GameSolver::default().value(matrix)
}

/// Equilibrium value and strategies of `matrix` with the default configuration.
pub fn solve_game_equilibrium(matrix: &Matrix) -> Result<GameSolution, SolveError> {
    GameSolver::default().equilibrium(matrix)
}
