//! Zero-sum matrix games.
//!
//! This module holds the matrix type shared by the whole crate, submatrix
//! extraction, and the equilibrium solver.
//!
//! # Overview
//!
//! A two-player zero-sum game is fully described by one payoff matrix `M`:
//! player 1 chooses a row and wants the payoff high, player 2 chooses a column
//! and wants it low. Under mixed strategies both players can guarantee the
//! same number, the game value:
//!
//! ```text
//! max_x min_j  sum_i x_i M[i][j]  =  min_y max_i  sum_j M[i][j] y_j
//! ```
//!
//! The solver finds `x`, `y` and the value by simplex pivoting on a tableau
//! whose rows and columns are tagged with the player variable they represent.
//!
//! # Example
//!
//! ```
//! use deck_series_solver::matrix::{extract_submatrix, solve_game_value, Matrix};
//!
//! let chart = Matrix::new(vec![
//!     vec![0.5, 0.0, 1.0],
//!     vec![1.0, 0.5, 0.0],
//!     vec![0.0, 1.0, 0.5],
//! ]).unwrap();
//!
//! let value = solve_game_value(&chart).unwrap();
//! assert!((value - 0.5).abs() < 1e-12);
//!
//! let smaller = extract_submatrix(&chart, Some(0), None).unwrap();
//! assert_eq!(smaller.shape(), (2, 3));
//! ```
//!
//! # References
//!
//! - Ferguson, T. S. "Game Theory", Part II, Section 4.5 (the pivoting method).

pub mod chart;
pub mod config;
pub mod error;
pub mod solver;
mod tableau;

pub use chart::{extract_submatrix, Matrix, WinrateChart};
pub use config::{ConfigError, SolverConfig};
pub use error::{ErrorKind, SolveError};
pub use solver::{solve_game_equilibrium, solve_game_value, GameSolution, GameSolver, PrecisionWarning};
pub use tableau::Variable;
