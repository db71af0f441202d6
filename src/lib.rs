//! # Deck Series Solver
//!
//! Equilibrium analysis for best-of-N deck series where each winning deck is
//! retired from play.
//!
//! ## Features
//!
//! - **Matrix Game Solver**: Exact value and mixed strategies of any
//!   zero-sum matrix game by simplex pivoting
//! - **Series Recursion**: Full elimination, one deck in reserve, or any
//!   reserve size
//! - **Memoization**: Each subgame is solved once per series
//! - **Parallel Stages**: Continuation values evaluated on the rayon pool
//! - **Opening Reports**: Which deck to queue first, exported as JSON
//!
//! ## Quick Start
//!
//! ```
//! use deck_series_solver::{EndCondition, Matrix, SeriesConfig, SeriesSolver};
//!
//! // Player 1's win probability for each deck pairing
//! let chart = Matrix::new(vec![
//!     vec![0.6, 0.4, 0.55],
//!     vec![0.45, 0.6, 0.5],
//!     vec![0.5, 0.35, 0.65],
//! ]).unwrap();
//!
//! let mut solver = SeriesSolver::new(SeriesConfig::default());
//! let report = solver.report(&chart, EndCondition::ONE_IN_RESERVE).unwrap();
//!
//! assert!(report.win_probability > 0.5);
//! println!("{}", report);
//! ```
//!
//! ## Modules
//!
//! - [`matrix`]: Win rate charts and the matrix game solver
//! - [`series`]: Series recursion, caching, and reports
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         SeriesSolver                            │
//! │  - Subgame recursion      - Memoization by remaining decks      │
//! │  - Stage matrices         - Parallel continuation values        │
//! └─────────────────────────────────────────────────────────────────┘
//!                │                                  │
//!                │ extract_submatrix                │ one game per stage
//!                ▼                                  ▼
//!         ┌─────────────┐                    ┌─────────────┐
//!         │   Matrix    │                    │ GameSolver  │
//!         │   (chart)   │                    │  (pivots)   │
//!         └─────────────┘                    └─────────────┘
//! ```

#![warn(missing_docs)]

/// Matrix game module.
///
/// Win rate charts, submatrix extraction, and the zero-sum game solver.
pub mod matrix;

/// Series module.
///
/// Recursive evaluation of a deck series on top of the matrix game solver.
pub mod series;

// Re-export commonly used types at crate root for convenience
pub use matrix::{
    extract_submatrix, solve_game_equilibrium, solve_game_value, GameSolution, GameSolver, Matrix,
    SolveError, SolverConfig, WinrateChart,
};
pub use series::{solve_series, EndCondition, SeriesConfig, SeriesReport, SeriesSolver, SeriesStats};
