//! Deck series solved as a tree of matrix games.
//!
//! # Overview
//!
//! Two players each bring a set of decks. Before every game both secretly
//! pick one of their remaining decks; the pairing is played with the win
//! probability from the chart and the winning deck is retired. The first side
//! reduced to its reserve wins the series.
//!
//! The recursion walks from the full chart down to decided positions, solving
//! one matrix game per position, and caches positions by the set of original
//! decks still in play.
//!
//! # Example
//!
//! ```
//! use deck_series_solver::matrix::Matrix;
//! use deck_series_solver::series::{solve_series, EndCondition};
//!
//! let chart = Matrix::new(vec![
//!     vec![0.6, 0.4, 0.55],
//!     vec![0.45, 0.6, 0.5],
//!     vec![0.5, 0.35, 0.65],
//! ]).unwrap();
//!
//! let bo5 = solve_series(&chart, EndCondition::FULL_ELIMINATION).unwrap();
//! let bo3 = solve_series(&chart, EndCondition::ONE_IN_RESERVE).unwrap();
//! assert!((bo5 - 0.52728).abs() < 1e-5);
//! assert!((bo3 - 0.50833).abs() < 1e-5);
//! ```

pub mod cache;
pub mod config;
pub mod end_condition;
pub mod output;
pub mod recursor;

pub use cache::{SubgameCache, SubgameKey};
pub use config::{SeriesConfig, SeriesStats};
pub use end_condition::EndCondition;
pub use output::SeriesReport;
pub use recursor::{solve_series, SeriesSolver, MAX_DECKS};
