//! Recursive decomposition of a deck series into matrix games.
//!
//! Each game of the series is a simultaneous pick: player 1 queues one of the
//! remaining rows, player 2 one of the remaining columns, and the winning deck
//! leaves its owner's pool. The value of a position is therefore the value of
//! a stage matrix whose cells are
//!
//! ```text
//! stage[i][j] = p[i][j] * V(without row i) + (1 - p[i][j]) * V(without column j)
//! ```
//!
//! with `V = 1` once player 1 is down to the reserve and `V = 0` once player 2
//! is. Continuation values depend only on which deck won, so each stage needs
//! one value per row and one per column rather than one per cell.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::matrix::{extract_submatrix, GameSolver, Matrix, SolveError};
use crate::series::cache::{SubgameCache, SubgameKey};
use crate::series::config::{SeriesConfig, SeriesStats};
use crate::series::end_condition::EndCondition;
use crate::series::output::SeriesReport;

/// Largest number of decks per side; subgame keys are 64-bit sets.
pub const MAX_DECKS: usize = 64;

/// Solver for the equilibrium win probability of a deck series.
///
/// # Example
/// ```
/// use deck_series_solver::matrix::Matrix;
/// use deck_series_solver::series::{EndCondition, SeriesConfig, SeriesSolver};
///
/// let chart = Matrix::filled(3, 3, 0.7).unwrap();
/// let mut solver = SeriesSolver::new(SeriesConfig::default());
///
/// // Best of 3: win two games before the opponent does
/// let p = solver.solve(&chart, EndCondition::ONE_IN_RESERVE).unwrap();
/// assert!((p - 0.784).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeriesSolver {
    /// Configuration for the solver.
    config: SeriesConfig,

    /// Solver for every stage matrix.
    games: GameSolver,

    /// Statistics from the last solve.
    stats: SeriesStats,
}

impl SeriesSolver {
    /// Create a new series solver.
    pub fn new(config: SeriesConfig) -> Self {
        let games = GameSolver::new(config.solver.clone());
        Self {
            config,
            games,
            stats: SeriesStats::new(),
        }
    }

    /// Player 1's probability of winning the series under optimal play.
    ///
    /// # Errors
    /// Invalid charts and end conditions fail with an
    /// [`ErrorKind::InvalidInput`](crate::matrix::ErrorKind::InvalidInput)
    /// error; the first failing stage aborts the whole solve.
    pub fn solve(&mut self, chart: &Matrix, end: EndCondition) -> Result<f64, SolveError> {
        let start = Instant::now();
        let run = self.start_run(chart, end)?;

        let value = run.win_probability(&Subgame::root(chart))?;

        self.stats = run.finish(start);
        log::info!(
            "{}x{} series ({}): {:.6} in {}",
            chart.num_rows(),
            chart.num_columns(),
            end,
            value,
            self.stats
        );
        Ok(value)
    }

    /// Solve the series and return the opening stage with both players'
    /// equilibrium strategies for the first game.
    pub fn report(&mut self, chart: &Matrix, end: EndCondition) -> Result<SeriesReport, SolveError> {
        let start = Instant::now();
        let run = self.start_run(chart, end)?;

        let stage = run.stage_matrix(&Subgame::root(chart))?;
        let opening = self.games.equilibrium(&stage)?;
        run.matrix_games.fetch_add(1, Ordering::Relaxed);

        self.stats = run.finish(start);
        log::info!(
            "{}x{} series ({}) opening solved: {:.6} in {}",
            chart.num_rows(),
            chart.num_columns(),
            end,
            opening.value,
            self.stats
        );

        Ok(SeriesReport {
            end_condition: end,
            win_probability: opening.value,
            chart: chart.clone(),
            stage,
            opening,
            stats: self.stats.clone(),
        })
    }

    /// Get statistics from the most recent solve.
    pub fn stats(&self) -> &SeriesStats {
        &self.stats
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    fn start_run(&self, chart: &Matrix, end: EndCondition) -> Result<Run<'_>, SolveError> {
        validate_series(chart, end)?;

        let cache = self.config.memoize.then(|| {
            // Every (row subset, column subset) pair is a potential subgame
            let reachable = 1usize
                .checked_shl((chart.num_rows() + chart.num_columns()) as u32)
                .unwrap_or(usize::MAX);
            SubgameCache::with_capacity(reachable.min(1 << 16))
        });

        Ok(Run {
            games: &self.games,
            reserve: end.reserve(),
            parallel: self.config.parallel,
            cache,
            subgames: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            matrix_games: AtomicUsize::new(0),
        })
    }
}

/// Player 1's equilibrium probability of winning the series, default settings.
///
/// # Example
/// ```
/// use deck_series_solver::matrix::Matrix;
/// use deck_series_solver::series::{solve_series, EndCondition};
///
/// let chart = Matrix::new(vec![vec![0.42]]).unwrap();
/// assert_eq!(solve_series(&chart, EndCondition::FULL_ELIMINATION).unwrap(), 0.42);
/// ```
pub fn solve_series(chart: &Matrix, end: EndCondition) -> Result<f64, SolveError> {
    SeriesSolver::default().solve(chart, end)
}

/// Reject charts the recursion cannot start from.
fn validate_series(chart: &Matrix, end: EndCondition) -> Result<(), SolveError> {
    chart.validate_probabilities()?;

    let (rows, columns) = chart.shape();
    if rows <= end.reserve() || columns <= end.reserve() {
        return Err(SolveError::SeriesAlreadyDecided {
            rows,
            columns,
            reserve: end.reserve(),
        });
    }

    let decks = rows.max(columns);
    if decks > MAX_DECKS {
        return Err(SolveError::TooManyDecks {
            decks,
            max: MAX_DECKS,
        });
    }

    Ok(())
}

/// A position in the series: the remaining chart and which original decks
/// its rows and columns are.
#[derive(Debug, Clone)]
struct Subgame {
    chart: Matrix,
    rows: Vec<usize>,
    columns: Vec<usize>,
}

impl Subgame {
    fn root(chart: &Matrix) -> Self {
        Self {
            chart: chart.clone(),
            rows: (0..chart.num_rows()).collect(),
            columns: (0..chart.num_columns()).collect(),
        }
    }

    fn key(&self, reserve: usize) -> SubgameKey {
        SubgameKey::new(&self.rows, &self.columns, reserve)
    }

    /// Player 1's deck `i` has won and leaves the pool.
    fn without_row(&self, i: usize) -> Result<Self, SolveError> {
        let mut rows = self.rows.clone();
        rows.remove(i);
        Ok(Self {
            chart: extract_submatrix(&self.chart, Some(i), None)?,
            rows,
            columns: self.columns.clone(),
        })
    }

    /// Player 2's deck `j` has won and leaves the pool.
    fn without_column(&self, j: usize) -> Result<Self, SolveError> {
        let mut columns = self.columns.clone();
        columns.remove(j);
        Ok(Self {
            chart: extract_submatrix(&self.chart, None, Some(j))?,
            rows: self.rows.clone(),
            columns,
        })
    }
}

/// State shared by every subgame of one solve.
struct Run<'a> {
    games: &'a GameSolver,
    reserve: usize,
    parallel: bool,
    cache: Option<SubgameCache>,
    subgames: AtomicUsize,
    cache_hits: AtomicUsize,
    matrix_games: AtomicUsize,
}

impl Run<'_> {
    fn win_probability(&self, game: &Subgame) -> Result<f64, SolveError> {
        self.subgames.fetch_add(1, Ordering::Relaxed);

        let key = game.key(self.reserve);
        if let Some(value) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        let value = self.evaluate(game)?;
        log::trace!(
            "subgame rows {:#b} columns {:#b}: {:.6}",
            key.rows,
            key.columns,
            value
        );

        if let Some(cache) = &self.cache {
            cache.insert(key, value);
        }
        Ok(value)
    }

    fn evaluate(&self, game: &Subgame) -> Result<f64, SolveError> {
        let chart = &game.chart;
        let (rows, columns) = chart.shape();
        let first = chart[(0, 0)];

        match (rows - self.reserve, columns - self.reserve) {
            // Last deck against last deck
            (1, 1) if self.reserve == 0 => Ok(first),
            // Player 1's last deck gets a shot at every remaining opponent
            (1, _) if self.reserve == 0 => {
                Ok(first + (1.0 - first) * self.after_column_win(game, 0)?)
            }
            // Every player 1 deck must beat player 2's last deck
            (_, 1) if self.reserve == 0 => Ok(first * self.after_row_win(game, 0)?),
            // Next game decides the series
            (1, 1) => self.solve_stage(chart),
            _ => {
                let stage = self.stage_matrix(game)?;
                self.solve_stage(&stage)
            }
        }
    }

    /// Stage matrix for the next game of `game`.
    fn stage_matrix(&self, game: &Subgame) -> Result<Matrix, SolveError> {
        let (rows, columns) = game.chart.shape();

        let (row_wins, column_wins) = if self.parallel {
            rayon::join(
                || {
                    (0..rows)
                        .into_par_iter()
                        .map(|i| self.after_row_win(game, i))
                        .collect::<Result<Vec<f64>, SolveError>>()
                },
                || {
                    (0..columns)
                        .into_par_iter()
                        .map(|j| self.after_column_win(game, j))
                        .collect::<Result<Vec<f64>, SolveError>>()
                },
            )
        } else {
            (
                (0..rows).map(|i| self.after_row_win(game, i)).collect(),
                (0..columns).map(|j| self.after_column_win(game, j)).collect(),
            )
        };
        let (row_wins, column_wins) = (row_wins?, column_wins?);

        Matrix::from_fn(rows, columns, |i, j| {
            let p = game.chart[(i, j)];
            p * row_wins[i] + (1.0 - p) * column_wins[j]
        })
    }

    /// Series value once player 1's deck `i` has won.
    fn after_row_win(&self, game: &Subgame, i: usize) -> Result<f64, SolveError> {
        if game.rows.len() - 1 <= self.reserve {
            return Ok(1.0);
        }
        self.win_probability(&game.without_row(i)?)
    }

    /// Series value once player 2's deck `j` has won.
    fn after_column_win(&self, game: &Subgame, j: usize) -> Result<f64, SolveError> {
        if game.columns.len() - 1 <= self.reserve {
            return Ok(0.0);
        }
        self.win_probability(&game.without_column(j)?)
    }

    fn solve_stage(&self, stage: &Matrix) -> Result<f64, SolveError> {
        self.matrix_games.fetch_add(1, Ordering::Relaxed);
        self.games.value(stage)
    }

    fn finish(self, start: Instant) -> SeriesStats {
        SeriesStats {
            subgames: self.subgames.into_inner(),
            cache_hits: self.cache_hits.into_inner(),
            cached_subgames: self.cache.as_ref().map_or(0, SubgameCache::len),
            matrix_games: self.matrix_games.into_inner(),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{solve_game_value, ErrorKind, SolverConfig};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn chart(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::new(rows).unwrap()
    }

    fn sample_3x3() -> Matrix {
        chart(vec![
            vec![0.6, 0.4, 0.55],
            vec![0.45, 0.6, 0.5],
            vec![0.5, 0.35, 0.65],
        ])
    }

    fn sample_4x4() -> Matrix {
        chart(vec![
            vec![0.6, 0.4, 0.55, 0.5],
            vec![0.45, 0.6, 0.5, 0.4],
            vec![0.5, 0.35, 0.65, 0.6],
            vec![0.7, 0.5, 0.5, 0.45],
        ])
    }

    fn random_chart(rng: &mut StdRng, rows: usize, columns: usize) -> Matrix {
        Matrix::from_fn(rows, columns, |_, _| rng.gen::<f64>()).unwrap()
    }

    /// P(at least `wins` successes before `losses` failures) for a fixed p.
    fn race(p: f64, wins: u32, losses: u32) -> f64 {
        if wins == 0 {
            return 1.0;
        }
        if losses == 0 {
            return 0.0;
        }
        p * race(p, wins - 1, losses) + (1.0 - p) * race(p, wins, losses - 1)
    }

    #[test]
    fn test_single_matchup_is_exact() {
        for p in [0.0, 0.13, 0.5, 0.999, 1.0] {
            let value = solve_series(&chart(vec![vec![p]]), EndCondition::FULL_ELIMINATION);
            assert_eq!(value.unwrap(), p);
        }
    }

    #[test]
    fn test_identity_with_reserve() {
        let value = solve_series(
            &chart(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            EndCondition::ONE_IN_RESERVE,
        )
        .unwrap();
        assert_abs_diff_eq!(value, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_one_deck_left_closed_forms() {
        // Player 1 needs one win from a single deck
        let one_row = chart(vec![vec![0.6, 0.3]]);
        let value = solve_series(&one_row, EndCondition::FULL_ELIMINATION).unwrap();
        assert_abs_diff_eq!(value, 1.0 - 0.4 * 0.7, epsilon = 1e-12);

        // Every player 1 deck must beat the single opponent deck
        let one_column = chart(vec![vec![0.6], vec![0.3]]);
        let value = solve_series(&one_column, EndCondition::FULL_ELIMINATION).unwrap();
        assert_abs_diff_eq!(value, 0.18, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_charts_match_binomial_race() {
        for decks in 1..=4u32 {
            for p in [0.3, 0.5, 0.7] {
                let uniform = Matrix::filled(decks as usize, decks as usize, p).unwrap();

                let full = solve_series(&uniform, EndCondition::FULL_ELIMINATION).unwrap();
                assert_abs_diff_eq!(full, race(p, decks, decks), epsilon = 1e-9);

                if decks >= 2 {
                    let reserve = solve_series(&uniform, EndCondition::ONE_IN_RESERVE).unwrap();
                    assert_abs_diff_eq!(reserve, race(p, decks - 1, decks - 1), epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_uneven_deck_counts() {
        // 2 decks against 3 with a coin flip every game
        let uniform = Matrix::filled(2, 3, 0.5).unwrap();
        let value = solve_series(&uniform, EndCondition::FULL_ELIMINATION).unwrap();
        assert_abs_diff_eq!(value, race(0.5, 2, 3), epsilon = 1e-9);

        // Player 1 needs one win, player 2 needs two
        let two_rows = sample_3x3().without(Some(2), None).unwrap();
        let value = solve_series(&two_rows, EndCondition::ONE_IN_RESERVE).unwrap();
        assert!(value > 0.0 && value < 1.0);
    }

    #[test]
    fn test_known_values() {
        let full = solve_series(&sample_3x3(), EndCondition::FULL_ELIMINATION).unwrap();
        assert_abs_diff_eq!(full, 0.5272799112694312, epsilon = 1e-9);

        let reserve = solve_series(&sample_3x3(), EndCondition::ONE_IN_RESERVE).unwrap();
        assert_abs_diff_eq!(reserve, 0.5083311419121788, epsilon = 1e-9);

        let four = solve_series(&sample_4x4(), EndCondition::FULL_ELIMINATION).unwrap();
        assert_abs_diff_eq!(four, 0.5391000336319289, epsilon = 1e-9);

        let four_two = solve_series(&sample_4x4(), EndCondition::with_reserve(2)).unwrap();
        assert_abs_diff_eq!(four_two, 0.5057340360952909, epsilon = 1e-9);
    }

    #[test]
    fn test_two_by_two_with_reserve_is_game_value() {
        let m = chart(vec![vec![0.8, 0.2], vec![0.3, 0.6]]);
        let series = solve_series(&m, EndCondition::ONE_IN_RESERVE).unwrap();
        assert_eq!(series, solve_game_value(&m).unwrap());
    }

    #[test]
    fn test_memoized_plain_and_parallel_agree() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10 {
            let rows = rng.gen_range(2..=4);
            let columns = rng.gen_range(2..=4);
            let m = random_chart(&mut rng, rows, columns);

            for end in [EndCondition::FULL_ELIMINATION, EndCondition::ONE_IN_RESERVE] {
                let memo = SeriesSolver::new(SeriesConfig::default()).solve(&m, end).unwrap();
                let plain = SeriesSolver::new(SeriesConfig::plain()).solve(&m, end).unwrap();
                let parallel = SeriesSolver::new(SeriesConfig::parallel()).solve(&m, end).unwrap();
                assert_abs_diff_eq!(memo, plain, epsilon = 1e-12);
                assert_abs_diff_eq!(memo, parallel, epsilon = 1e-12);
                assert!((0.0..=1.0).contains(&memo));
            }
        }
    }

    #[test]
    fn test_memoization_reduces_work() {
        let m = sample_4x4();

        let mut memo = SeriesSolver::new(SeriesConfig::default());
        memo.solve(&m, EndCondition::FULL_ELIMINATION).unwrap();

        let mut plain = SeriesSolver::new(SeriesConfig::plain());
        plain.solve(&m, EndCondition::FULL_ELIMINATION).unwrap();

        assert!(memo.stats().cache_hits > 0);
        assert_eq!(plain.stats().cache_hits, 0);
        assert_eq!(plain.stats().cached_subgames, 0);
        assert!(memo.stats().matrix_games < plain.stats().matrix_games);

        // One stage per (row subset, column subset) with both sides above the reserve
        assert!(memo.stats().cached_subgames <= 16 * 16);
    }

    #[test]
    fn test_swapping_players_complements_value() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..10 {
            let rows = rng.gen_range(2..=4);
            let columns = rng.gen_range(2..=4);
            let m = random_chart(&mut rng, rows, columns);
            let swapped = Matrix::from_fn(columns, rows, |i, j| 1.0 - m[(j, i)]).unwrap();

            for end in [EndCondition::FULL_ELIMINATION, EndCondition::ONE_IN_RESERVE] {
                let value = solve_series(&m, end).unwrap();
                let other = solve_series(&swapped, end).unwrap();
                assert_abs_diff_eq!(value + other, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let bad = chart(vec![vec![0.5, 1.2]]);
        let err = solve_series(&bad, EndCondition::FULL_ELIMINATION).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        // A single deck cannot be held in reserve and still play
        let err = solve_series(&chart(vec![vec![0.5, 0.5]]), EndCondition::ONE_IN_RESERVE)
            .unwrap_err();
        assert_eq!(
            err,
            SolveError::SeriesAlreadyDecided {
                rows: 1,
                columns: 2,
                reserve: 1
            }
        );

        let wide = Matrix::filled(1, 65, 0.5).unwrap();
        assert_eq!(
            solve_series(&wide, EndCondition::FULL_ELIMINATION).unwrap_err(),
            SolveError::TooManyDecks { decks: 65, max: 64 }
        );
    }

    #[test]
    fn test_stage_failure_aborts_solve() {
        let config = SeriesConfig::default().with_solver(SolverConfig::default().with_max_pivots(1));
        let mut solver = SeriesSolver::new(config);
        let identity = chart(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let err = solver.solve(&identity, EndCondition::ONE_IN_RESERVE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Convergence);
    }

    #[test]
    fn test_report_matches_solve() {
        for end in [EndCondition::FULL_ELIMINATION, EndCondition::ONE_IN_RESERVE] {
            let mut solver = SeriesSolver::new(SeriesConfig::default());
            let value = solver.solve(&sample_3x3(), end).unwrap();
            let report = solver.report(&sample_3x3(), end).unwrap();

            assert_abs_diff_eq!(report.win_probability, value, epsilon = 1e-12);
            assert_eq!(report.stage.shape(), (3, 3));
            assert_eq!(report.opening.row_strategy.len(), 3);
            assert_abs_diff_eq!(
                report.opening.row_strategy.iter().sum::<f64>(),
                1.0,
                epsilon = 1e-9
            );
        }
    }
}
