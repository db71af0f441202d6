//! Simplex tableau for two-player zero-sum matrix games.
//!
//! The payoff block is shifted so every entry is at least 1, then the game is
//! solved as the linear program `max sum(q) s.t. A q <= 1, q >= 0`. The
//! tableau layout is:
//!
//! ```text
//!               Player2(0) .. Player2(n-1)   rhs
//! Player1(0)    a[0][0]    .. a[0][n-1]      1
//!   ..
//! Player1(m-1)  a[m-1][0]  .. a[m-1][n-1]    1
//! bottom        -1         .. -1             0
//! ```
//!
//! At the optimum the corner holds `1 / v` where `v` is the shifted game
//! value, and the labels tell which player variable each row and column now
//! stands for.

use serde::{Deserialize, Serialize};

use crate::matrix::chart::Matrix;
use crate::matrix::error::SolveError;

/// Which player's pure strategy a tableau row or column represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variable {
    /// Row `index` of the payoff matrix (player 1, maximizing).
    Player1(usize),
    /// Column `index` of the payoff matrix (player 2, minimizing).
    Player2(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct Tableau {
    /// `(rows + 1) x (columns + 1)` cells, row-major.
    cells: Vec<f64>,
    rows: usize,
    columns: usize,
    row_labels: Vec<Variable>,
    column_labels: Vec<Variable>,
    /// Amount subtracted from every payoff.
    shift: f64,
}

impl Tableau {
    /// Build the initial tableau. Fails on NaN or infinite payoffs.
    pub(crate) fn new(matrix: &Matrix) -> Result<Self, SolveError> {
        if let Some((row, column, _)) = matrix.entries().find(|&(_, _, v)| !v.is_finite()) {
            return Err(SolveError::NonFinite { row, column });
        }

        let (rows, columns) = matrix.shape();
        let shift = matrix.min() - 1.0;
        let width = columns + 1;
        let mut cells = vec![0.0; (rows + 1) * width];

        for (i, j, value) in matrix.entries() {
            cells[i * width + j] = value - shift;
        }
        for i in 0..rows {
            cells[i * width + columns] = 1.0;
        }
        for j in 0..columns {
            cells[rows * width + j] = -1.0;
        }

        Ok(Self {
            cells,
            rows,
            columns,
            row_labels: (0..rows).map(Variable::Player1).collect(),
            column_labels: (0..columns).map(Variable::Player2).collect(),
            shift,
        })
    }

    #[inline]
    fn at(&self, row: usize, column: usize) -> f64 {
        self.cells[row * (self.columns + 1) + column]
    }

    #[inline]
    fn rhs(&self, row: usize) -> f64 {
        self.at(row, self.columns)
    }

    #[inline]
    fn bottom(&self, column: usize) -> f64 {
        self.at(self.rows, column)
    }

    #[inline]
    fn corner(&self) -> f64 {
        self.at(self.rows, self.columns)
    }

    /// First column, left to right, with a negative bottom-row entry.
    pub(crate) fn entering_column(&self) -> Option<usize> {
        (0..self.columns).find(|&j| self.bottom(j) < 0.0)
    }

    /// Ratio test for entering column `q`.
    ///
    /// Only rows with an entry above `epsilon` are eligible. A non-positive
    /// right-hand side wins immediately; otherwise the largest
    /// `entry / rhs` wins, earliest row on ties.
    pub(crate) fn leaving_row(&self, q: usize, epsilon: f64) -> Option<usize> {
        let mut best = None;
        let mut ratio = 0.0;

        for i in 0..self.rows {
            let entry = self.at(i, q);
            if entry <= epsilon {
                continue;
            }

            let rhs = self.rhs(i);
            if rhs <= 0.0 {
                return Some(i);
            }
            if entry > rhs * ratio {
                best = Some(i);
                ratio = entry / rhs;
            }
        }

        best
    }

    /// Pivot on cell `(p, q)`, exchanging the labels of row `p` and column `q`.
    pub(crate) fn pivot(mut self, p: usize, q: usize) -> Self {
        let width = self.columns + 1;
        let d = self.at(p, q);

        for j in (0..width).filter(|&j| j != q) {
            self.cells[p * width + j] /= d;
        }

        for i in (0..=self.rows).filter(|&i| i != p) {
            let factor = self.cells[i * width + q];
            for j in (0..width).filter(|&j| j != q) {
                self.cells[i * width + j] -= factor * self.cells[p * width + j];
            }
            self.cells[i * width + q] = -factor / d;
        }

        self.cells[p * width + q] = 1.0 / d;
        std::mem::swap(&mut self.row_labels[p], &mut self.column_labels[q]);

        self
    }

    /// Pivot until no entering column remains.
    ///
    /// Returns the optimal tableau and the number of pivots taken.
    pub(crate) fn optimize(
        self,
        epsilon: f64,
        max_pivots: usize,
    ) -> Result<(Self, usize), SolveError> {
        let mut tableau = self;
        let mut pivots = 0;

        while let Some(q) = tableau.entering_column() {
            if pivots >= max_pivots {
                return Err(SolveError::NoConvergence {
                    rows: tableau.rows,
                    columns: tableau.columns,
                    pivots,
                });
            }

            let p = tableau
                .leaving_row(q, epsilon)
                .ok_or(SolveError::NoLeavingRow { column: q })?;

            log::trace!(
                "pivot {} at ({}, {}): {:?} <-> {:?}",
                pivots,
                p,
                q,
                tableau.row_labels[p],
                tableau.column_labels[q]
            );

            tableau = tableau.pivot(p, q);
            pivots += 1;
        }

        Ok((tableau, pivots))
    }

    /// Game value of the original (unshifted) matrix.
    pub(crate) fn value(&self) -> f64 {
        1.0 / self.corner() + self.shift
    }

    /// Equilibrium strategies `(rows, columns)` read off the labels.
    ///
    /// Only meaningful on an optimal tableau.
    pub(crate) fn strategies(&self) -> (Vec<f64>, Vec<f64>) {
        let scale = 1.0 / self.corner();
        let mut row_strategy = vec![0.0; self.rows];
        let mut column_strategy = vec![0.0; self.columns];

        for (j, label) in self.column_labels.iter().enumerate() {
            if let Variable::Player1(i) = *label {
                row_strategy[i] = self.bottom(j) * scale;
            }
        }
        for (i, label) in self.row_labels.iter().enumerate() {
            if let Variable::Player2(j) = *label {
                column_strategy[j] = self.rhs(i) * scale;
            }
        }

        (row_strategy, column_strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn identity() -> Matrix {
        Matrix::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_initial_layout() {
        let t = Tableau::new(&identity()).unwrap();

        // min = 0, so every payoff is raised by 1
        assert_eq!(t.shift, -1.0);
        assert_eq!(t.at(0, 0), 2.0);
        assert_eq!(t.at(0, 1), 1.0);
        assert_eq!(t.rhs(1), 1.0);
        assert_eq!(t.bottom(0), -1.0);
        assert_eq!(t.corner(), 0.0);
        assert_eq!(t.row_labels, vec![Variable::Player1(0), Variable::Player1(1)]);
        assert_eq!(t.column_labels, vec![Variable::Player2(0), Variable::Player2(1)]);
    }

    #[test]
    fn test_first_pivot() {
        let t = Tableau::new(&identity()).unwrap();
        assert_eq!(t.entering_column(), Some(0));
        assert_eq!(t.leaving_row(0, 1e-12), Some(0));

        let t = t.pivot(0, 0);
        assert_abs_diff_eq!(t.at(0, 0), 0.5);
        assert_abs_diff_eq!(t.at(0, 1), 0.5);
        assert_abs_diff_eq!(t.rhs(0), 0.5);
        assert_abs_diff_eq!(t.at(1, 0), -0.5);
        assert_abs_diff_eq!(t.at(1, 1), 1.5);
        assert_abs_diff_eq!(t.bottom(0), 0.5);
        assert_abs_diff_eq!(t.bottom(1), -0.5);
        assert_abs_diff_eq!(t.corner(), 0.5);
        assert_eq!(t.row_labels[0], Variable::Player2(0));
        assert_eq!(t.column_labels[0], Variable::Player1(0));
        assert_eq!(t.entering_column(), Some(1));
    }

    #[test]
    fn test_optimize_identity() {
        let (t, pivots) = Tableau::new(&identity()).unwrap().optimize(1e-12, 4).unwrap();
        assert_eq!(pivots, 2);
        assert_abs_diff_eq!(t.value(), 0.5, epsilon = 1e-12);

        let (rows, columns) = t.strategies();
        assert_abs_diff_eq!(rows[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rows[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(columns[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(columns[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_row_selected_first() {
        // Uniform payoffs: after one pivot every other rhs drops to zero
        let m = Matrix::filled(3, 3, 0.5).unwrap();
        let (t, pivots) = Tableau::new(&m).unwrap().optimize(1e-12, 6).unwrap();
        assert_eq!(pivots, 1);
        assert_abs_diff_eq!(t.value(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_pivot_limit() {
        let result = Tableau::new(&identity()).unwrap().optimize(1e-12, 1);
        assert_eq!(
            result.unwrap_err(),
            SolveError::NoConvergence {
                rows: 2,
                columns: 2,
                pivots: 1
            }
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let m = Matrix::new(vec![vec![0.5, f64::NAN]]).unwrap();
        assert_eq!(
            Tableau::new(&m).unwrap_err(),
            SolveError::NonFinite { row: 0, column: 1 }
        );
    }
}
