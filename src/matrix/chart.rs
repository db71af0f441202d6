//! Rectangular payoff matrices and submatrix extraction.
//!
//! A [`Matrix`] is an immutable, validated grid of `f64`. Winrate charts are
//! matrices whose entries are probabilities; rows index player 1's remaining
//! decks and columns index player 2's.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::matrix::error::SolveError;

/// A rectangular matrix with at least one row and one column.
///
/// # Example
/// ```
/// use deck_series_solver::matrix::Matrix;
///
/// let chart = Matrix::new(vec![vec![0.6, 0.4], vec![0.3, 0.7]]).unwrap();
/// assert_eq!(chart.num_rows(), 2);
/// assert_eq!(chart[(1, 0)], 0.3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
}

/// A matrix of head-to-head win probabilities.
pub type WinrateChart = Matrix;

impl Matrix {
    /// Build a matrix, checking that it is non-empty and rectangular.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, SolveError> {
        let expected = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(SolveError::EmptyChart),
        };

        for (row, values) in rows.iter().enumerate() {
            if values.len() != expected {
                return Err(SolveError::RaggedChart {
                    row,
                    expected,
                    actual: values.len(),
                });
            }
        }

        Ok(Self { rows })
    }

    /// Build an `m x n` matrix from a function of `(row, column)`.
    pub fn from_fn<F>(num_rows: usize, num_columns: usize, mut f: F) -> Result<Self, SolveError>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let rows = (0..num_rows)
            .map(|i| (0..num_columns).map(|j| f(i, j)).collect())
            .collect();
        Self::new(rows)
    }

    /// Build an `m x n` matrix with every entry set to `value`.
    pub fn filled(num_rows: usize, num_columns: usize, value: f64) -> Result<Self, SolveError> {
        Self::new(vec![vec![value; num_columns]; num_rows])
    }

    /// Number of rows (player 1's decks).
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (player 2's decks).
    pub fn num_columns(&self) -> usize {
        self.rows[0].len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    /// Entry at `(row, column)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// A single row as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.rows[row]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Iterate over `(row, column, value)` for every entry.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            row.iter().enumerate().map(move |(j, &value)| (i, j, value))
        })
    }

    /// Smallest entry.
    pub fn min(&self) -> f64 {
        self.entries().map(|(_, _, v)| v).fold(f64::INFINITY, f64::min)
    }

    /// Largest entry.
    pub fn max(&self) -> f64 {
        self.entries()
            .map(|(_, _, v)| v)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Check that every entry is a probability in `[0, 1]`.
    pub fn validate_probabilities(&self) -> Result<(), SolveError> {
        match self.entries().find(|&(_, _, v)| !(0.0..=1.0).contains(&v)) {
            Some((row, column, value)) => Err(SolveError::ProbabilityOutOfRange {
                row,
                column,
                value,
            }),
            None => Ok(()),
        }
    }

    /// Copy of this matrix without the given row and/or column.
    ///
    /// See [`extract_submatrix`].
    pub fn without(
        &self,
        exclude_row: Option<usize>,
        exclude_column: Option<usize>,
    ) -> Result<Self, SolveError> {
        extract_submatrix(self, exclude_row, exclude_column)
    }

    /// Consume the matrix, returning its rows.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, column): (usize, usize)) -> &f64 {
        &self.rows[row][column]
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = SolveError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.rows
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

/// Return a new matrix with `exclude_row` and/or `exclude_column` removed.
///
/// Passing `None` for either index leaves that dimension unchanged. The input
/// is never modified.
///
/// # Errors
/// - [`SolveError::RowOutOfBounds`] / [`SolveError::ColumnOutOfBounds`] when an
///   index is past the end.
/// - [`SolveError::EmptyChart`] when the only row or only column is removed.
pub fn extract_submatrix(
    matrix: &Matrix,
    exclude_row: Option<usize>,
    exclude_column: Option<usize>,
) -> Result<Matrix, SolveError> {
    let (rows, columns) = matrix.shape();

    if let Some(index) = exclude_row {
        if index >= rows {
            return Err(SolveError::RowOutOfBounds { index, rows });
        }
    }
    if let Some(index) = exclude_column {
        if index >= columns {
            return Err(SolveError::ColumnOutOfBounds { index, columns });
        }
    }

    let kept: Vec<Vec<f64>> = matrix
        .rows
        .iter()
        .enumerate()
        .filter(|&(i, _)| Some(i) != exclude_row)
        .map(|(_, row)| {
            row.iter()
                .enumerate()
                .filter(|&(j, _)| Some(j) != exclude_column)
                .map(|(_, &v)| v)
                .collect()
        })
        .collect();

    Matrix::new(kept)
}
