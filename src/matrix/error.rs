//! Errors raised while validating charts and solving matrix games.

/// Broad classification of a [`SolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied a malformed chart, index or end condition.
    InvalidInput,
    /// Pivoting could not reach an optimal tableau.
    Convergence,
}

/// Errors that can occur while extracting submatrices or solving games.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The matrix has no rows, or its first row is empty.
    EmptyChart,
    /// A row does not have the same length as the first row.
    RaggedChart {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// Row exclusion index past the last row.
    RowOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of rows in the matrix.
        rows: usize,
    },
    /// Column exclusion index past the last column.
    ColumnOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of columns in the matrix.
        columns: usize,
    },
    /// A winrate chart entry is not a probability.
    ProbabilityOutOfRange {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
        /// The entry itself.
        value: f64,
    },
    /// End condition flag other than 0 or 1.
    InvalidEndCondition(i64),
    /// One side already has no more decks than the reserve.
    SeriesAlreadyDecided {
        /// Rows in the chart.
        rows: usize,
        /// Columns in the chart.
        columns: usize,
        /// Decks held in reserve when the series ends.
        reserve: usize,
    },
    /// More decks on one side than the subgame key can address.
    TooManyDecks {
        /// Decks on the larger side.
        decks: usize,
        /// Largest supported side.
        max: usize,
    },
    /// The payoff matrix contains NaN or an infinity.
    NonFinite {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
    },
    /// The pivot bound was exhausted with an entering column still available.
    NoConvergence {
        /// Rows in the payoff matrix.
        rows: usize,
        /// Columns in the payoff matrix.
        columns: usize,
        /// Pivots performed before giving up.
        pivots: usize,
    },
    /// The ratio test found no row to leave the basis.
    NoLeavingRow {
        /// Entering column.
        column: usize,
    },
}

impl SolveError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NonFinite { .. } | Self::NoConvergence { .. } | Self::NoLeavingRow { .. } => {
                ErrorKind::Convergence
            }
            _ => ErrorKind::InvalidInput,
        }
    }
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyChart => write!(f, "Chart must have at least one row and one column"),
            Self::RaggedChart {
                row,
                expected,
                actual,
            } => write!(
                f,
                "Row {} has {} entries, expected {}",
                row, actual, expected
            ),
            Self::RowOutOfBounds { index, rows } => {
                write!(f, "Row index {} is out of bounds for {} rows", index, rows)
            }
            Self::ColumnOutOfBounds { index, columns } => write!(
                f,
                "Column index {} is out of bounds for {} columns",
                index, columns
            ),
            Self::ProbabilityOutOfRange { row, column, value } => write!(
                f,
                "Winrate {} at ({}, {}) is out of range [0, 1]",
                value, row, column
            ),
            Self::InvalidEndCondition(flag) => {
                write!(f, "End condition {} must be 0 or 1", flag)
            }
            Self::SeriesAlreadyDecided {
                rows,
                columns,
                reserve,
            } => write!(
                f,
                "A {}x{} chart is already decided with {} decks in reserve",
                rows, columns, reserve
            ),
            Self::TooManyDecks { decks, max } => {
                write!(f, "{} decks on one side exceeds the maximum of {}", decks, max)
            }
            Self::NonFinite { row, column } => {
                write!(f, "Payoff at ({}, {}) is not finite", row, column)
            }
            Self::NoConvergence {
                rows,
                columns,
                pivots,
            } => write!(
                f,
                "No optimal tableau for {}x{} game after {} pivots",
                rows, columns, pivots
            ),
            Self::NoLeavingRow { column } => {
                write!(f, "Ratio test found no leaving row for column {}", column)
            }
        }
    }
}

impl std::error::Error for SolveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(SolveError::EmptyChart.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            SolveError::RowOutOfBounds { index: 3, rows: 2 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SolveError::InvalidEndCondition(2).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SolveError::NonFinite { row: 0, column: 0 }.kind(),
            ErrorKind::Convergence
        );
        assert_eq!(
            SolveError::NoConvergence {
                rows: 2,
                columns: 2,
                pivots: 4
            }
            .kind(),
            ErrorKind::Convergence
        );
    }

    #[test]
    fn test_error_messages() {
        let err = SolveError::ColumnOutOfBounds {
            index: 5,
            columns: 3,
        };
        assert_eq!(err.to_string(), "Column index 5 is out of bounds for 3 columns");
        assert_eq!(
            SolveError::InvalidEndCondition(-1).to_string(),
            "End condition -1 must be 0 or 1"
        );
    }
}
