//! When a deck series is decided.

use serde::{Deserialize, Serialize};

use crate::matrix::SolveError;

/// The number of decks a side still holds when the series ends.
///
/// Every game removes the winning deck from its owner's pool; the first side
/// brought down to `reserve` remaining decks has won the series.
///
/// - Reserve 0 (flag `0`): every deck must win once, e.g. 3 decks each in a
///   best of 5.
/// - Reserve 1 (flag `1`): one deck is never needed, e.g. 3 decks each in a
///   best of 3.
///
/// Serialized as the bare reserve count.
///
/// # Example
/// ```
/// use deck_series_solver::series::EndCondition;
///
/// let bo5 = EndCondition::from_flag(0).unwrap();
/// assert_eq!(bo5, EndCondition::FULL_ELIMINATION);
/// assert_eq!(bo5.best_of(3), 5);
/// assert_eq!(EndCondition::ONE_IN_RESERVE.best_of(3), 3);
/// assert!(EndCondition::from_flag(2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndCondition {
    reserve: usize,
}

impl EndCondition {
    /// Decided when a side has no decks left.
    pub const FULL_ELIMINATION: Self = Self { reserve: 0 };

    /// Decided when a side has one deck left.
    pub const ONE_IN_RESERVE: Self = Self { reserve: 1 };

    /// Parse the `0` / `1` end condition flag.
    pub fn from_flag(flag: i64) -> Result<Self, SolveError> {
        match flag {
            0 => Ok(Self::FULL_ELIMINATION),
            1 => Ok(Self::ONE_IN_RESERVE),
            other => Err(SolveError::InvalidEndCondition(other)),
        }
    }

    /// Decided when a side has `reserve` decks left.
    pub fn with_reserve(reserve: usize) -> Self {
        Self { reserve }
    }

    /// Decks the winning side still holds when the series is decided.
    pub fn reserve(&self) -> usize {
        self.reserve
    }

    /// Wins a side with `decks` decks needs to take the series.
    pub fn wins_needed(&self, decks: usize) -> usize {
        decks.saturating_sub(self.reserve)
    }

    /// Series length when both sides bring `decks` decks.
    pub fn best_of(&self, decks: usize) -> usize {
        (2 * self.wins_needed(decks)).saturating_sub(1)
    }
}

impl Default for EndCondition {
    fn default() -> Self {
        Self::FULL_ELIMINATION
    }
}

impl TryFrom<i64> for EndCondition {
    type Error = SolveError;

    fn try_from(flag: i64) -> Result<Self, Self::Error> {
        Self::from_flag(flag)
    }
}

impl std::fmt::Display for EndCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reserve {
            0 => write!(f, "full elimination"),
            1 => write!(f, "one deck in reserve"),
            n => write!(f, "{} decks in reserve", n),
        }
    }
}
