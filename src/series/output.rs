//! Solved series export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matrix::{GameSolution, Matrix};
use crate::series::config::SeriesStats;
use crate::series::end_condition::EndCondition;

/// A solved series with the opening game's equilibrium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    /// End condition the series was solved under.
    pub end_condition: EndCondition,

    /// Player 1's equilibrium probability of winning the series.
    pub win_probability: f64,

    /// Win rate chart the series was solved from.
    pub chart: Matrix,

    /// Series win probability for each opening pairing.
    pub stage: Matrix,

    /// Equilibrium of the opening stage: which deck each player should
    /// queue first, and how often.
    pub opening: GameSolution,

    /// Solver statistics.
    pub stats: SeriesStats,
}

impl SeriesReport {
    /// Save the report to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }

    /// Decks player 1 should open with, with their probabilities.
    pub fn row_openers(&self) -> Vec<(usize, f64)> {
        openers(&self.opening.row_strategy)
    }

    /// Decks player 2 should open with, with their probabilities.
    pub fn column_openers(&self) -> Vec<(usize, f64)> {
        openers(&self.opening.column_strategy)
    }
}

/// Decks played with positive probability, most likely first.
fn openers(strategy: &[f64]) -> Vec<(usize, f64)> {
    let mut decks: Vec<(usize, f64)> = strategy
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, p)| p > 0.0)
        .collect();
    decks.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    decks
}

impl std::fmt::Display for SeriesReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (rows, columns) = self.chart.shape();
        writeln!(f, "{}x{} series, {}", rows, columns, self.end_condition)?;
        writeln!(f, "Series win probability: {:.4}%", self.win_probability * 100.0)?;

        writeln!(f, "Player 1 opens with:")?;
        for (deck, p) in self.row_openers() {
            writeln!(f, "  deck {:>2}  {:>7.2}%", deck, p * 100.0)?;
        }

        writeln!(f, "Player 2 opens with:")?;
        for (deck, p) in self.column_openers() {
            writeln!(f, "  deck {:>2}  {:>7.2}%", deck, p * 100.0)?;
        }

        for warning in &self.opening.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }
        write!(f, "{}", self.stats)
    }
}
