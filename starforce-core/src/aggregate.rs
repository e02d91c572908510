//! Reduce the recurrence arrays over a requested level range.
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceState;

/// Unrounded totals for a level range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_cost: f64,
    pub total_expected_destroys: f64,
    pub destruction_free_prob: f64,
}

/// One row of the per-level breakdown: the transition into `level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelBreakdown {
    pub level: u8,
    pub expected_cost: f64,
    pub destruction_free_prob: f64,
    pub expected_destroys: f64,
    /// False when the level was jumped over by a double step.
    pub attempted: bool,
}

/// Sum cost and destroys, and multiply destruction-free probabilities, over
/// indices `start + 1 ..= target`. An empty range gives `(0, 0, 1)`.
#[must_use]
pub fn aggregate(state: &RecurrenceState, start: u8, target: u8) -> Totals {
    Totals {
        total_cost: window(&state.expected_cost, start, target).iter().sum(),
        total_expected_destroys: window(&state.expected_destroys, start, target)
            .iter()
            .sum(),
        destruction_free_prob: window(&state.destruction_free_prob, start, target)
            .iter()
            .product(),
    }
}

fn window(values: &[f64], start: u8, target: u8) -> &[f64] {
    values
        .get((usize::from(start) + 1)..=usize::from(target))
        .unwrap_or(&[])
}

/// Per-level rows for indices `start + 1 ..= target`.
#[must_use]
pub fn breakdown(state: &RecurrenceState, start: u8, target: u8) -> Vec<LevelBreakdown> {
    (start.saturating_add(1)..=target)
        .map(|level| {
            let idx = usize::from(level);
            LevelBreakdown {
                level,
                expected_cost: state.expected_cost[idx],
                destruction_free_prob: state.destruction_free_prob[idx],
                expected_destroys: state.expected_destroys[idx],
                attempted: state.populated[idx],
            }
        })
        .collect()
}
