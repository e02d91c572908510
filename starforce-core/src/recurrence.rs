//! Forward recurrence over levels.
//!
//! Each visited level `l` fills index `l + 1` of three parallel arrays: the
//! expected cost of the transition `l -> l + 1`, the probability of making
//! that transition without a destruction, and the expected number of
//! destructions along the way. From level 15 on, a failure can regress or
//! destroy the item, so the formulas pull in earlier entries: a destruction
//! banks back to index 13 for cost and index 16 for destroy counts, and a
//! regression chain looks back up to two levels through [`RollingMemo`].
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BANK_FLOOR_LEVELS, COST_LOOKBACK_FLOOR, DESTROY_LOOKBACK_FLOOR, DOUBLE_STEP_MAX_LEVEL,
    LEVEL_COUNT, MAX_LEVEL, RECOVERY_PHASE_START, REGRESS_REACHABLE_LEVELS,
};
use crate::cost::attempt_cost;
use crate::odds::{OddsTable, OddsTableError};
use crate::options::OptionSet;
use crate::probability::{OutcomeProbabilities, outcome};

/// Errors raised while running the recurrence.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EngineError {
    #[error("success rate at level {level} is {success}; expected cost is undefined")]
    DegenerateProbability { level: u8, success: f64 },
    #[error("level {level} is beyond the table maximum of {max}", max = MAX_LEVEL)]
    LevelOutOfTable { level: u8 },
    #[error("odds table rejected: {0}")]
    InvalidOdds(#[from] OddsTableError),
}

/// Formula family used for an attempt at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Below 15: failures only maintain.
    Safe,
    /// 15 and 20: destruction possible, regression is not.
    BankFloor,
    /// 16 and 21: regression lands on a bank floor level.
    RegressReachable,
    /// Every other level from 15 up: two-step regression chains.
    General,
}

impl Phase {
    #[must_use]
    pub fn for_level(level: u8) -> Self {
        if level < RECOVERY_PHASE_START {
            Self::Safe
        } else if BANK_FLOOR_LEVELS.contains(&level) {
            Self::BankFloor
        } else if REGRESS_REACHABLE_LEVELS.contains(&level) {
            Self::RegressReachable
        } else {
            Self::General
        }
    }
}

/// Regression-related quantities of the last two recovery-phase attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollingMemo {
    pub prev_regress: f64,
    pub prev_destroy: f64,
    pub two_cost_ago: f64,
    pub prev_cost: f64,
}

impl RollingMemo {
    fn shift(&mut self, odds: &OutcomeProbabilities, cost: f64) {
        *self = Self {
            prev_regress: odds.regress,
            prev_destroy: odds.destroy,
            two_cost_ago: self.prev_cost,
            prev_cost: cost,
        };
    }
}

/// Request-scoped arrays filled by [`RecurrenceEngine::run`]. Index 0 is
/// never written.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceState {
    pub expected_cost: [f64; LEVEL_COUNT],
    pub destruction_free_prob: [f64; LEVEL_COUNT],
    pub expected_destroys: [f64; LEVEL_COUNT],
    /// Which indices were written; `double_step_early` skips some.
    pub populated: [bool; LEVEL_COUNT],
    pub memo: RollingMemo,
}

impl Default for RecurrenceState {
    fn default() -> Self {
        Self {
            expected_cost: [0.0; LEVEL_COUNT],
            destruction_free_prob: [1.0; LEVEL_COUNT],
            expected_destroys: [0.0; LEVEL_COUNT],
            populated: [false; LEVEL_COUNT],
            memo: RollingMemo::default(),
        }
    }
}

impl RecurrenceState {
    fn cost_bank(&self, level: usize) -> f64 {
        bank_sum(&self.expected_cost, COST_LOOKBACK_FLOOR, level)
    }

    fn destroy_bank(&self, level: usize) -> f64 {
        bank_sum(&self.expected_destroys, DESTROY_LOOKBACK_FLOOR, level)
    }

    fn apply(&mut self, level: u8, phase: Phase, p: &OutcomeProbabilities, cost: f64) {
        let l = usize::from(level);
        let next = l + 1;
        let (s, r, d) = (p.success, p.regress, p.destroy);
        let memo = self.memo;

        match phase {
            Phase::Safe => {
                self.expected_cost[next] = cost / s;
            }
            Phase::BankFloor => {
                self.expected_cost[next] = (cost + d * self.cost_bank(l)) / s;
                self.destruction_free_prob[next] = s / (s + d);
                self.expected_destroys[next] = (d * (1.0 + self.destroy_bank(l))) / s;
            }
            Phase::RegressReachable => {
                self.expected_cost[next] =
                    (cost + r * self.expected_cost[l] + d * self.cost_bank(l)) / s;
                self.destruction_free_prob[next] =
                    s / (s + d + r * (1.0 - self.destruction_free_prob[l]));
                self.expected_destroys[next] =
                    (d * (1.0 + self.destroy_bank(l)) + r * self.expected_destroys[l]) / s;
            }
            Phase::General => {
                let chain = r * memo.prev_regress;
                let banked = r * memo.prev_destroy + d;
                self.expected_cost[next] = (cost
                    + r * memo.prev_cost
                    + chain * (memo.two_cost_ago + self.expected_cost[l])
                    + banked * self.cost_bank(l))
                    / s;
                self.destruction_free_prob[next] = s
                    / (s + d
                        + chain * (1.0 - self.destruction_free_prob[l])
                        + r * memo.prev_destroy);
                self.expected_destroys[next] =
                    (chain * self.expected_destroys[l] + (self.destroy_bank(l) + 1.0) * banked)
                        / s;
            }
        }

        if phase != Phase::Safe {
            self.memo.shift(p, cost);
        }
        self.populated[next] = true;
    }
}

/// Sum of `values[floor..=level]`, empty when `level < floor`.
fn bank_sum(values: &[f64; LEVEL_COUNT], floor: usize, level: usize) -> f64 {
    if level < floor {
        return 0.0;
    }
    values[floor..=level].iter().sum()
}

/// Drives the recurrence for one request.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceEngine<'a> {
    odds: &'a OddsTable,
    options: OptionSet,
    item_strength: u32,
    discount_rate: f64,
}

impl<'a> RecurrenceEngine<'a> {
    #[must_use]
    pub const fn new(
        odds: &'a OddsTable,
        options: OptionSet,
        item_strength: u32,
        discount_rate: f64,
    ) -> Self {
        Self {
            odds,
            options,
            item_strength,
            discount_rate,
        }
    }

    /// Fill a fresh [`RecurrenceState`] for every level visited between
    /// `start` (inclusive) and `target` (exclusive).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LevelOutOfTable`] if `target` exceeds the table,
    /// [`EngineError::InvalidOdds`] if the table fails validation, and
    /// [`EngineError::DegenerateProbability`] if a visited level has no
    /// positive, finite success rate.
    pub fn run(&self, start: u8, target: u8) -> Result<RecurrenceState, EngineError> {
        if target > MAX_LEVEL {
            return Err(EngineError::LevelOutOfTable { level: target });
        }
        self.odds.validate()?;

        let mut state = RecurrenceState::default();
        let mut level = start;
        while level < target {
            let p = outcome(level, self.odds, &self.options);
            if !(p.success > 0.0 && p.success.is_finite()) {
                return Err(EngineError::DegenerateProbability {
                    level,
                    success: p.success,
                });
            }
            let cost = attempt_cost(level, self.item_strength, self.discount_rate, &self.options);
            let phase = Phase::for_level(level);
            state.apply(level, phase, &p, cost);
            log::trace!(
                "level {level} ({phase:?}): p={p:?} cost={cost} -> expected {:.3}",
                state.expected_cost[usize::from(level) + 1]
            );

            level += self.step_from(level);
        }
        Ok(state)
    }

    const fn step_from(&self, level: u8) -> u8 {
        if self.options.double_step_early && level <= DOUBLE_STEP_MAX_LEVEL {
            2
        } else {
            1
        }
    }
}
