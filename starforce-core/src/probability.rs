//! Outcome probabilities of a single attempt at a level.
use serde::{Deserialize, Serialize};

use crate::constants::{MILESTONE_LEVELS, SAFEGUARD_LEVELS, STAR_CATCH_MULTIPLIER};
use crate::odds::OddsTable;
use crate::options::OptionSet;

/// Probabilities of the four mutually exclusive outcomes of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub success: f64,
    pub maintain: f64,
    pub regress: f64,
    pub destroy: f64,
}

impl OutcomeProbabilities {
    pub const CERTAIN: Self = Self {
        success: 1.0,
        maintain: 0.0,
        regress: 0.0,
        destroy: 0.0,
    };

    #[must_use]
    pub fn total(&self) -> f64 {
        self.success + self.maintain + self.regress + self.destroy
    }
}

/// Outcome probabilities for one attempt made while at `level`.
///
/// Star catching is applied without a clamp, so base rates above ~0.952 can
/// push `success` past 1. Safeguard folds every failure outcome at levels 15
/// and 16 into both `maintain` and `regress`. Guaranteed milestones override
/// everything else.
///
/// # Panics
///
/// Panics if `level` is outside the table.
#[must_use]
pub fn outcome(level: u8, odds: &OddsTable, options: &OptionSet) -> OutcomeProbabilities {
    let idx = usize::from(level);
    let base = odds.success[idx];
    let success = if options.star_catching {
        base * STAR_CATCH_MULTIPLIER
    } else {
        base
    };

    let fail = 1.0 - success;
    let mut maintain = fail * odds.maintain[idx];
    let mut regress = fail * odds.regress[idx];
    let mut destroy = fail * odds.destroy[idx];

    if options.safeguard && SAFEGUARD_LEVELS.contains(&level) {
        regress = maintain + regress + destroy;
        maintain = regress;
        destroy = 0.0;
    }

    if options.guaranteed_milestones && MILESTONE_LEVELS.contains(&level) {
        return OutcomeProbabilities::CERTAIN;
    }

    OutcomeProbabilities {
        success,
        maintain,
        regress,
        destroy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FLOAT_EPSILON, MAX_LEVEL};

    fn all_option_sets() -> Vec<OptionSet> {
        (0u8..32)
            .map(|bits| OptionSet {
                guaranteed_milestones: bits & 1 != 0,
                double_step_early: bits & 2 != 0,
                discount30: bits & 4 != 0,
                star_catching: bits & 8 != 0,
                safeguard: bits & 16 != 0,
            })
            .collect()
    }

    #[test]
    fn outcomes_form_a_distribution_without_star_catching() {
        let odds = OddsTable::standard();
        let options = OptionSet {
            guaranteed_milestones: true,
            double_step_early: true,
            discount30: true,
            ..OptionSet::none()
        };
        for level in 0..=MAX_LEVEL {
            for opts in [OptionSet::none(), options] {
                let p = outcome(level, odds, &opts);
                for value in [p.success, p.maintain, p.regress, p.destroy] {
                    assert!(value >= 0.0, "negative outcome at level {level}: {p:?}");
                }
                assert!(
                    (p.total() - 1.0).abs() < FLOAT_EPSILON,
                    "level {level} sums to {}",
                    p.total()
                );
            }
        }
    }

    #[test]
    fn milestones_override_every_other_option() {
        let odds = OddsTable::standard();
        for opts in all_option_sets()
            .into_iter()
            .filter(|o| o.guaranteed_milestones)
        {
            for level in [5, 10, 15] {
                assert_eq!(outcome(level, odds, &opts), OutcomeProbabilities::CERTAIN);
            }
        }
    }

    #[test]
    fn safeguard_folds_destruction_only_at_fifteen_and_sixteen() {
        let odds = OddsTable::standard();
        let guarded = OptionSet {
            safeguard: true,
            ..OptionSet::none()
        };
        for level in [15, 16] {
            let p = outcome(level, odds, &guarded);
            assert_eq!(p.destroy, 0.0);
            assert_eq!(p.maintain, p.regress);
            assert!((p.regress - 0.7).abs() < FLOAT_EPSILON);
        }
        for level in [20, 21] {
            assert_eq!(
                outcome(level, odds, &guarded),
                outcome(level, odds, &OptionSet::none())
            );
        }
    }

    #[test]
    fn star_catching_scales_success_without_clamp() {
        let odds = OddsTable::standard();
        let catching = OptionSet {
            star_catching: true,
            ..OptionSet::none()
        };
        let p = outcome(12, odds, &catching);
        assert!((p.success - 0.42).abs() < FLOAT_EPSILON);

        // Every built-in rate stays below the overshoot threshold.
        for level in 0..MAX_LEVEL {
            assert!(outcome(level, odds, &catching).success <= 1.0);
        }

        let mut steep = OddsTable::default();
        steep.success[0] = 0.99;
        let p = outcome(0, &steep, &catching);
        assert!((p.success - 0.99 * 1.05).abs() < FLOAT_EPSILON);
        assert!(p.success > 1.0);
        assert!(p.maintain < 0.0);
    }

    #[test]
    fn failure_split_follows_table_shares() {
        let p = outcome(22, OddsTable::standard(), &OptionSet::none());
        assert!((p.success - 0.03).abs() < FLOAT_EPSILON);
        assert!((p.regress - 0.97 * 0.8).abs() < FLOAT_EPSILON);
        assert!((p.destroy - 0.97 * 0.2).abs() < FLOAT_EPSILON);
        assert_eq!(p.maintain, 0.0);
    }
}
