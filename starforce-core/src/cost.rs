//! Cost of a single upgrade attempt
use crate::constants::{
    COST_FLAT, COST_SCALE, EVENT_DISCOUNT, HIGH_BAND_DIVISOR, LEVEL_EXPONENT, LOW_BAND_DIVISOR,
    LOW_BAND_END, MID_BAND_DIVISORS, RECOVERY_PHASE_START, SAFEGUARD_LEVELS, SAFEGUARD_SURCHARGE,
    TIER_DISCOUNT_MAX_LEVEL,
};
use crate::numbers::round_half_even;
use crate::options::OptionSet;

/// Undiscounted attempt cost at `level` for an item of the given strength.
#[must_use]
pub fn base_cost(level: u8, item_strength: u32) -> f64 {
    let cube = f64::from(item_strength).powi(3);
    let next = f64::from(level) + 1.0;
    let scaled = if level < LOW_BAND_END {
        cube * next / LOW_BAND_DIVISOR
    } else if level < RECOVERY_PHASE_START {
        let divisor = MID_BAND_DIVISORS[usize::from(level - LOW_BAND_END)];
        cube * next.powf(LEVEL_EXPONENT) / divisor
    } else {
        cube * next.powf(LEVEL_EXPONENT) / HIGH_BAND_DIVISOR
    };
    COST_SCALE * round_half_even(scaled + COST_FLAT)
}

/// Multiplier applied to the base cost after stacking discounts and the
/// safeguard surcharge. Heavy stacking may drive it negative; it is not
/// clamped.
#[must_use]
pub fn cost_multiplier(level: u8, discount_rate: f64, options: &OptionSet) -> f64 {
    let mut multiplier = 1.0;
    if options.discount30 {
        multiplier -= EVENT_DISCOUNT;
    }
    if level <= TIER_DISCOUNT_MAX_LEVEL {
        multiplier -= discount_rate;
    }
    // A guaranteed attempt at 15 cannot fail, so safeguard is free there.
    let guaranteed_fifteen = options.guaranteed_milestones && level == RECOVERY_PHASE_START;
    if options.safeguard && SAFEGUARD_LEVELS.contains(&level) && !guaranteed_fifteen {
        multiplier += SAFEGUARD_SURCHARGE;
    }
    multiplier
}

/// Cost of one attempt made while at `level`.
#[must_use]
pub fn attempt_cost(level: u8, item_strength: u32, discount_rate: f64, options: &OptionSet) -> f64 {
    base_cost(level, item_strength) * cost_multiplier(level, discount_rate, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_LEVEL;
    use crate::options::DiscountTier;

    #[test]
    fn low_band_is_linear_in_level() {
        // 150^3 / 2500 = 1350 exactly.
        assert!((base_cost(0, 150) - 136_000.0).abs() < f64::EPSILON);
        assert!((base_cost(4, 150) - 676_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_strength_costs_the_flat_fee() {
        for level in 0..MAX_LEVEL {
            assert!((base_cost(level, 0) - 1_000.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn mid_band_uses_per_level_divisor() {
        let expected = 100.0 * (200f64.powi(3) * 12f64.powf(2.7) / 22_000.0 + 10.0).round();
        assert!((base_cost(11, 200) - expected).abs() < 100.0 + f64::EPSILON);
        assert!(base_cost(14, 200) > base_cost(13, 200));
    }

    #[test]
    fn rounding_ties_go_to_even() {
        // 25^3 * 2 / 2500 = 12.5, so 22.5 rounds down to 22.
        assert!((base_cost(1, 25) - 2_200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn discounts_stack_in_order() {
        let options = OptionSet {
            discount30: true,
            ..OptionSet::none()
        };
        let rate = DiscountTier::Diamond.rate();
        assert!((cost_multiplier(15, rate, &options) - 0.6).abs() < 1e-12);
        // Membership discount stops after 15.
        assert!((cost_multiplier(16, rate, &options) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn safeguard_doubles_cost_unless_fifteen_is_guaranteed() {
        let guarded = OptionSet {
            safeguard: true,
            ..OptionSet::none()
        };
        assert!((cost_multiplier(15, 0.0, &guarded) - 2.0).abs() < f64::EPSILON);
        assert!((cost_multiplier(16, 0.0, &guarded) - 2.0).abs() < f64::EPSILON);
        assert!((cost_multiplier(17, 0.0, &guarded) - 1.0).abs() < f64::EPSILON);

        let both = OptionSet {
            guaranteed_milestones: true,
            ..guarded
        };
        assert!((cost_multiplier(15, 0.0, &both) - 1.0).abs() < f64::EPSILON);
        assert!((cost_multiplier(16, 0.0, &both) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cost_is_monotone_in_item_strength() {
        let option_sets = [
            OptionSet::none(),
            OptionSet {
                discount30: true,
                safeguard: true,
                ..OptionSet::none()
            },
        ];
        for options in option_sets {
            for level in 0..MAX_LEVEL {
                let mut previous = f64::MIN;
                for strength in (0..=300).step_by(5) {
                    let cost = attempt_cost(level, strength, DiscountTier::Gold.rate(), &options);
                    assert!(
                        cost >= previous,
                        "cost dropped at level {level}, strength {strength}"
                    );
                    previous = cost;
                }
            }
        }
    }
}
