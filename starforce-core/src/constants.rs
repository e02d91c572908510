//! Centralized rate card and tuning constants for the star force engine.
//!
//! The odds table, cost divisors, and level thresholds define the
//! deterministic math of every estimate. Keeping them together means the
//! built-in numbers can only change through reviewed code, while alternative
//! tables still load through [`crate::odds::OddsTable::from_json`].

// Level bounds -------------------------------------------------------------
pub const MAX_LEVEL: u8 = 25;
pub const LEVEL_COUNT: usize = MAX_LEVEL as usize + 1;
/// Iteration never starts above this level so the lookback banks get filled.
pub(crate) const ITERATION_START_CAP: u8 = 12;

// Recurrence thresholds ----------------------------------------------------
pub(crate) const RECOVERY_PHASE_START: u8 = 15;
pub(crate) const BANK_FLOOR_LEVELS: [u8; 2] = [15, 20];
pub(crate) const REGRESS_REACHABLE_LEVELS: [u8; 2] = [16, 21];
/// A destruction resets cost progress to this index of the cost array.
pub(crate) const COST_LOOKBACK_FLOOR: usize = 13;
/// A destruction resets destroy-count progress to this index.
pub(crate) const DESTROY_LOOKBACK_FLOOR: usize = 16;

// Option tuning ------------------------------------------------------------
pub(crate) const STAR_CATCH_MULTIPLIER: f64 = 1.05;
pub(crate) const SAFEGUARD_LEVELS: [u8; 2] = [15, 16];
pub(crate) const MILESTONE_LEVELS: [u8; 3] = [5, 10, 15];
pub(crate) const DOUBLE_STEP_MAX_LEVEL: u8 = 10;
pub(crate) const EVENT_DISCOUNT: f64 = 0.30;
pub(crate) const SAFEGUARD_SURCHARGE: f64 = 1.0;
/// Membership discounts apply up to and including this level.
pub(crate) const TIER_DISCOUNT_MAX_LEVEL: u8 = 15;

// Cost curve ---------------------------------------------------------------
pub(crate) const COST_SCALE: f64 = 100.0;
pub(crate) const COST_FLAT: f64 = 10.0;
pub(crate) const LOW_BAND_END: u8 = 10;
pub(crate) const LOW_BAND_DIVISOR: f64 = 2_500.0;
pub(crate) const MID_BAND_DIVISORS: [f64; 5] = [40_000.0, 22_000.0, 15_000.0, 11_000.0, 7_500.0];
pub(crate) const HIGH_BAND_DIVISOR: f64 = 20_000.0;
pub(crate) const LEVEL_EXPONENT: f64 = 2.7;

// Discount tiers -----------------------------------------------------------
pub(crate) const SILVER_RATE: f64 = 0.03;
pub(crate) const GOLD_RATE: f64 = 0.05;
pub(crate) const DIAMOND_RATE: f64 = 0.10;

// Built-in odds ------------------------------------------------------------
// Level 25 is the cap; no attempt is made there, so it carries a placeholder.
pub(crate) const BASE_SUCCESS: [f64; LEVEL_COUNT] = [
    0.95, 0.9, 0.85, 0.85, 0.8, 0.75, 0.7, 0.65, 0.6, 0.55, 0.5, 0.45, 0.4, 0.35, 0.3, 0.3, 0.3,
    0.3, 0.3, 0.3, 0.3, 0.3, 0.03, 0.02, 0.01, 1.0,
];
pub(crate) const BASE_MAINTAIN_SHARE: [f64; LEVEL_COUNT] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.97, 0.0, 0.0,
    0.0, 0.0, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0,
];
pub(crate) const BASE_REGRESS_SHARE: [f64; LEVEL_COUNT] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.97, 0.97,
    0.96, 0.96, 0.0, 0.9, 0.8, 0.7, 0.6, 0.0,
];
pub(crate) const BASE_DESTROY_SHARE: [f64; LEVEL_COUNT] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.03, 0.03, 0.03,
    0.04, 0.04, 0.1, 0.1, 0.2, 0.3, 0.4, 0.0,
];

pub(crate) const SHARE_SUM_TOLERANCE: f64 = 1e-9;
#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-9;
