//! Upgrade options and membership discount tiers
use serde::{Deserialize, Serialize};

use crate::constants::{DIAMOND_RATE, GOLD_RATE, SILVER_RATE};

/// Toggleable event and protection options for a calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionSet {
    /// Attempts at levels 5, 10 and 15 always succeed.
    #[serde(default)]
    pub guaranteed_milestones: bool,
    /// A success at level 10 or below grants two levels instead of one.
    #[serde(default)]
    pub double_step_early: bool,
    /// Flat 30% off every attempt.
    #[serde(default)]
    pub discount30: bool,
    /// Success rate multiplied by 1.05.
    #[serde(default)]
    pub star_catching: bool,
    /// Destruction at levels 15 and 16 becomes a regression, at double cost.
    #[serde(default)]
    pub safeguard: bool,
}

impl OptionSet {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            guaranteed_milestones: false,
            double_step_early: false,
            discount30: false,
            star_catching: false,
            safeguard: false,
        }
    }
}

/// Membership tier granting a flat discount on low-level attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountTier {
    #[default]
    None,
    Silver,
    Gold,
    Diamond,
}

impl DiscountTier {
    pub const ALL: [Self; 4] = [Self::None, Self::Silver, Self::Gold, Self::Diamond];

    /// Fraction taken off the cost multiplier.
    #[must_use]
    pub const fn rate(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Silver => SILVER_RATE,
            Self::Gold => GOLD_RATE,
            Self::Diamond => DIAMOND_RATE,
        }
    }
}

impl std::fmt::Display for DiscountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountTier::None => write!(f, "None"),
            DiscountTier::Silver => write!(f, "MVP Silver (3% off up to 15)"),
            DiscountTier::Gold => write!(f, "MVP Gold (5% off up to 15)"),
            DiscountTier::Diamond => write!(f, "MVP Diamond (10% off up to 15)"),
        }
    }
}
