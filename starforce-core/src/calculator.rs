//! End-to-end estimate for a single request: validation, the start-level
//! clamp, the recurrence, and aggregation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{LevelBreakdown, aggregate, breakdown};
use crate::constants::{ITERATION_START_CAP, MAX_LEVEL};
use crate::numbers::round_f64_to_i64;
use crate::odds::{OddsTable, OddsTableError};
use crate::options::{DiscountTier, OptionSet};
use crate::recurrence::{EngineError, RecurrenceEngine};

/// Problems with the raw numeric fields of a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a non-negative integer (got {value:?})")]
    NotANumber { field: &'static str, value: String },
}

/// Errors returned by [`estimate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("Invalid target level: {target} must be between {start} and {max}", max = MAX_LEVEL)]
    InvalidRange { start: u32, target: u32 },
    #[error("Invalid odds table: {0}")]
    InvalidOdds(#[from] OddsTableError),
    #[error(transparent)]
    Degenerate(#[from] EngineError),
}

impl CalcError {
    /// Whether the caller supplied bad data, as opposed to the engine hitting
    /// an inconsistent table.
    #[must_use]
    pub const fn is_caller_facing(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidRange { .. })
    }
}

/// Unparsed numeric fields as typed by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput<'a> {
    pub item_strength: Option<&'a str>,
    pub start_level: Option<&'a str>,
    pub target_level: Option<&'a str>,
}

impl RawInput<'_> {
    /// Parse the three numeric fields into a request carrying the given
    /// options and tier. Ordering of the levels is checked later in
    /// [`estimate`].
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidInput`] for a missing or non-numeric field
    /// and [`CalcError::InvalidRange`] for a level above the table maximum.
    pub fn parse(
        &self,
        options: OptionSet,
        discount: DiscountTier,
    ) -> Result<CalculationRequest, CalcError> {
        let item_strength = parse_field("item level", self.item_strength)?;
        let start: u32 = parse_field("current level", self.start_level)?;
        let target: u32 = parse_field("target level", self.target_level)?;
        let out_of_range = || CalcError::InvalidRange { start, target };
        let start_level = u8::try_from(start)
            .ok()
            .filter(|level| *level <= MAX_LEVEL)
            .ok_or_else(out_of_range)?;
        let target_level = u8::try_from(target)
            .ok()
            .filter(|level| *level <= MAX_LEVEL)
            .ok_or_else(out_of_range)?;
        Ok(CalculationRequest {
            item_strength,
            start_level,
            target_level,
            options,
            discount,
        })
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &'static str,
    raw: Option<&str>,
) -> Result<T, InputError> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty());
    let Some(value) = value else {
        return Err(InputError::Missing { field });
    };
    value.parse().map_err(|_| InputError::NotANumber {
        field,
        value: value.to_string(),
    })
}

/// A validated-shape request; call [`CalculationRequest::validate`] or go
/// through [`estimate`] to check the level range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub item_strength: u32,
    pub start_level: u8,
    pub target_level: u8,
    #[serde(default)]
    pub options: OptionSet,
    #[serde(default)]
    pub discount: DiscountTier,
}

impl CalculationRequest {
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidRange`] when the target is below the start
    /// or above the maximum level. Equal levels are allowed.
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.target_level < self.start_level || self.target_level > MAX_LEVEL {
            return Err(CalcError::InvalidRange {
                start: u32::from(self.start_level),
                target: u32::from(self.target_level),
            });
        }
        Ok(())
    }

    /// Level the recurrence starts walking from. Starting no higher than 12
    /// keeps the lookback banks from 13 up populated.
    #[must_use]
    pub fn iteration_start(&self) -> u8 {
        self.start_level.min(ITERATION_START_CAP)
    }
}

/// Result of a calculation. Values are unrounded; see
/// [`Estimate::rounded_cost`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub total_cost: f64,
    pub total_expected_destroys: f64,
    pub destruction_free_prob: f64,
    pub levels: Vec<LevelBreakdown>,
}

impl Estimate {
    #[must_use]
    pub fn rounded_cost(&self) -> i64 {
        round_f64_to_i64(self.total_cost)
    }
}

/// Estimate using the built-in odds table.
///
/// # Errors
///
/// See [`estimate_with_odds`].
pub fn estimate(request: &CalculationRequest) -> Result<Estimate, CalcError> {
    estimate_with_odds(request, OddsTable::standard())
}

/// Estimate the cost, expected destructions, and destruction-free
/// probability of going from `start_level` to `target_level`.
///
/// # Errors
///
/// Returns [`CalcError::InvalidRange`] for an out-of-order or out-of-table
/// range, [`CalcError::InvalidOdds`] if `odds` fails validation, and
/// [`CalcError::Degenerate`] if the walk hits a level whose success rate is
/// not positive.
pub fn estimate_with_odds(
    request: &CalculationRequest,
    odds: &OddsTable,
) -> Result<Estimate, CalcError> {
    request.validate()?;
    odds.validate()?;

    let engine = RecurrenceEngine::new(
        odds,
        request.options,
        request.item_strength,
        request.discount.rate(),
    );
    let state = engine.run(request.iteration_start(), request.target_level)?;
    let totals = aggregate(&state, request.start_level, request.target_level);
    log::debug!(
        "estimate {}->{} strength {}: cost {:.1}, destroys {:.4}, p(no destroy) {:.4}",
        request.start_level,
        request.target_level,
        request.item_strength,
        totals.total_cost,
        totals.total_expected_destroys,
        totals.destruction_free_prob
    );

    Ok(Estimate {
        total_cost: totals.total_cost,
        total_expected_destroys: totals.total_expected_destroys,
        destruction_free_prob: totals.destruction_free_prob,
        levels: breakdown(&state, request.start_level, request.target_level),
    })
}
