//! Star Force Cost Engine
//!
//! Platform-agnostic expected-value math for repeated star force upgrade
//! attempts. Given an item level, a start and target star level, the active
//! event options, and a membership discount tier, the engine computes the
//! expected meso cost, the expected number of destructions, and the
//! probability of reaching the target without a destruction. Everything is
//! closed form; nothing is sampled.

pub mod aggregate;
pub mod calculator;
pub mod constants;
pub mod cost;
pub mod numbers;
pub mod odds;
pub mod options;
pub mod probability;
pub mod recurrence;

// Re-export commonly used types
pub use aggregate::{LevelBreakdown, Totals, aggregate, breakdown};
pub use calculator::{
    CalcError, CalculationRequest, Estimate, InputError, RawInput, estimate, estimate_with_odds,
};
pub use constants::{LEVEL_COUNT, MAX_LEVEL};
pub use cost::{attempt_cost, base_cost, cost_multiplier};
pub use odds::{OddsLoadError, OddsTable, OddsTableError};
pub use options::{DiscountTier, OptionSet};
pub use probability::{OutcomeProbabilities, outcome};
pub use recurrence::{EngineError, Phase, RecurrenceEngine, RecurrenceState, RollingMemo};

/// Calculator bound to one odds table, for callers that load an alternative
/// rate card once and serve many requests from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculator {
    odds: OddsTable,
}

impl Calculator {
    /// Calculator over the built-in rate card.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            odds: OddsTable::standard().clone(),
        }
    }

    /// Create a calculator over a custom table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table fails validation.
    pub fn new(odds: OddsTable) -> Result<Self, OddsTableError> {
        odds.validate()?;
        Ok(Self { odds })
    }

    #[must_use]
    pub const fn odds(&self) -> &OddsTable {
        &self.odds
    }

    /// Run one request against this calculator's table.
    ///
    /// # Errors
    ///
    /// See [`estimate_with_odds`].
    pub fn estimate(&self, request: &CalculationRequest) -> Result<Estimate, CalcError> {
        estimate_with_odds(request, &self.odds)
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::standard()
    }
}
