//! Per-level odds table: base success rate plus the split of failures.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::{
    BASE_DESTROY_SHARE, BASE_MAINTAIN_SHARE, BASE_REGRESS_SHARE, BASE_SUCCESS, LEVEL_COUNT,
    SHARE_SUM_TOLERANCE,
};

/// Errors raised when an odds table violates its shape or share invariants.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum OddsTableError {
    #[error("{column} column has {len} entries, expected {expected}")]
    ColumnLength {
        column: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("{column} at level {level} must be between 0 and 1 (got {value})")]
    OutOfRange {
        column: &'static str,
        level: usize,
        value: f64,
    },
    #[error("failure shares at level {level} sum to {sum}, expected 1")]
    ShareSum { level: usize, sum: f64 },
}

/// Errors raised while loading an odds table from JSON.
#[derive(Debug, Error)]
pub enum OddsLoadError {
    #[error("odds table is not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] OddsTableError),
}

/// Base success rates and, conditional on failure, the share of each failure
/// outcome. Index `i` describes an attempt made while at level `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsTable {
    pub success: Vec<f64>,
    pub maintain: Vec<f64>,
    pub regress: Vec<f64>,
    pub destroy: Vec<f64>,
}

impl OddsTable {
    /// The built-in rate card, shared by every request in the process.
    #[must_use]
    pub fn standard() -> &'static Self {
        static STANDARD: OnceLock<OddsTable> = OnceLock::new();
        STANDARD.get_or_init(Self::built_in)
    }

    fn built_in() -> Self {
        Self {
            success: BASE_SUCCESS.to_vec(),
            maintain: BASE_MAINTAIN_SHARE.to_vec(),
            regress: BASE_REGRESS_SHARE.to_vec(),
            destroy: BASE_DESTROY_SHARE.to_vec(),
        }
    }

    /// Parse and validate a table from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or fails [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self, OddsLoadError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Check column lengths, rate bounds, and that failure shares sum to one
    /// wherever failure is possible.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), OddsTableError> {
        for (column, values) in self.columns() {
            if values.len() != LEVEL_COUNT {
                return Err(OddsTableError::ColumnLength {
                    column,
                    len: values.len(),
                    expected: LEVEL_COUNT,
                });
            }
            if let Some((level, &value)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !(0.0..=1.0).contains(*v))
            {
                return Err(OddsTableError::OutOfRange {
                    column,
                    level,
                    value,
                });
            }
        }

        for level in 0..LEVEL_COUNT {
            if self.success[level] >= 1.0 {
                continue;
            }
            let sum = self.maintain[level] + self.regress[level] + self.destroy[level];
            if (sum - 1.0).abs() > SHARE_SUM_TOLERANCE {
                return Err(OddsTableError::ShareSum { level, sum });
            }
        }
        Ok(())
    }

    fn columns(&self) -> [(&'static str, &[f64]); 4] {
        [
            ("success", self.success.as_slice()),
            ("maintain", self.maintain.as_slice()),
            ("regress", self.regress.as_slice()),
            ("destroy", self.destroy.as_slice()),
        ]
    }
}

impl Default for OddsTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_valid() {
        assert_eq!(OddsTable::standard().validate(), Ok(()));
        assert_eq!(OddsTable::standard().success.len(), LEVEL_COUNT);
    }

    #[test]
    fn standard_table_is_shared() {
        assert!(std::ptr::eq(OddsTable::standard(), OddsTable::standard()));
    }

    #[test]
    fn from_json_accepts_serialized_standard_table() {
        let json = serde_json::to_string(OddsTable::standard()).unwrap();
        let parsed = OddsTable::from_json(&json).unwrap();
        assert_eq!(&parsed, OddsTable::standard());
    }

    #[test]
    fn short_column_is_rejected() {
        let mut table = OddsTable::default();
        table.destroy.pop();
        assert_eq!(
            table.validate(),
            Err(OddsTableError::ColumnLength {
                column: "destroy",
                len: LEVEL_COUNT - 1,
                expected: LEVEL_COUNT,
            })
        );
    }

    #[test]
    fn shares_must_sum_to_one_when_failure_possible() {
        let mut table = OddsTable::default();
        table.regress[17] = 0.5;
        match table.validate() {
            Err(OddsTableError::ShareSum { level, .. }) => assert_eq!(level, 17),
            other => panic!("expected share sum error, got {other:?}"),
        }
    }

    #[test]
    fn rates_outside_unit_interval_are_rejected() {
        let mut table = OddsTable::default();
        table.success[3] = 1.2;
        assert!(matches!(
            table.validate(),
            Err(OddsTableError::OutOfRange {
                column: "success",
                level: 3,
                ..
            })
        ));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        assert!(matches!(
            OddsTable::from_json("{\"success\": ["),
            Err(OddsLoadError::Parse(_))
        ));
    }

    #[test]
    fn parse_error_keeps_its_source() {
        let err = OddsTable::from_json("[1, 2").unwrap_err();
        let source = std::error::Error::source(&err).expect("json source");
        assert!(source.is::<serde_json::Error>());
    }

    #[test]
    fn from_json_rejects_tables_that_fail_validation() {
        let mut table = OddsTable::default();
        table.maintain[4] = 0.0;
        let json = serde_json::to_string(&table).unwrap();
        assert!(matches!(
            OddsTable::from_json(&json),
            Err(OddsLoadError::Invalid(OddsTableError::ShareSum { level: 4, .. }))
        ));
    }
}
