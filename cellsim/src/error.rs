//! Error types for the simulation core.

use thiserror::Error;

/// Validation failures reported by grid construction, configuration and cell access.
///
/// Rule evaluation never produces one of these: out-of-range cell values are
/// compared literally by the rules instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Rows or columns were zero.
    #[error("invalid grid dimension: {rows}x{cols}")]
    InvalidDimension {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },

    /// A rule parameter was outside its valid domain.
    #[error("invalid rule parameter `{name}`: {reason}")]
    InvalidRuleParameter {
        /// Parameter name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A coordinate fell outside the grid.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },

    /// A `B#/S#` rulestring could not be parsed.
    #[error("invalid rulestring: {0:?}")]
    InvalidRulestring(String),
}

impl SimError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRuleParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimError>;
