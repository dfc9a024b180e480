//! Error types for the scoring core.
//!
//! Scoring itself never fails: invalid input during a bout is silently
//! rejected. Errors only surface while a bout is being configured.

use thiserror::Error;

/// Result type alias using [`BoutError`].
pub type Result<T> = std::result::Result<T, BoutError>;

/// Top-level error type for bout setup and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoutError {
    /// A configuration value is out of range.
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A configuration document could not be parsed.
    #[error("Failed to parse match configuration: {0}")]
    ConfigParse(String),
}

impl BoutError {
    /// Shorthand for a zero-valued configuration field.
    #[must_use]
    pub fn zero(field: &'static str) -> Self {
        Self::InvalidConfig {
            field,
            reason: "must be greater than zero".to_string(),
        }
    }
}
