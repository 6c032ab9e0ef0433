//! Error types for configuration validation.
//!
//! Out-of-range tuning values are a caller error and are rejected at
//! construction time rather than clamped.

use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
}

impl ConfigError {
    /// Check that `value` is strictly greater than zero.
    pub fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { field, value })
        }
    }

    /// Check that `value` is zero or greater.
    pub fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Negative { field, value })
        }
    }
}
