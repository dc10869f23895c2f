//! Error types shared across the IBE correction workspace.

use thiserror::Error;

/// Result type alias using IbeError.
pub type IbeResult<T> = Result<T, IbeError>;

/// Primary error type for configuration and input validation.
#[derive(Debug, Error)]
pub enum IbeError {
    // === Configuration Errors ===
    #[error("PROJ:{0} conversion function not found")]
    UnknownProjection(String),

    #[error("Invalid transform direction '{0}' (expected 'F' or 'B')")]
    InvalidDirection(String),

    #[error("Invalid epoch {0:?}: not a calendar date")]
    InvalidEpoch([i32; 6]),

    #[error("Invalid time units: {0}")]
    InvalidTimeUnits(String),

    #[error("Unsupported subset: {0}")]
    UnsupportedSubset(String),

    #[error("Time window {start}..{end} h is outside the cube time range {first}..{last} h")]
    TimeWindowOutOfRange {
        start: f64,
        end: f64,
        first: f64,
        last: f64,
    },

    #[error("Invalid configuration value for '{param}': {message}")]
    InvalidConfig { param: String, message: String },

    // === Input Shape Errors ===
    #[error("Length mismatch for {context}: expected {expected}, found {found}")]
    LengthMismatch {
        context: String,
        expected: usize,
        found: usize,
    },
}

impl IbeError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a LengthMismatch error.
    pub fn length_mismatch(context: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::LengthMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    /// Whether this error comes from configuration rather than input data.
    ///
    /// Configuration errors are fatal for the whole run; shape errors are
    /// tied to a single input file.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, IbeError::LengthMismatch { .. })
    }
}
