//! Error types for cube sampling.

use ibe_common::IbeError;
use thiserror::Error;

/// Errors that can occur while building or sampling a correction cube.
#[derive(Error, Debug)]
pub enum SamplerError {
    /// A coordinate axis has no values.
    #[error("axis '{0}' is empty")]
    EmptyAxis(String),

    /// An axis length disagrees with the field dimension it labels.
    #[error("axis '{axis}' has {axis_len} values but the field has {field_len} along it")]
    AxisMismatch {
        axis: String,
        axis_len: usize,
        field_len: usize,
    },

    /// The three query arrays do not share one shape.
    #[error("query shapes differ: t {t:?}, y {y:?}, x {x:?}")]
    ShapeMismatch {
        t: Vec<usize>,
        y: Vec<usize>,
        x: Vec<usize>,
    },

    /// A time slab outside the field was requested.
    #[error("time slab {start}..{end} is outside a field with {len} time steps")]
    SlabOutOfBounds { start: usize, end: usize, len: usize },

    /// The field backend failed to produce a slab.
    #[error("failed to read field slab: {0}")]
    SliceFailed(String),

    /// Array layout error.
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Configuration error (subset requests, time windows).
    #[error(transparent)]
    Config(#[from] IbeError),
}

impl SamplerError {
    /// Create a SliceFailed error.
    pub fn slice_failed(msg: impl Into<String>) -> Self {
        Self::SliceFailed(msg.into())
    }

    /// Create an AxisMismatch error.
    pub fn axis_mismatch(axis: impl Into<String>, axis_len: usize, field_len: usize) -> Self {
        Self::AxisMismatch {
            axis: axis.into(),
            axis_len,
            field_len,
        }
    }

    /// Whether the error stems from configuration rather than data.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Config(e) if e.is_configuration_error())
    }
}

/// Result type for sampler operations.
pub type Result<T> = std::result::Result<T, SamplerError>;
