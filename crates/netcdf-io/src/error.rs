//! Error types for NetCDF and text I/O.

use std::path::PathBuf;

use cube_sampler::SamplerError;
use ibe_common::IbeError;
use thiserror::Error;

/// Result type for I/O operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for reading cubes and observations and writing results.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Error raised by libnetcdf
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// Delimited text error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// The output path is already taken
    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// The input already holds a stored correction
    #[error("{} already carries an 'h_ibe' variable; refusing to correct it twice", .0.display())]
    AlreadyCorrected(PathBuf),

    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Common(#[from] IbeError),
}

impl NetCdfError {
    /// Whether the error stems from configuration rather than file contents.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Sampler(e) => e.is_configuration_error(),
            Self::Common(e) => e.is_configuration_error(),
            _ => false,
        }
    }
}
