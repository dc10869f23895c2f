//! Error types for the correction run.

use std::path::PathBuf;

use cube_sampler::SamplerError;
use ibe_common::IbeError;
use netcdf_io::NetCdfError;
use thiserror::Error;

/// Errors while correcting a single input file.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Io(#[from] NetCdfError),

    #[error(transparent)]
    Sampling(#[from] SamplerError),

    /// Projection, shape or configuration problem with the file's inputs
    #[error(transparent)]
    Input(#[from] IbeError),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("apply mode needs heights but none were read")]
    MissingHeight,
}

/// Errors that stop a correction run.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("configuration error: {0}")]
    Config(#[from] IbeError),

    #[error("failed to read configuration file {}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The correction cube could not be loaded
    #[error("failed to load correction cube: {0}")]
    Cube(#[from] NetCdfError),

    /// A single input file failed; the run stops here
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: FileError,
    },
}

impl FileError {
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Io(e) => e.is_configuration_error(),
            Self::Sampling(e) => e.is_configuration_error(),
            Self::Input(e) => e.is_configuration_error(),
            Self::Shape(_) | Self::MissingHeight => false,
        }
    }
}

impl ApplyError {
    /// Whether the run failed on configuration rather than on data.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Config(_) | Self::ReadConfig { .. } | Self::ParseConfig { .. } => true,
            Self::Cube(e) => e.is_configuration_error(),
            Self::File { source, .. } => source.is_configuration_error(),
        }
    }

    /// The input file that failed, if any.
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            Self::File { path, .. } => Some(path),
            _ => None,
        }
    }
}
