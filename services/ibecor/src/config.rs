//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! `IBE_*` environment variables, then command-line flags. `validate()` runs
//! last, before any file is opened.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cube_sampler::CubeSubset;
use ibe_common::{Epoch, IbeError, IbeResult};
use netcdf_io::{ColumnIndices, CubeFileLayout, InputFormat, LoadMode, VariableNames};
use projection::ProjectionCode;
use serde::{Deserialize, Serialize};

use crate::error::ApplyError;

/// Cube file used when none is configured.
pub const DEFAULT_CUBE_FILE: &str = "IBE_antarctica_3h_19900101-20170331.h5";

/// What to do with the computed correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Write coordinates, time and correction to a side-car file.
    #[default]
    Export,
    /// Subtract the correction from the heights and store it in the file.
    Apply,
}

/// Input file family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// NetCDF-4/HDF5 with named variables
    #[default]
    Structured,
    /// Delimited text columns
    Delimited,
}

impl FromStr for FormatKind {
    type Err = IbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structured" | "hdf5" | "h5" | "netcdf" => Ok(FormatKind::Structured),
            "delimited" | "ascii" | "text" => Ok(FormatKind::Delimited),
            other => Err(IbeError::invalid_config(
                "format",
                format!("expected 'structured' or 'delimited', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::Structured => f.write_str("structured"),
            FormatKind::Delimited => f.write_str("delimited"),
        }
    }
}

/// Configuration for an IBE correction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IbeConfig {
    /// Correction cube file.
    pub cube_file: PathBuf,

    /// Variable names inside the cube file.
    pub cube_layout: CubeFileLayout,

    /// Whether the cube field stays on disk or is read up front.
    pub load_mode: LoadMode,

    /// Optional cube subset, applied once before any input is processed.
    pub subset: CubeSubset,

    pub format: FormatKind,

    /// Variable names for structured input.
    pub variables: VariableNames,

    /// Column positions for delimited input.
    pub columns: ColumnIndices,

    /// Field separator for delimited input; runs of whitespace when unset.
    pub delimiter: Option<char>,

    /// Reference epoch of the input time stamps (seconds since).
    pub epoch: Epoch,

    pub mode: OutputMode,

    /// Projection code of the input x/y; `4326` means lon/lat.
    pub projection: String,
}

impl Default for IbeConfig {
    fn default() -> Self {
        Self {
            cube_file: PathBuf::from(DEFAULT_CUBE_FILE),
            cube_layout: CubeFileLayout::default(),
            load_mode: LoadMode::default(),
            subset: CubeSubset::default(),
            format: FormatKind::default(),
            variables: VariableNames::default(),
            columns: ColumnIndices::default(),
            delimiter: None,
            epoch: Epoch::unix(),
            mode: OutputMode::default(),
            projection: ProjectionCode::Epsg4326.as_str().to_string(),
        }
    }
}

impl IbeConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml(path: &Path) -> Result<Self, ApplyError> {
        let text = std::fs::read_to_string(path).map_err(|source| ApplyError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ApplyError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override values from `IBE_*` environment variables.
    pub fn apply_env(&mut self) -> IbeResult<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override values from an environment lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> IbeResult<()> {
        if let Some(val) = lookup("IBE_CUBE_FILE") {
            self.cube_file = PathBuf::from(val);
        }

        if let Some(val) = lookup("IBE_CUBE_VARIABLE") {
            self.cube_layout.field = val;
        }

        if let Some(val) = lookup("IBE_LOAD_MODE") {
            self.load_mode = val.parse()?;
        }

        if let Some(val) = lookup("IBE_PROJECTION") {
            self.projection = val;
        }

        Ok(())
    }

    /// Parsed projection code.
    pub fn projection_code(&self) -> IbeResult<ProjectionCode> {
        self.projection.parse()
    }

    /// The reader matching `format`.
    pub fn input_format(&self) -> IbeResult<InputFormat> {
        Ok(match self.format {
            FormatKind::Structured => InputFormat::Structured(self.variables.clone()),
            FormatKind::Delimited => InputFormat::Delimited {
                columns: self.columns,
                delimiter: self.delimiter_byte()?,
            },
        })
    }

    fn delimiter_byte(&self) -> IbeResult<Option<u8>> {
        self.delimiter
            .map(|c| {
                u8::try_from(c)
                    .ok()
                    .filter(u8::is_ascii)
                    .ok_or_else(|| IbeError::invalid_config("delimiter", format!("'{}' is not ASCII", c)))
            })
            .transpose()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> IbeResult<()> {
        self.projection_code()?;
        self.subset.validate()?;
        self.delimiter_byte()?;

        if self.mode == OutputMode::Apply && self.format == FormatKind::Delimited {
            return Err(IbeError::invalid_config(
                "mode",
                "apply mode needs structured input; use export for delimited files",
            ));
        }

        let names = &self.variables;
        for (param, name) in [("variables.x", &names.x), ("variables.y", &names.y), ("variables.t", &names.t), ("variables.z", &names.z)] {
            if name.trim().is_empty() {
                return Err(IbeError::invalid_config(param, "variable name is empty"));
            }
        }

        if self.cube_file.as_os_str().is_empty() {
            return Err(IbeError::invalid_config("cube_file", "no cube file configured"));
        }

        Ok(())
    }
}
