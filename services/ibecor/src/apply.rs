//! The per-file correction loop.
//!
//! Each input is read, its times moved onto the cube's epoch, its
//! longitudes wrapped, and the shared cube sampled at every observation.
//! The result is either written back into the file (apply) or to a
//! side-car file (export).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cube_sampler::CorrectionCube;
use ibe_common::{secs_to_hours, wrap_to_180_in_place, Epoch, IbeError, ObservationSet};
use ndarray::{ArrayViewD, IxDyn};
use netcdf_io::{
    apply_in_place, check_correctable, export_delimited, export_structured, load_cube,
    output_path, CorrectionExport, InPlaceCorrection, InputFormat,
};
use projection::{convert_xy_ll, Direction, ProjectionCode};
use tracing::{debug, info, warn};

use crate::config::{IbeConfig, OutputMode};
use crate::error::{ApplyError, FileError};

/// Outcome of one corrected input file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub observations: usize,
    /// Mean of the finite corrections, NaN if there are none
    pub mean_correction: f64,
}

/// Corrections for one observation set, with the coordinates to export.
#[derive(Debug, Clone)]
pub struct Corrections {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub correction: Vec<f64>,
}

/// Load the configured cube once, ready to share across files.
pub fn load_shared_cube(config: &IbeConfig) -> Result<Arc<CorrectionCube>, ApplyError> {
    config.validate()?;
    let cube = load_cube(
        &config.cube_file,
        &config.cube_layout,
        config.load_mode,
        &config.subset,
    )?;
    Ok(Arc::new(cube))
}

/// Applies the IBE correction to input files using one shared cube.
#[derive(Debug, Clone)]
pub struct CorrectionApplier {
    cube: Arc<CorrectionCube>,
    format: InputFormat,
    mode: OutputMode,
    epoch: Epoch,
    projection: ProjectionCode,
}

impl CorrectionApplier {
    pub fn new(cube: Arc<CorrectionCube>, config: &IbeConfig) -> Result<Self, ApplyError> {
        config.validate()?;
        Ok(Self {
            cube,
            format: config.input_format()?,
            mode: config.mode,
            epoch: config.epoch,
            projection: config.projection_code()?,
        })
    }

    pub fn cube(&self) -> &Arc<CorrectionCube> {
        &self.cube
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Sample the cube at every observation.
    ///
    /// Projected inputs are converted back to lon/lat first; exports keep
    /// their original projected coordinates.
    pub fn compute(&self, obs: &ObservationSet) -> Result<Corrections, FileError> {
        let hours = secs_to_hours(&obs.t, &self.epoch, self.cube.time_epoch());

        let (mut lon, lat) = if self.projection.is_identity() {
            (obs.x.clone(), obs.y.clone())
        } else {
            convert_xy_ll(&obs.x, &obs.y, self.projection.as_str(), Direction::Backward)?
        };
        wrap_to_180_in_place(&mut lon);

        let shape = IxDyn(&obs.shape);
        let values = self.cube.sample(
            ArrayViewD::from_shape(shape.clone(), hours.as_slice())?,
            ArrayViewD::from_shape(shape.clone(), lat.as_slice())?,
            ArrayViewD::from_shape(shape, lon.as_slice())?,
        )?;
        let correction: Vec<f64> = values.into_iter().collect();

        let (x, y) = if self.projection.is_identity() {
            (lon, lat)
        } else {
            (obs.x.clone(), obs.y.clone())
        };
        Ok(Corrections { x, y, correction })
    }

    /// Correct one file.
    pub fn process_file(&self, path: &Path) -> Result<FileReport, ApplyError> {
        self.correct(path).map_err(|source| ApplyError::File {
            path: path.to_path_buf(),
            source,
        })
    }

    fn correct(&self, path: &Path) -> Result<FileReport, FileError> {
        let apply = self.mode == OutputMode::Apply;
        let output = output_path(path, self.format.is_structured());

        if apply {
            check_correctable(path, self.height_variable()?)?;
        }

        let obs = self.format.read(path, apply)?;
        debug!(path = %path.display(), observations = obs.len(), "Read observations");

        let result = self.compute(&obs)?;

        if apply {
            let heights = obs.z.as_ref().ok_or(FileError::MissingHeight)?;
            let corrected: Vec<f64> = heights
                .iter()
                .zip(&result.correction)
                .map(|(h, c)| h - c)
                .collect();
            apply_in_place(
                path,
                &output,
                &InPlaceCorrection {
                    height_variable: self.height_variable()?,
                    corrected: &corrected,
                    correction: &result.correction,
                },
            )?;
        } else {
            let export = CorrectionExport {
                names: self.export_names(),
                x: &result.x,
                y: &result.y,
                t: &obs.t,
                correction: &result.correction,
                shape: &obs.shape,
            };
            match &self.format {
                InputFormat::Structured(_) => export_structured(&output, &export)?,
                InputFormat::Delimited { .. } => export_delimited(&output, &export)?,
            }
        }

        let report = FileReport {
            input: path.to_path_buf(),
            output,
            observations: obs.len(),
            mean_correction: finite_mean(&result.correction),
        };
        info!(
            input = %report.input.display(),
            output = %report.output.display(),
            observations = report.observations,
            mean_correction = report.mean_correction,
            "Corrected file"
        );
        Ok(report)
    }

    /// Correct every file in order, stopping at the first failure.
    pub fn run<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Vec<FileReport>, ApplyError> {
        let mut reports = Vec::with_capacity(inputs.len());
        for (n, input) in inputs.iter().enumerate() {
            let input = input.as_ref();
            match self.process_file(input) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(
                        file = %input.display(),
                        index = n,
                        completed = reports.len(),
                        error = %e,
                        "Stopping run on failed file"
                    );
                    return Err(e);
                }
            }
        }
        Ok(reports)
    }

    fn height_variable(&self) -> Result<&str, FileError> {
        match &self.format {
            InputFormat::Structured(names) => Ok(names.z.as_str()),
            InputFormat::Delimited { .. } => Err(IbeError::invalid_config(
                "mode",
                "apply mode needs structured input",
            )
            .into()),
        }
    }

    fn export_names(&self) -> [&str; 3] {
        match &self.format {
            InputFormat::Structured(names) => [names.x.as_str(), names.y.as_str(), names.t.as_str()],
            InputFormat::Delimited { .. } => ["x", "y", "t"],
        }
    }
}

fn finite_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
