//! Loading correction cubes from NetCDF-4/HDF5 files.
//!
//! Coordinate axes are small and read eagerly. The `(time, lat, lon)` field
//! stays on disk in [`LoadMode::Lazy`] and is read one time slab at a time;
//! [`LoadMode::Resident`] pulls it into memory once. A time subset always
//! reads only the selected steps.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cube_sampler::{
    apply_subset, check_slab, CorrectionCube, CubeField, CubeSubset, SamplerError,
};
use ibe_common::{CfTimeUnits, Epoch, IbeError, TimeUnit};
use ndarray::{Array3, CowArray, Ix3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{get_string_attr, open, read_f64, require_variable, variable_shape};

/// Variable names inside a cube file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeFileLayout {
    pub lon: String,
    pub lat: String,
    pub time: String,
    /// The `(time, lat, lon)` correction field
    pub field: String,
}

impl Default for CubeFileLayout {
    fn default() -> Self {
        Self {
            lon: "lon".to_string(),
            lat: "lat".to_string(),
            time: "time".to_string(),
            field: "ibe".to_string(),
        }
    }
}

/// How the cube field is held during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Read time slabs from disk as needed.
    #[default]
    Lazy,
    /// Read the whole field into memory once.
    Resident,
}

impl FromStr for LoadMode {
    type Err = IbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lazy" => Ok(LoadMode::Lazy),
            "resident" => Ok(LoadMode::Resident),
            other => Err(IbeError::invalid_config(
                "load_mode",
                format!("expected 'lazy' or 'resident', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Lazy => f.write_str("lazy"),
            LoadMode::Resident => f.write_str("resident"),
        }
    }
}

/// A cube field left on disk; each slab request reopens the file.
#[derive(Debug, Clone)]
pub struct NetCdfCubeField {
    path: PathBuf,
    variable: String,
    dims: [usize; 3],
}

impl NetCdfCubeField {
    /// Inspect `variable` in `path` without reading its values.
    pub fn open(path: &Path, variable: &str) -> NetCdfResult<Self> {
        let file = open(path)?;
        let var = require_variable(&file, variable)?;
        let dims: [usize; 3] = variable_shape(&var).try_into().map_err(|shape: Vec<usize>| {
            NetCdfError::InvalidFormat(format!(
                "{} must be 3-D (time, lat, lon), found shape {:?}",
                variable, shape
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            variable: variable.to_string(),
            dims,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read time steps `range` into memory.
    pub fn read_slab(&self, range: Range<usize>) -> NetCdfResult<Array3<f32>> {
        let [_, ny, nx] = self.dims;
        let file = open(&self.path)?;
        let var = require_variable(&file, &self.variable)?;
        let values: Vec<f32> = var.get_values((range.clone(), .., ..)).map_err(|e| {
            NetCdfError::InvalidFormat(format!(
                "Failed to read {}[{}..{}]: {}",
                self.variable, range.start, range.end, e
            ))
        })?;
        Ok(Array3::from_shape_vec((range.len(), ny, nx), values)?)
    }

    /// Read the whole field into memory.
    pub fn read_all(&self) -> NetCdfResult<Array3<f32>> {
        self.read_slab(0..self.dims[0])
    }
}

impl CubeField for NetCdfCubeField {
    fn dims(&self) -> [usize; 3] {
        self.dims
    }

    fn slice_time(&self, range: Range<usize>) -> cube_sampler::Result<CowArray<'_, f32, Ix3>> {
        check_slab(&range, self.dims[0])?;
        self.read_slab(range)
            .map(CowArray::from)
            .map_err(|e| SamplerError::slice_failed(e.to_string()))
    }

    fn is_resident(&self) -> bool {
        false
    }
}

/// Read the time axis in hours together with its reference epoch.
///
/// Without a `units` attribute the axis is taken as hours since 1900-01-01.
fn read_time_axis(file: &netcdf::File, name: &str) -> NetCdfResult<(Vec<f64>, Epoch)> {
    let (raw, _) = read_f64(file, name)?;
    let var = require_variable(file, name)?;

    match get_string_attr(&var, "units") {
        Some(units) => {
            let units = CfTimeUnits::parse(&units)?;
            if units.unit == TimeUnit::Hours {
                return Ok((raw, units.epoch));
            }
            debug!(unit = ?units.unit, "Rescaling cube time axis to hours");
            let factor = units.unit.hours_factor();
            Ok((raw.iter().map(|v| v * factor).collect(), units.epoch))
        }
        None => {
            warn!(variable = name, "Cube time axis has no units; assuming hours since 1900-01-01");
            Ok((raw, Epoch::era_interim()))
        }
    }
}

/// Open a cube file: axes eagerly, field per `mode`.
///
/// The longitude axis is wrapped into `[-180, 180]` before returning.
pub fn open_cube(path: &Path, layout: &CubeFileLayout, mode: LoadMode) -> NetCdfResult<CorrectionCube> {
    let (lon, lat, (time, epoch)) = {
        let file = open(path)?;
        (
            read_f64(&file, &layout.lon)?.0,
            read_f64(&file, &layout.lat)?.0,
            read_time_axis(&file, &layout.time)?,
        )
    };

    let field = NetCdfCubeField::open(path, &layout.field)?;
    let field: Box<dyn CubeField> = match mode {
        LoadMode::Lazy => Box::new(field),
        LoadMode::Resident => Box::new(field.read_all()?),
    };

    let mut cube = CorrectionCube::new(time, lat, lon, field, epoch)?;
    cube.wrap_longitudes()?;

    let (first, last) = cube.time_range();
    info!(
        path = %path.display(),
        dims = ?cube.dims(),
        mode = %mode,
        epoch = %epoch,
        first_hour = first,
        last_hour = last,
        "Opened correction cube"
    );
    Ok(cube)
}

/// Open a cube and apply `subset` once.
///
/// A time subset always opens lazily so only the selected steps are read.
pub fn load_cube(
    path: &Path,
    layout: &CubeFileLayout,
    mode: LoadMode,
    subset: &CubeSubset,
) -> NetCdfResult<CorrectionCube> {
    subset.validate()?;

    let open_mode = if subset.time.is_some() { LoadMode::Lazy } else { mode };
    let cube = open_cube(path, layout, open_mode)?;
    Ok(apply_subset(cube, subset)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = CubeFileLayout::default();
        assert_eq!(layout.field, "ibe");
        assert_eq!(layout.time, "time");
    }

    #[test]
    fn test_load_mode_parsing() {
        assert_eq!("lazy".parse::<LoadMode>().unwrap(), LoadMode::Lazy);
        assert_eq!("Resident".parse::<LoadMode>().unwrap(), LoadMode::Resident);
        let err = "eager".parse::<LoadMode>().unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(LoadMode::default(), LoadMode::Lazy);
    }

    #[test]
    fn test_missing_file() {
        let err = open_cube(Path::new("/nonexistent/cube.h5"), &CubeFileLayout::default(), LoadMode::Lazy)
            .unwrap_err();
        assert!(matches!(err, NetCdfError::InvalidFormat(_)));
    }
}
