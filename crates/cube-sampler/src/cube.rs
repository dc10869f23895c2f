//! The correction cube: three coordinate axes plus a `(time, lat, lon)` field.

use std::fmt;
use std::ops::Range;

use chrono::NaiveDateTime;
use ibe_common::{hours_between, is_strictly_monotonic, wrap_to_180_in_place, Epoch};
use ndarray::{Array3, ArrayD, ArrayView1, ArrayViewD};
use tracing::{debug, warn};

use crate::error::Result;
use crate::field::CubeField;
use crate::sampler::{sample_with, AxisMappers};

/// A gridded correction field with its coordinate axes.
///
/// The time axis is in hours since `time_epoch`. Longitudes are whatever
/// the source provided until [`CorrectionCube::wrap_longitudes`] runs.
pub struct CorrectionCube {
    t_axis: Vec<f64>,
    y_axis: Vec<f64>,
    x_axis: Vec<f64>,
    time_epoch: Epoch,
    field: Box<dyn CubeField>,
    mappers: AxisMappers,
}

impl CorrectionCube {
    /// Build a cube, checking every axis against the field dimensions.
    pub fn new(
        t_axis: Vec<f64>,
        y_axis: Vec<f64>,
        x_axis: Vec<f64>,
        field: Box<dyn CubeField>,
        time_epoch: Epoch,
    ) -> Result<Self> {
        let mappers = AxisMappers::new(&t_axis, &y_axis, &x_axis)?;
        mappers.check_field(field.as_ref())?;

        Ok(Self {
            t_axis,
            y_axis,
            x_axis,
            time_epoch,
            field,
            mappers,
        })
    }

    /// Build a resident cube from an in-memory array.
    pub fn from_array(
        t_axis: Vec<f64>,
        y_axis: Vec<f64>,
        x_axis: Vec<f64>,
        values: Array3<f32>,
        time_epoch: Epoch,
    ) -> Result<Self> {
        Self::new(t_axis, y_axis, x_axis, Box::new(values), time_epoch)
    }

    pub fn t_axis(&self) -> &[f64] {
        &self.t_axis
    }

    pub fn y_axis(&self) -> &[f64] {
        &self.y_axis
    }

    pub fn x_axis(&self) -> &[f64] {
        &self.x_axis
    }

    /// Reference instant of the time axis.
    pub fn time_epoch(&self) -> &Epoch {
        &self.time_epoch
    }

    pub fn field(&self) -> &dyn CubeField {
        self.field.as_ref()
    }

    /// Dimensions as `[nt, ny, nx]`.
    pub fn dims(&self) -> [usize; 3] {
        self.field.dims()
    }

    pub fn is_resident(&self) -> bool {
        self.field.is_resident()
    }

    /// Hours from the cube epoch to `instant`.
    pub fn hours_at(&self, instant: &NaiveDateTime) -> f64 {
        hours_between(&self.time_epoch, instant)
    }

    /// First and last value of the time axis.
    pub fn time_range(&self) -> (f64, f64) {
        let first = self.t_axis.first().copied().unwrap_or(f64::NAN);
        let last = self.t_axis.last().copied().unwrap_or(f64::NAN);
        (first, last)
    }

    /// Wrap the longitude axis into the `[-180, 180]` convention.
    ///
    /// Axes spanning `[0, 360)` stop being monotonic after the wrap; the
    /// pixel mapping is then unreliable and a warning is logged.
    pub fn wrap_longitudes(&mut self) -> Result<()> {
        wrap_to_180_in_place(&mut self.x_axis);
        if !is_strictly_monotonic(&self.x_axis) {
            warn!(
                first = self.x_axis.first().copied().unwrap_or(f64::NAN),
                last = self.x_axis.last().copied().unwrap_or(f64::NAN),
                "Longitude axis is not monotonic after wrapping to [-180, 180]"
            );
        }
        self.mappers = AxisMappers::new(&self.t_axis, &self.y_axis, &self.x_axis)?;
        Ok(())
    }

    /// Keep only the time steps in `range`, pulling them into memory.
    pub fn restrict_time(self, range: Range<usize>) -> Result<Self> {
        let values = self.field.slice_time(range.clone())?.into_owned();
        debug!(
            start = range.start,
            end = range.end,
            resident_bytes = values.len() * std::mem::size_of::<f32>(),
            "Materialized time subset"
        );
        let t_axis = self.t_axis[range].to_vec();
        Self::from_array(t_axis, self.y_axis, self.x_axis, values, self.time_epoch)
    }

    /// Sample the cube at `(t, lat, lon)` points of any common shape.
    ///
    /// `t` is in hours since the cube epoch and `lon` must already follow
    /// the cube's longitude convention.
    pub fn sample(
        &self,
        t: ArrayViewD<'_, f64>,
        lat: ArrayViewD<'_, f64>,
        lon: ArrayViewD<'_, f64>,
    ) -> Result<ArrayD<f64>> {
        sample_with(&self.mappers, self.field.as_ref(), t, lat, lon)
    }

    /// Sample at 1-D point lists.
    pub fn sample_points(&self, t: &[f64], lat: &[f64], lon: &[f64]) -> Result<Vec<f64>> {
        let out = self.sample(
            ArrayView1::from(t).into_dyn(),
            ArrayView1::from(lat).into_dyn(),
            ArrayView1::from(lon).into_dyn(),
        )?;
        Ok(out.into_iter().collect())
    }
}

impl fmt::Debug for CorrectionCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionCube")
            .field("dims", &self.dims())
            .field("time_range", &self.time_range())
            .field("time_epoch", &self.time_epoch.to_string())
            .field("resident", &self.is_resident())
            .finish()
    }
}
