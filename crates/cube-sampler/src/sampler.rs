//! Trilinear sampling in pixel space.
//!
//! Query coordinates are first mapped to fractional pixel indices along
//! each axis (see [`PixelMapper`]). The lower bracketing index is
//! `floor(p)` clamped to `n - 2`, so a query on the last sample uses the
//! final cell with weight 1 on its upper corner. Corners with zero weight
//! are never read, which keeps single-sample axes and exact nodes exact.
//!
//! Only the time steps bracketing the queries are pulled from the field.

use std::ops::Range;

use ndarray::{ArrayD, ArrayView3, ArrayViewD, IxDyn};
use tracing::debug;

use crate::axis::PixelMapper;
use crate::error::{Result, SamplerError};
use crate::field::CubeField;

/// Axis mappers for a `(time, lat, lon)` field.
#[derive(Debug, Clone)]
pub struct AxisMappers {
    pub t: PixelMapper,
    pub y: PixelMapper,
    pub x: PixelMapper,
}

impl AxisMappers {
    pub fn new(t_axis: &[f64], y_axis: &[f64], x_axis: &[f64]) -> Result<Self> {
        Ok(Self {
            t: PixelMapper::named("time", t_axis)?,
            y: PixelMapper::named("lat", y_axis)?,
            x: PixelMapper::named("lon", x_axis)?,
        })
    }

    /// Check the mapper lengths against the field dimensions.
    pub fn check_field(&self, field: &dyn CubeField) -> Result<()> {
        let [nt, ny, nx] = field.dims();
        for (name, mapper, n) in [("time", &self.t, nt), ("lat", &self.y, ny), ("lon", &self.x, nx)] {
            if mapper.len() != n {
                return Err(SamplerError::axis_mismatch(name, mapper.len(), n));
            }
        }
        Ok(())
    }
}

/// Sample `field` at scattered `(t, y, x)` points.
///
/// The axes label the field dimensions `(time, lat, lon)` and may be
/// ascending or descending. The three query arrays must share one shape,
/// which is also the shape of the result. NaN in any query coordinate gives
/// NaN at that point.
pub fn interp3d(
    t_axis: &[f64],
    y_axis: &[f64],
    x_axis: &[f64],
    field: &dyn CubeField,
    ti: ArrayViewD<'_, f64>,
    yi: ArrayViewD<'_, f64>,
    xi: ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>> {
    let mappers = AxisMappers::new(t_axis, y_axis, x_axis)?;
    mappers.check_field(field)?;
    sample_with(&mappers, field, ti, yi, xi)
}

/// Sample with prebuilt mappers. The caller guarantees they match `field`.
pub fn sample_with(
    mappers: &AxisMappers,
    field: &dyn CubeField,
    ti: ArrayViewD<'_, f64>,
    yi: ArrayViewD<'_, f64>,
    xi: ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>> {
    if ti.shape() != yi.shape() || ti.shape() != xi.shape() {
        return Err(SamplerError::ShapeMismatch {
            t: ti.shape().to_vec(),
            y: yi.shape().to_vec(),
            x: xi.shape().to_vec(),
        });
    }
    let shape = ti.shape().to_vec();
    let [nt, ny, nx] = field.dims();

    let tp: Vec<f64> = ti.iter().map(|&v| mappers.t.to_pixel(v)).collect();
    let yp: Vec<f64> = yi.iter().map(|&v| mappers.y.to_pixel(v)).collect();
    let xp: Vec<f64> = xi.iter().map(|&v| mappers.x.to_pixel(v)).collect();

    let valid = |n: usize| !(tp[n].is_nan() || yp[n].is_nan() || xp[n].is_nan());
    let mut values = vec![f64::NAN; tp.len()];

    let lowers = (0..tp.len()).filter(|&n| valid(n)).map(|n| bracket(tp[n], nt).0);
    if let Some(window) = time_window(lowers, nt) {
        debug!(
            start = window.start,
            end = window.end,
            points = tp.len(),
            "Reading time slab"
        );
        let slab = field.slice_time(window.clone())?;
        let slab = slab.view();

        for (n, value) in values.iter_mut().enumerate() {
            if !valid(n) {
                continue;
            }
            let (k, wk) = bracket(tp[n], nt);
            *value = trilinear(
                &slab,
                (k - window.start, wk),
                bracket(yp[n], ny),
                bracket(xp[n], nx),
            );
        }
    }

    Ok(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
}

/// Lower bracketing index and upper weight for pixel `p` on an axis of `n`.
fn bracket(p: f64, n: usize) -> (usize, f64) {
    if n < 2 {
        return (0, 0.0);
    }
    let lower = (p.floor().max(0.0) as usize).min(n - 2);
    (lower, p - lower as f64)
}

/// Smallest time range covering every bracketing pair.
fn time_window(lowers: impl Iterator<Item = usize>, nt: usize) -> Option<Range<usize>> {
    let (lo, hi) = lowers.fold(None, |acc: Option<(usize, usize)>, k| match acc {
        None => Some((k, k)),
        Some((lo, hi)) => Some((lo.min(k), hi.max(k))),
    })?;
    Some(lo..(hi + 2).min(nt))
}

fn trilinear(
    slab: &ArrayView3<'_, f32>,
    (k, wk): (usize, f64),
    (j, wj): (usize, f64),
    (i, wi): (usize, f64),
) -> f64 {
    let mut acc = 0.0;
    for (dk, fk) in [(0, 1.0 - wk), (1, wk)] {
        if fk == 0.0 {
            continue;
        }
        for (dj, fj) in [(0, 1.0 - wj), (1, wj)] {
            if fj == 0.0 {
                continue;
            }
            for (di, fi) in [(0, 1.0 - wi), (1, wi)] {
                if fi == 0.0 {
                    continue;
                }
                acc += fk * fj * fi * f64::from(slab[[k + dk, j + dj, i + di]]);
            }
        }
    }
    acc
}
