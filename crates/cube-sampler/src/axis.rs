//! Mapping physical axis coordinates into pixel-index space.
//!
//! The interpolation kernel works on array indices, not on degrees or
//! hours. Each axis is mapped independently by 1-D linear interpolation of
//! the target value against `(axis[k], k)`. Axes may be unevenly spaced and
//! may run in either direction; targets beyond the axis clamp to the edge
//! pixel.

use crate::error::{Result, SamplerError};

/// A reusable coordinate-to-pixel mapper for one axis.
///
/// Strictly decreasing axes are stored reversed (together with their pixel
/// indices) so the lookup always sees increasing sample points.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelMapper {
    coords: Vec<f64>,
    pixels: Vec<f64>,
    reversed: bool,
}

impl PixelMapper {
    /// Build a mapper for `axis`.
    pub fn new(axis: &[f64]) -> Result<Self> {
        Self::named("axis", axis)
    }

    /// Build a mapper, naming the axis in errors.
    pub fn named(name: &str, axis: &[f64]) -> Result<Self> {
        if axis.is_empty() {
            return Err(SamplerError::EmptyAxis(name.to_string()));
        }

        let mut coords = axis.to_vec();
        let mut pixels: Vec<f64> = (0..axis.len()).map(|k| k as f64).collect();
        let reversed = axis.len() > 1 && axis.windows(2).all(|w| w[1] < w[0]);
        if reversed {
            coords.reverse();
            pixels.reverse();
        }

        Ok(Self {
            coords,
            pixels,
            reversed,
        })
    }

    /// Number of samples on the axis.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Whether the source axis was strictly decreasing.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Fractional pixel index of `value`, clamped to `[0, len - 1]`.
    ///
    /// NaN maps to NaN.
    pub fn to_pixel(&self, value: f64) -> f64 {
        let xp = &self.coords;
        let fp = &self.pixels;
        let n = xp.len();

        if value.is_nan() {
            return f64::NAN;
        }
        if n == 1 || value <= xp[0] {
            return fp[0];
        }
        if value >= xp[n - 1] {
            return fp[n - 1];
        }

        // First sample strictly above the target; 1 <= j <= n - 1 here.
        let j = xp.partition_point(|&c| c <= value);
        let (x0, x1) = (xp[j - 1], xp[j]);
        let (f0, f1) = (fp[j - 1], fp[j]);
        f0 + (value - x0) * (f1 - f0) / (x1 - x0)
    }

    /// Map every target value.
    pub fn to_pixels(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.to_pixel(v)).collect()
    }
}

/// Map `targets` into the pixel space of `axis`.
pub fn interp_pixels(axis: &[f64], targets: &[f64]) -> Result<Vec<f64>> {
    Ok(PixelMapper::new(axis)?.to_pixels(targets))
}
