//! Geographic (EPSG:4326) pass-through.

use crate::transform::CoordTransform;

/// Identity transform for data already in longitude/latitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl CoordTransform for Geographic {
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        (lon, lat)
    }

    fn backward(&self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }
}
