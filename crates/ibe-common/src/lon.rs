//! Longitude normalization.
//!
//! The wrap is one-sided: values above 180 are shifted down by a single
//! turn, values at or below -180 are left alone. Cube axes and observation
//! longitudes go through the same function so they stay comparable.

/// Wrap a longitude into the [-180, 180] convention used by the cube.
///
/// `181 -> -179`, `180 -> 180`, `-181 -> -181`.
#[inline]
pub fn wrap_to_180(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Wrap a slice of longitudes in place.
pub fn wrap_to_180_in_place(lons: &mut [f64]) {
    for lon in lons.iter_mut() {
        *lon = wrap_to_180(*lon);
    }
}

/// Whether the values are strictly monotonic (either direction).
pub fn is_strictly_monotonic(values: &[f64]) -> bool {
    let ascending = values.windows(2).all(|w| w[1] > w[0]);
    let descending = values.windows(2).all(|w| w[1] < w[0]);
    ascending || descending
}
