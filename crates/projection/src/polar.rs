//! Polar Stereographic projections.
//!
//! The ellipsoidal form follows Snyder, "Map Projections: A Working Manual"
//! (USGS PP 1395), for a secant projection defined by a latitude of true
//! scale. The south-polar case is obtained by reflecting the north-polar
//! formulas. Projected coordinates are in kilometres.
//!
//! Parameters of the supported grids:
//! - EPSG:3031 (Antarctic Polar Stereographic): lat_ts = -71, lon_0 = 0
//! - CATS2008 tide model grid: lat_ts = -71, lon_0 = -70
//! - EPSG:3976 (NSIDC Sea Ice Polar Stereographic South): lat_ts = -70, lon_0 = 0

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::transform::CoordTransform;

/// WGS84 semi-major axis in kilometres.
pub const WGS84_SEMI_MAJOR_KM: f64 = 6378.137;

/// WGS84 flattening.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257223563;

/// Kilometres per degree of colatitude used by the north-polar approximation.
pub const PS_NORTH_KM_PER_DEGREE: f64 = 111.7;

const MAX_ITERATIONS: usize = 15;
const CONVERGENCE: f64 = 1e-12;

/// Which pole the projection is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    North,
    South,
}

/// Ellipsoidal Polar Stereographic projection.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    pub pole: Pole,
    /// Latitude of true scale (degrees)
    pub lat_ts: f64,
    /// Central meridian (degrees)
    pub lon_0: f64,
    /// Semi-major axis (km)
    pub semi_major: f64,
    /// First eccentricity
    e: f64,
    /// Radius scale applied to the isometric term t(phi)
    rho_scale: f64,
}

impl PolarStereographic {
    /// Create a WGS84 polar stereographic projection.
    ///
    /// The pole is taken from the sign of `lat_ts`.
    pub fn new(lat_ts: f64, lon_0: f64) -> Self {
        let pole = if lat_ts < 0.0 { Pole::South } else { Pole::North };
        let semi_major = WGS84_SEMI_MAJOR_KM;
        let e = (WGS84_FLATTENING * (2.0 - WGS84_FLATTENING)).sqrt();

        let phi_c = lat_ts.abs().to_radians();
        let rho_scale = if (phi_c - FRAC_PI_2).abs() < 1e-10 {
            // True scale at the pole (k0 = 1)
            2.0 * semi_major / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt()
        } else {
            let sin_c = phi_c.sin();
            let m_c = phi_c.cos() / (1.0 - e * e * sin_c * sin_c).sqrt();
            semi_major * m_c / isometric_t(phi_c, e)
        };

        Self {
            pole,
            lat_ts,
            lon_0,
            semi_major,
            e,
            rho_scale,
        }
    }

    /// EPSG:3031 Antarctic Polar Stereographic.
    pub fn epsg3031() -> Self {
        Self::new(-71.0, 0.0)
    }

    /// CATS2008 Antarctic tide model grid.
    pub fn cats2008() -> Self {
        Self::new(-71.0, -70.0)
    }

    /// EPSG:3976 NSIDC Sea Ice Polar Stereographic South.
    pub fn epsg3976() -> Self {
        Self::new(-70.0, 0.0)
    }

    /// Geodetic latitude from the isometric term t by fixed-point iteration.
    fn latitude_from_t(&self, t: f64) -> f64 {
        let e = self.e;
        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..MAX_ITERATIONS {
            let es = e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).atan();
            let converged = (next - phi).abs() < CONVERGENCE;
            phi = next;
            if converged {
                break;
            }
        }
        phi
    }
}

impl CoordTransform for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let phi = match self.pole {
            Pole::North => lat.to_radians(),
            Pole::South => -lat.to_radians(),
        };
        let dlam = (lon - self.lon_0).to_radians();
        let rho = self.rho_scale * isometric_t(phi, self.e);

        match self.pole {
            Pole::North => (rho * dlam.sin(), -rho * dlam.cos()),
            Pole::South => (rho * dlam.sin(), rho * dlam.cos()),
        }
    }

    fn backward(&self, x: f64, y: f64) -> (f64, f64) {
        let rho = x.hypot(y);
        let pole_lat = match self.pole {
            Pole::North => 90.0,
            Pole::South => -90.0,
        };
        if rho == 0.0 {
            return (self.lon_0, pole_lat);
        }

        let phi = self.latitude_from_t(rho / self.rho_scale);
        let (lat, dlam) = match self.pole {
            Pole::North => (phi, x.atan2(-y)),
            Pole::South => (-phi, x.atan2(y)),
        };

        (adjust_lon(self.lon_0 + dlam.to_degrees()), lat.to_degrees())
    }
}

/// Closed-form north-polar stereographic approximation ("PSNorth").
///
/// Uses a constant 111.7 km per degree of colatitude instead of an
/// ellipsoid. Backward longitudes are returned in [0, 360).
#[derive(Debug, Clone, Copy, Default)]
pub struct PsNorth;

impl CoordTransform for PsNorth {
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let r = (90.0 - lat) * PS_NORTH_KM_PER_DEGREE;
        let theta = lon.to_radians();
        (r * theta.cos(), r * theta.sin())
    }

    fn backward(&self, x: f64, y: f64) -> (f64, f64) {
        let lat = 90.0 - x.hypot(y) / PS_NORTH_KM_PER_DEGREE;
        let mut lon = y.atan2(x).to_degrees();
        if lon < 0.0 {
            lon += 360.0;
        }
        (lon, lat)
    }
}

/// Snyder's t(phi) for a latitude measured from the projection pole.
fn isometric_t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

/// Bring a longitude into [-180, 180].
fn adjust_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}
