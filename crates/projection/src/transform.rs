//! Projection dispatch by code.

use std::fmt;
use std::str::FromStr;

use ibe_common::{IbeError, IbeResult};

use crate::geographic::Geographic;
use crate::polar::{PolarStereographic, PsNorth};

/// A two-way coordinate transform.
///
/// `forward` maps geographic (lon, lat) in degrees to projected (x, y);
/// `backward` is its inverse.
pub trait CoordTransform {
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64);

    fn backward(&self, x: f64, y: f64) -> (f64, f64);

    /// Apply the transform in the given direction.
    fn apply(&self, direction: Direction, i1: f64, i2: f64) -> (f64, f64) {
        match direction {
            Direction::Forward => self.forward(i1, i2),
            Direction::Backward => self.backward(i1, i2),
        }
    }
}

/// Supported projection codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionCode {
    /// Antarctic Polar Stereographic
    Epsg3031,
    /// CATS2008 tide model grid
    Cats2008,
    /// NSIDC Sea Ice Polar Stereographic South
    Epsg3976,
    /// Closed-form north polar approximation
    PsNorth,
    /// Geographic lon/lat (pass-through)
    Epsg4326,
}

impl ProjectionCode {
    pub const ALL: [ProjectionCode; 5] = [
        ProjectionCode::Epsg3031,
        ProjectionCode::Cats2008,
        ProjectionCode::Epsg3976,
        ProjectionCode::PsNorth,
        ProjectionCode::Epsg4326,
    ];

    /// The code string used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionCode::Epsg3031 => "3031",
            ProjectionCode::Cats2008 => "CATS2008",
            ProjectionCode::Epsg3976 => "3976",
            ProjectionCode::PsNorth => "PSNorth",
            ProjectionCode::Epsg4326 => "4326",
        }
    }

    /// Whether the code maps coordinates onto themselves.
    pub fn is_identity(&self) -> bool {
        matches!(self, ProjectionCode::Epsg4326)
    }

    /// Build the transform for this code.
    pub fn transform(&self) -> Box<dyn CoordTransform> {
        match self {
            ProjectionCode::Epsg3031 => Box::new(PolarStereographic::epsg3031()),
            ProjectionCode::Cats2008 => Box::new(PolarStereographic::cats2008()),
            ProjectionCode::Epsg3976 => Box::new(PolarStereographic::epsg3976()),
            ProjectionCode::PsNorth => Box::new(PsNorth),
            ProjectionCode::Epsg4326 => Box::new(Geographic),
        }
    }
}

impl FromStr for ProjectionCode {
    type Err = IbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectionCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| IbeError::UnknownProjection(s.to_string()))
    }
}

impl fmt::Display for ProjectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a transform: forward (`F`) or backward (`B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl FromStr for Direction {
    type Err = IbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "F" => Ok(Direction::Forward),
            "B" => Ok(Direction::Backward),
            _ => Err(IbeError::InvalidDirection(s.to_string())),
        }
    }
}

/// Convert coordinate arrays to or from a projection given by code.
///
/// Forward: `(lon, lat) -> (x, y)`. Backward: `(x, y) -> (lon, lat)`.
pub fn convert_xy_ll(
    i1: &[f64],
    i2: &[f64],
    proj: &str,
    direction: Direction,
) -> IbeResult<(Vec<f64>, Vec<f64>)> {
    let code: ProjectionCode = proj.parse()?;
    if i1.len() != i2.len() {
        return Err(IbeError::length_mismatch("second coordinate", i1.len(), i2.len()));
    }

    let transform = code.transform();
    Ok(i1
        .iter()
        .zip(i2)
        .map(|(&a, &b)| transform.apply(direction, a, b))
        .unzip())
}
