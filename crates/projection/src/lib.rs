//! Coordinate reference system transformations.
//!
//! Implements the polar projections used by the altimetry and tide
//! toolchain from scratch without external dependencies. Projections are
//! selected by code through [`ProjectionCode`] and share the
//! [`CoordTransform`] contract.

pub mod geographic;
pub mod polar;
pub mod transform;

pub use geographic::Geographic;
pub use polar::{PolarStereographic, Pole, PsNorth};
pub use transform::{convert_xy_ll, CoordTransform, Direction, ProjectionCode};
