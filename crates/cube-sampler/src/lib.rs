//! Pixel-space trilinear sampling of IBE correction cubes.
//!
//! A correction cube is a `(time, lat, lon)` field of sea-surface height
//! corrections with three independent, possibly uneven and descending axes.
//! This crate samples it at scattered observation points:
//!
//! - **Axis mapping**: each query coordinate becomes a fractional pixel
//!   index by 1-D interpolation against its axis, clamped at the edges
//! - **Slab access**: only the time steps bracketing the queries are pulled
//!   from the field, through the [`CubeField`] capability
//! - **Subsetting**: a calendar time window can be materialized once up
//!   front
//!
//! # Architecture
//!
//! ```text
//! (t, lat, lon) queries
//!      │
//!      ▼
//! CorrectionCube::sample()
//!      │
//!      ├─► PixelMapper per axis (reversal done once)
//!      │
//!      ├─► Minimal time range over all bracketing pairs
//!      │
//!      ├─► CubeField::slice_time(range)
//!      │         │
//!      │         ├─► Array3: borrowed view
//!      │         │
//!      │         └─► File-backed field: reads the slab
//!      │
//!      └─► Trilinear weights per query, reshaped to the query shape
//! ```
//!
//! # Example
//!
//! ```
//! use cube_sampler::CorrectionCube;
//! use ibe_common::Epoch;
//! use ndarray::Array3;
//!
//! let values = Array3::from_shape_fn((2, 2, 2), |(k, j, i)| (k + j + i) as f32);
//! let cube = CorrectionCube::from_array(
//!     vec![0.0, 3.0],
//!     vec![-60.0, -70.0],
//!     vec![0.0, 10.0],
//!     values,
//!     Epoch::era_interim(),
//! )?;
//!
//! let out = cube.sample_points(&[1.5], &[-65.0], &[5.0])?;
//! assert!((out[0] - 1.5).abs() < 1e-12);
//! # Ok::<(), cube_sampler::SamplerError>(())
//! ```

pub mod axis;
pub mod cube;
pub mod error;
pub mod field;
pub mod sampler;
pub mod subset;

pub use axis::{interp_pixels, PixelMapper};
pub use cube::CorrectionCube;
pub use error::{Result, SamplerError};
pub use field::{check_slab, CubeField};
pub use sampler::{interp3d, sample_with, AxisMappers};
pub use subset::{apply_subset, time_index_range, CubeSubset, TimeWindow};
