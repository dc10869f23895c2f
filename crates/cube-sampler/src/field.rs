//! Storage backends for the correction field.
//!
//! The sampler never needs the whole cube at once: it asks for the
//! contiguous run of time steps that brackets the queries and works on that
//! slab. An in-memory array answers with a borrowed view; a file-backed
//! field reads just those steps from disk.

use std::ops::Range;

use ndarray::{s, Array3, CowArray, Ix3};

use crate::error::{Result, SamplerError};

/// A `(time, lat, lon)` field that can hand out time slabs.
pub trait CubeField: Send + Sync {
    /// Dimensions as `[nt, ny, nx]`.
    fn dims(&self) -> [usize; 3];

    /// All latitudes and longitudes for the time indices in `range`.
    fn slice_time(&self, range: Range<usize>) -> Result<CowArray<'_, f32, Ix3>>;

    /// Whether the full field is held in memory.
    fn is_resident(&self) -> bool {
        true
    }
}

impl CubeField for Array3<f32> {
    fn dims(&self) -> [usize; 3] {
        let (nt, ny, nx) = self.dim();
        [nt, ny, nx]
    }

    fn slice_time(&self, range: Range<usize>) -> Result<CowArray<'_, f32, Ix3>> {
        check_slab(&range, self.dim().0)?;
        Ok(CowArray::from(self.slice(s![range, .., ..])))
    }
}

/// Validate a time slab request against `nt` steps.
pub fn check_slab(range: &Range<usize>, nt: usize) -> Result<()> {
    if range.start >= range.end || range.end > nt {
        return Err(SamplerError::SlabOutOfBounds {
            start: range.start,
            end: range.end,
            len: nt,
        });
    }
    Ok(())
}
