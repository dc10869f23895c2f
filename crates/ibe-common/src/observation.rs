//! Scattered altimetry observations.

use crate::error::{IbeError, IbeResult};

/// Parallel (x, y, t[, z]) sequences read from one input file.
///
/// `shape` is the logical shape of the source variables; delimited
/// inputs are always 1-D. Values are stored flattened in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub t: Vec<f64>,
    pub z: Option<Vec<f64>>,
    pub shape: Vec<usize>,
}

impl ObservationSet {
    /// Create a 1-D observation set, validating lengths.
    pub fn new(x: Vec<f64>, y: Vec<f64>, t: Vec<f64>, z: Option<Vec<f64>>) -> IbeResult<Self> {
        let shape = vec![x.len()];
        Self::with_shape(x, y, t, z, shape)
    }

    /// Create an observation set with an explicit logical shape.
    pub fn with_shape(
        x: Vec<f64>,
        y: Vec<f64>,
        t: Vec<f64>,
        z: Option<Vec<f64>>,
        shape: Vec<usize>,
    ) -> IbeResult<Self> {
        let n = x.len();
        if y.len() != n {
            return Err(IbeError::length_mismatch("y", n, y.len()));
        }
        if t.len() != n {
            return Err(IbeError::length_mismatch("t", n, t.len()));
        }
        if let Some(z) = &z {
            if z.len() != n {
                return Err(IbeError::length_mismatch("z", n, z.len()));
            }
        }
        let expected: usize = shape.iter().product();
        if expected != n {
            return Err(IbeError::length_mismatch("shape", expected, n));
        }

        Ok(Self { x, y, t, z, shape })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
