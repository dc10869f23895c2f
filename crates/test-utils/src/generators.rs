//! Synthetic correction cubes with analytically known interpolants.
//!
//! A field that is linear in each axis index is reproduced exactly by
//! trilinear interpolation, so tests can compare samples against closed-form
//! values instead of stored fixtures.

use ndarray::Array3;

/// Creates a cube whose value encodes its index: `k * 10000 + j * 100 + i`.
///
/// Makes it easy to check that slicing and indexing hit the intended node.
///
/// ```
/// use test_utils::create_index_cube;
///
/// let cube = create_index_cube(2, 3, 4);
/// assert_eq!(cube.dim(), (2, 3, 4));
/// assert_eq!(cube[[1, 2, 3]], 10203.0);
/// ```
pub fn create_index_cube(nt: usize, ny: usize, nx: usize) -> Array3<f32> {
    Array3::from_shape_fn((nt, ny, nx), |(k, j, i)| (k * 10000 + j * 100 + i) as f32)
}

/// Creates a cube that is linear in pixel space: `a*k + b*j + c*i + d`.
pub fn linear_cube(shape: (usize, usize, usize), coeffs: [f32; 4]) -> Array3<f32> {
    let [a, b, c, d] = coeffs;
    Array3::from_shape_fn(shape, |(k, j, i)| a * k as f32 + b * j as f32 + c * i as f32 + d)
}

/// Creates a cube with every value equal to `value`.
pub fn constant_cube(shape: (usize, usize, usize), value: f32) -> Array3<f32> {
    Array3::from_elem(shape, value)
}

/// Creates a 2x2x2 cube from its eight corners in `[k][j][i]` order.
pub fn corner_cube(corners: [f32; 8]) -> Array3<f32> {
    Array3::from_shape_fn((2, 2, 2), |(k, j, i)| corners[k * 4 + j * 2 + i])
}

/// Evenly spaced axis `start, start + step, ...` with `n` values.
pub fn regular_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Three-hourly time axis in hours, starting at `start_hours`.
pub fn three_hourly_axis(start_hours: f64, n: usize) -> Vec<f64> {
    regular_axis(start_hours, 3.0, n)
}
