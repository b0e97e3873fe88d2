use std::path::Path;

use ndarray::{Array2, Array3};
use ndarray_npy::{WritableElement, write_npy};

/// `(rows, cols)` matrix whose cells encode their position, offset by `base`.
pub fn position_matrix(rows: usize, cols: usize, base: f64) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(r, c)| base + (r * cols + c) as f64)
}

/// `(count, rows, cols)` stack where slice `i` starts at `i * 1e6`.
pub fn position_stack(count: usize, rows: usize, cols: usize) -> Array3<f64> {
    Array3::from_shape_fn((count, rows, cols), |(i, r, c)| {
        i as f64 * 1.0e6 + (r * cols + c) as f64
    })
}

pub fn write_matrix<T: WritableElement>(path: &Path, matrix: &Array2<T>) {
    write_npy(path, matrix).expect("write 2d npy fixture");
}

pub fn write_stack<T: WritableElement>(path: &Path, stack: &Array3<T>) {
    write_npy(path, stack).expect("write 3d npy fixture");
}
