use ndarray::{ArrayView2, s};

use super::{SliceError, Spectrogram};

/// Half-open crop bounds in a matrix's index space.
///
/// Each axis is ordered on construction, so a selection dragged in any
/// direction describes the same region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    row_lo: usize,
    row_hi: usize,
    col_lo: usize,
    col_hi: usize,
}

impl CropRect {
    /// Build a rectangle from two row bounds and two column bounds in any order.
    pub fn new(row_a: usize, row_b: usize, col_a: usize, col_b: usize) -> Self {
        Self {
            row_lo: row_a.min(row_b),
            row_hi: row_a.max(row_b),
            col_lo: col_a.min(col_b),
            col_hi: col_a.max(col_b),
        }
    }

    /// Build a rectangle from floating selection extents, truncating toward zero.
    ///
    /// Negative or non-finite extents collapse to zero.
    pub fn from_extents(rows: (f64, f64), cols: (f64, f64)) -> Self {
        Self::new(
            to_index(rows.0),
            to_index(rows.1),
            to_index(cols.0),
            to_index(cols.1),
        )
    }

    /// Row range `(lo, hi)`.
    pub fn rows(&self) -> (usize, usize) {
        (self.row_lo, self.row_hi)
    }

    /// Column range `(lo, hi)`.
    pub fn cols(&self) -> (usize, usize) {
        (self.col_lo, self.col_hi)
    }

    /// Restrict the rectangle to a matrix of `shape`.
    pub fn clamped_to(&self, shape: (usize, usize)) -> Self {
        Self {
            row_lo: self.row_lo.min(shape.0),
            row_hi: self.row_hi.min(shape.0),
            col_lo: self.col_lo.min(shape.1),
            col_hi: self.col_hi.min(shape.1),
        }
    }

    /// Whether the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.row_lo == self.row_hi || self.col_lo == self.col_hi
    }
}

fn to_index(extent: f64) -> usize {
    if extent.is_finite() && extent > 0.0 {
        extent as usize
    } else {
        0
    }
}

/// Copy the region of `matrix` covered by `rect`.
///
/// Bounds past the matrix edge are clamped, like ordinary array slicing. A
/// rectangle left empty after clamping is an error so callers never store an
/// empty spectrogram.
pub fn crop(matrix: ArrayView2<'_, f64>, rect: CropRect) -> Result<Spectrogram, SliceError> {
    let shape = matrix.dim();
    let clamped = rect.clamped_to(shape);
    if clamped.is_empty() {
        return Err(SliceError::EmptyCrop {
            rows: rect.rows(),
            cols: rect.cols(),
            shape,
        });
    }
    Ok(matrix
        .slice(s![clamped.row_lo..clamped.row_hi, clamped.col_lo..clamped.col_hi])
        .to_owned())
}
