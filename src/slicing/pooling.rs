use ndarray::{Array2, ArrayView2, s};
use serde::{Deserialize, Serialize};

use super::{SliceError, Spectrogram};

/// Non-overlapping block size used to downsample a spectrogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolingWindow {
    /// Block height in frequency bins.
    pub rows: usize,
    /// Block width in time steps.
    pub cols: usize,
}

impl PoolingWindow {
    /// Build a pooling window from a row and column count.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Window as an `(rows, cols)` pair.
    pub const fn dim(self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether this window exceeds `shape` on either axis.
    pub fn exceeds(self, shape: (usize, usize)) -> bool {
        self.rows > shape.0 || self.cols > shape.1
    }
}

impl Default for PoolingWindow {
    fn default() -> Self {
        Self::new(8, 2)
    }
}

/// Block-average `matrix` and scale the result so its maximum is exactly 1.0.
///
/// The window must be non-empty, fit inside the matrix and divide both axes
/// exactly; partial edge blocks are rejected rather than truncated.
pub fn average_pooling(
    matrix: ArrayView2<'_, f64>,
    window: PoolingWindow,
) -> Result<Spectrogram, SliceError> {
    let shape = matrix.dim();
    validate_pooling(shape, window)?;
    let block_len = (window.rows * window.cols) as f64;
    let pooled = Array2::from_shape_fn(
        (shape.0 / window.rows, shape.1 / window.cols),
        |(row, col)| {
            let r0 = row * window.rows;
            let c0 = col * window.cols;
            matrix
                .slice(s![r0..r0 + window.rows, c0..c0 + window.cols])
                .sum()
                / block_len
        },
    );
    let max = pooled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return Err(SliceError::DegenerateInput { max });
    }
    Ok(pooled.mapv_into(|value| value / max))
}

fn validate_pooling(shape: (usize, usize), window: PoolingWindow) -> Result<(), SliceError> {
    let invalid = |reason| SliceError::InvalidWindow {
        shape,
        window: window.dim(),
        reason,
    };
    if window.rows == 0 || window.cols == 0 {
        return Err(invalid("window must be non-empty"));
    }
    if window.exceeds(shape) {
        return Err(invalid("window larger than matrix"));
    }
    if shape.0 % window.rows != 0 || shape.1 % window.cols != 0 {
        return Err(invalid("window must divide the matrix shape exactly"));
    }
    Ok(())
}
