use thiserror::Error;

/// Failures raised by the slicing transforms.
///
/// Every variant is recoverable: the caller reports it and keeps its previous
/// state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SliceError {
    /// Pooling or extraction window that is empty, larger than the matrix or,
    /// for pooling, not an exact divisor of its shape.
    #[error("Window {window:?} is invalid for matrix shape {shape:?}: {reason}")]
    InvalidWindow {
        shape: (usize, usize),
        window: (usize, usize),
        reason: &'static str,
    },
    /// Pooled result has no positive maximum to normalize by.
    #[error("Cannot normalize pooled matrix with maximum {max}")]
    DegenerateInput { max: f64 },
    /// Percentile bounds outside `0..=100` or out of order.
    #[error("Invalid percentile bounds {low}..{high}")]
    InvalidPercentiles { low: f64, high: f64 },
    /// Crop rectangle selects no cells once clamped to the matrix.
    #[error("Crop rows {rows:?} cols {cols:?} select nothing in matrix shape {shape:?}")]
    EmptyCrop {
        rows: (usize, usize),
        cols: (usize, usize),
        shape: (usize, usize),
    },
    /// Export produced no windows at all.
    #[error("No windows created ({skipped} spectrograms too small)")]
    EmptyResult { skipped: usize },
}
