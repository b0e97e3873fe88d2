use ndarray::{ArrayView2, s};

use super::{SliceError, Spectrogram};

/// Number of windows `create_windows` yields for a matrix of `shape`.
///
/// Zero when the window does not fit or either stride is zero.
pub fn window_count(shape: (usize, usize), window: (usize, usize), step: (usize, usize)) -> usize {
    if validate_window(shape, window, step).is_err() {
        return 0;
    }
    positions(shape.0, window.0, step.0) * positions(shape.1, window.1, step.1)
}

/// Slice `matrix` into overlapping `window` blocks, `step` apart.
///
/// Windows come out in row-major scan order starting at `(0, 0)`: every
/// column offset for one row offset before the next row offset. Trailing
/// partial windows are dropped. Each window is an owned copy.
pub fn create_windows(
    matrix: ArrayView2<'_, f64>,
    window: (usize, usize),
    step: (usize, usize),
) -> Result<Vec<Spectrogram>, SliceError> {
    validate_window(matrix.dim(), window, step)?;
    Ok(window_views(matrix, window, step)
        .map(|view| view.to_owned())
        .collect())
}

/// Borrowed views of every full window of `matrix`, in scan order.
///
/// Callers validate first; an oversized window yields nothing.
pub(crate) fn window_views<'a>(
    matrix: ArrayView2<'a, f64>,
    window: (usize, usize),
    step: (usize, usize),
) -> impl Iterator<Item = ArrayView2<'a, f64>> {
    window_offsets(matrix.dim(), window, step)
        .map(move |(row, col)| matrix.slice_move(s![row..row + window.0, col..col + window.1]))
}

pub(crate) fn validate_window(
    shape: (usize, usize),
    window: (usize, usize),
    step: (usize, usize),
) -> Result<(), SliceError> {
    let invalid = |reason| SliceError::InvalidWindow {
        shape,
        window,
        reason,
    };
    if window.0 == 0 || window.1 == 0 {
        return Err(invalid("window must be non-empty"));
    }
    if step.0 == 0 || step.1 == 0 {
        return Err(invalid("step must be positive"));
    }
    if window.0 > shape.0 || window.1 > shape.1 {
        return Err(invalid("window larger than matrix"));
    }
    Ok(())
}

/// Top-left corners of every full window, in scan order.
fn window_offsets(
    shape: (usize, usize),
    window: (usize, usize),
    step: (usize, usize),
) -> impl Iterator<Item = (usize, usize)> {
    let rows = positions(shape.0, window.0, step.0);
    let cols = positions(shape.1, window.1, step.1);
    (0..rows).flat_map(move |r| (0..cols).map(move |c| (r * step.0, c * step.1)))
}

fn positions(len: usize, window: usize, step: usize) -> usize {
    match len.checked_sub(window) {
        Some(slack) if step > 0 => slack / step + 1,
        _ => 0,
    }
}
