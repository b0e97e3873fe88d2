use ndarray::ArrayView2;

use super::{SliceError, Spectrogram};

/// Lower percentile used for display contrast stretching.
pub const DEFAULT_LOW_PERCENTILE: f64 = 2.0;
/// Upper percentile used for display contrast stretching.
pub const DEFAULT_HIGH_PERCENTILE: f64 = 98.0;

/// Output intensity range for stretched display data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRange {
    /// `[0, 1]`, used when the input range is non-negative.
    Unit,
    /// `[-1, 1]`, used when the input range dips below zero.
    Signed,
}

impl DisplayRange {
    /// Pick the display range for an input range starting at `low`.
    pub fn for_input_low(low: f64) -> Self {
        if low >= 0.0 { Self::Unit } else { Self::Signed }
    }

    /// `(min, max)` bounds of the range.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Self::Unit => (0.0, 1.0),
            Self::Signed => (-1.0, 1.0),
        }
    }
}

/// Percentile `q` (0-100) of the finite entries of `values`, interpolating
/// linearly between ranks.
///
/// NaN and infinite entries are ignored. Returns `None` when nothing finite is
/// left.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    percentile_of_sorted(&sorted_finite(values.iter().copied()), q)
}

fn sorted_finite(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.filter(|value| value.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn percentile_of_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q.clamp(0.0, 100.0) * last as f64 / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Percentile contrast stretch for display.
///
/// Values at or below the `low` percentile land on the bottom of the display
/// range, values at or above `high` on the top. A flat or empty matrix comes
/// back unchanged. NaN and infinite cells do not affect the percentiles.
pub fn rescale(
    matrix: ArrayView2<'_, f64>,
    low: f64,
    high: f64,
) -> Result<Spectrogram, SliceError> {
    if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low > high {
        return Err(SliceError::InvalidPercentiles { low, high });
    }
    let sorted = sorted_finite(matrix.iter().copied());
    let (Some(p_low), Some(p_high)) = (
        percentile_of_sorted(&sorted, low),
        percentile_of_sorted(&sorted, high),
    ) else {
        return Ok(matrix.to_owned());
    };
    Ok(rescale_intensity(matrix, (p_low, p_high)))
}

/// Clip `matrix` into `in_range` and map it linearly onto the display range.
///
/// An empty or non-finite input range returns the matrix unchanged. NaN cells
/// stay NaN; infinite cells clip to the range ends.
pub fn rescale_intensity(matrix: ArrayView2<'_, f64>, in_range: (f64, f64)) -> Spectrogram {
    let (in_low, in_high) = in_range;
    if !(in_low.is_finite() && in_high.is_finite() && in_low < in_high) {
        return matrix.to_owned();
    }
    let (out_low, out_high) = DisplayRange::for_input_low(in_low).bounds();
    let span = in_high - in_low;
    matrix.mapv(|value| {
        (value.clamp(in_low, in_high) - in_low) / span * (out_high - out_low) + out_low
    })
}
