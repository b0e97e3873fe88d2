use crate::export::ExtractionPolicy;
use crate::slicing::{DEFAULT_HIGH_PERCENTILE, DEFAULT_LOW_PERCENTILE, PoolingWindow};

pub(super) fn clamp_percentile(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

pub(super) fn default_pool_rows() -> usize {
    PoolingWindow::default().rows
}

pub(super) fn default_pool_cols() -> usize {
    PoolingWindow::default().cols
}

pub(super) fn default_low_percentile() -> f64 {
    DEFAULT_LOW_PERCENTILE
}

pub(super) fn default_high_percentile() -> f64 {
    DEFAULT_HIGH_PERCENTILE
}

pub(super) fn default_window_rows() -> usize {
    ExtractionPolicy::DEFAULT_WINDOW.0
}

pub(super) fn default_window_cols() -> usize {
    ExtractionPolicy::DEFAULT_WINDOW.1
}

pub(super) fn default_step_rows() -> usize {
    ExtractionPolicy::DEFAULT_STEP.0
}

pub(super) fn default_step_cols() -> usize {
    ExtractionPolicy::DEFAULT_STEP.1
}
