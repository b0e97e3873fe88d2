//! Pure array transforms over 2D spectrograms.
//!
//! Nothing here touches session state or the filesystem: every function takes
//! a borrowed matrix and returns an owned result or a [`SliceError`].

mod crop;
mod error;
mod pooling;
mod rescale;
mod windows;

use ndarray::Array2;

pub use crop::{CropRect, crop};
pub use error::SliceError;
pub use pooling::{PoolingWindow, average_pooling};
pub use rescale::{
    DEFAULT_HIGH_PERCENTILE, DEFAULT_LOW_PERCENTILE, DisplayRange, percentile, rescale,
    rescale_intensity,
};
pub use windows::{create_windows, window_count};
pub(crate) use windows::{validate_window, window_views};

/// 2D intensity matrix with axes (frequency bin, time step).
pub type Spectrogram = Array2<f64>;
