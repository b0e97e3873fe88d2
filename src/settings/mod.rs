//! Persisted slicer preferences.
//!
//! Stored as `config.toml` in the application directory. Every key is
//! optional; missing keys fall back to the defaults below and out-of-range
//! values are normalized on load.

mod config_defaults;
mod config_io;

use serde::{Deserialize, Serialize};

use crate::export::ExtractionPolicy;
use crate::loader::StackAxis;
use crate::slicing::PoolingWindow;

use config_defaults::{
    clamp_percentile, default_high_percentile, default_low_percentile, default_pool_cols,
    default_pool_rows, default_step_cols, default_step_rows, default_window_cols,
    default_window_rows,
};

pub use config_io::{
    CONFIG_FILE_NAME, ConfigError, config_path, load_from, load_or_default, save, save_to_path,
};

/// Top-level settings file.
///
/// Config keys (TOML): `[pooling]`, `[rescale]`, `[extraction]`, `[loader]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlicerSettings {
    #[serde(default)]
    pub pooling: PoolingSettings,
    #[serde(default)]
    pub rescale: RescaleSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub loader: LoaderSettings,
}

impl SlicerSettings {
    pub(crate) fn normalized(mut self) -> Self {
        self.pooling.rows = self.pooling.rows.max(1);
        self.pooling.cols = self.pooling.cols.max(1);
        let low = clamp_percentile(self.rescale.low_percentile);
        let high = clamp_percentile(self.rescale.high_percentile);
        self.rescale.low_percentile = low.min(high);
        self.rescale.high_percentile = low.max(high);
        let extraction = &mut self.extraction;
        extraction.window_rows = extraction.window_rows.max(1);
        extraction.window_cols = extraction.window_cols.max(1);
        extraction.step_rows = extraction.step_rows.max(1);
        extraction.step_cols = extraction.step_cols.max(1);
        self
    }

    /// Pooling window applied after loading.
    pub fn pooling_window(&self) -> PoolingWindow {
        PoolingWindow::new(self.pooling.rows, self.pooling.cols)
    }

    /// `(low, high)` display percentiles.
    pub fn percentiles(&self) -> (f64, f64) {
        (self.rescale.low_percentile, self.rescale.high_percentile)
    }

    /// Export window geometry.
    pub fn extraction_policy(&self) -> ExtractionPolicy {
        ExtractionPolicy {
            window: (self.extraction.window_rows, self.extraction.window_cols),
            step: (self.extraction.step_rows, self.extraction.step_cols),
        }
    }
}

/// Config keys: `rows`, `cols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolingSettings {
    #[serde(default = "default_pool_rows")]
    pub rows: usize,
    #[serde(default = "default_pool_cols")]
    pub cols: usize,
}

impl Default for PoolingSettings {
    fn default() -> Self {
        Self {
            rows: default_pool_rows(),
            cols: default_pool_cols(),
        }
    }
}

/// Config keys: `low_percentile`, `high_percentile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescaleSettings {
    #[serde(default = "default_low_percentile")]
    pub low_percentile: f64,
    #[serde(default = "default_high_percentile")]
    pub high_percentile: f64,
}

impl Default for RescaleSettings {
    fn default() -> Self {
        Self {
            low_percentile: default_low_percentile(),
            high_percentile: default_high_percentile(),
        }
    }
}

/// Config keys: `window_rows`, `window_cols`, `step_rows`, `step_cols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default = "default_window_rows")]
    pub window_rows: usize,
    #[serde(default = "default_window_cols")]
    pub window_cols: usize,
    #[serde(default = "default_step_rows")]
    pub step_rows: usize,
    #[serde(default = "default_step_cols")]
    pub step_cols: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            window_rows: default_window_rows(),
            window_cols: default_window_cols(),
            step_rows: default_step_rows(),
            step_cols: default_step_cols(),
        }
    }
}

/// Config keys: `stack_axis` (`leading`, `trailing` or `infer`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderSettings {
    #[serde(default)]
    pub stack_axis: StackAxis,
}
