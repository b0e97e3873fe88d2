//! Window stacking and `.npy` output for training-sample export.

use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use ndarray::{Array3, Axis};
use ndarray_npy::{WriteNpyError, WriteNpyExt};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::slicing::{SliceError, Spectrogram, validate_window, window_count, window_views};

const TEMP_PREFIX: &str = ".spectslice-export";

/// Fixed sliding-window geometry used when exporting samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPolicy {
    /// Window height and width.
    pub window: (usize, usize),
    /// Row and column stride between windows.
    pub step: (usize, usize),
}

impl ExtractionPolicy {
    /// Export window shape.
    pub const DEFAULT_WINDOW: (usize, usize) = (24, 96);
    /// Export stride.
    pub const DEFAULT_STEP: (usize, usize) = (4, 8);

    /// Whether a matrix of `shape` is large enough for one window.
    pub fn fits(&self, shape: (usize, usize)) -> bool {
        self.window.0 <= shape.0 && self.window.1 <= shape.1
    }
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            step: Self::DEFAULT_STEP,
        }
    }
}

/// Errors raised while writing an output stack.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to create a temporary file next to {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write windows to {path}: {source}")]
    Write {
        path: PathBuf,
        source: WriteNpyError,
    },
    #[error("Failed to flush {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to move finished export into {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Extract windows from every matrix and stack them along a new leading axis.
///
/// Matrices smaller than the policy window are skipped. Output order is
/// collection order, then window scan order. Fails with
/// [`SliceError::EmptyResult`] when nothing fits.
pub fn stack_windows(
    spectrograms: &[Spectrogram],
    policy: &ExtractionPolicy,
) -> Result<Array3<f64>, SliceError> {
    let mut skipped = 0usize;
    let mut total = 0usize;
    for (index, spect) in spectrograms.iter().enumerate() {
        if !policy.fits(spect.dim()) {
            warn!(
                "Skipping spectrogram {index} with shape {:?}; smaller than window {:?}",
                spect.dim(),
                policy.window
            );
            skipped += 1;
            continue;
        }
        validate_window(spect.dim(), policy.window, policy.step)?;
        total += window_count(spect.dim(), policy.window, policy.step);
    }
    if total == 0 {
        return Err(SliceError::EmptyResult { skipped });
    }

    let (wh, ww) = policy.window;
    let mut stack = Array3::<f64>::zeros((total, wh, ww));
    {
        let mut slots = stack.axis_iter_mut(Axis(0));
        for (index, spect) in spectrograms.iter().enumerate() {
            if !policy.fits(spect.dim()) {
                continue;
            }
            let mut produced = 0usize;
            for window in window_views(spect.view(), policy.window, policy.step) {
                if let Some(mut slot) = slots.next() {
                    slot.assign(&window);
                    produced += 1;
                }
            }
            debug!("Spectrogram {index}: {produced} windows");
        }
    }
    info!(
        "Stacked {total} windows of {wh}x{ww} from {} spectrograms ({skipped} skipped)",
        spectrograms.len() - skipped
    );
    Ok(stack)
}

/// Write `stack` to `path` as a single `.npy` array.
///
/// The array is written to a temporary file in the same directory and moved
/// over `path` only once complete, so a failed save leaves any existing file
/// at `path` as it was.
pub fn save_stack(path: &Path, stack: &Array3<f64>) -> Result<(), SaveError> {
    let mut temp = create_tempfile(path)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        stack
            .write_npy(&mut writer)
            .map_err(|source| SaveError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(|source| SaveError::Flush {
            path: path.to_path_buf(),
            source,
        })?;
    }
    temp.persist(path).map_err(|err| SaveError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    info!("Saved {} windows to {}", stack.len_of(Axis(0)), path.display());
    Ok(())
}

fn create_tempfile(path: &Path) -> Result<NamedTempFile, SaveError> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|source| SaveError::Create {
            path: path.to_path_buf(),
            source,
        })
}
