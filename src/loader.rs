//! `.npy` loading into a flat spectrogram collection.
//!
//! 2D arrays pass through unchanged. 3D arrays are split into 2D slices along
//! one stack axis chosen by [`StackAxis`]; every other rank is rejected.

use std::path::{Path, PathBuf};

use ndarray::{ArrayD, ArrayView3, Axis, Ix2, Ix3};
use ndarray_npy::{ReadNpyError, ReadNpyExt, ReadableElement};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::slicing::Spectrogram;

/// Errors raised while loading spectrogram files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid npy data in {path}: {source}")]
    Decode {
        path: PathBuf,
        source: ReadNpyError,
    },
    #[error("Unsupported element type in {path}")]
    UnsupportedDtype { path: PathBuf },
    #[error("Array in {path} has {ndim} dimensions; expected 2 or 3")]
    InvalidShape { path: PathBuf, ndim: usize },
}

/// Which axis of a 3D array separates the stacked spectrograms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackAxis {
    /// Axis 0: `(count, frequency, time)`.
    #[default]
    Leading,
    /// Last axis: `(frequency, time, count)`.
    Trailing,
    /// Axis 0 when it is strictly the smallest dimension, otherwise the last axis.
    Infer,
}

impl StackAxis {
    /// Resolve the concrete axis index for a 3D `shape`.
    pub fn resolve(self, shape: (usize, usize, usize)) -> usize {
        match self {
            Self::Leading => 0,
            Self::Trailing => 2,
            Self::Infer => {
                if shape.0 < shape.1 && shape.0 < shape.2 {
                    0
                } else {
                    2
                }
            }
        }
    }
}

/// Load every file in order and flatten them into one collection.
///
/// Order follows `paths`, then stack order within each file. The first failing
/// file aborts the whole load.
pub fn load_spectrograms<P: AsRef<Path>>(
    paths: &[P],
    axis: StackAxis,
) -> Result<Vec<Spectrogram>, LoadError> {
    let mut spects = Vec::new();
    for path in paths {
        spects.extend(load_file(path.as_ref(), axis)?);
    }
    info!(
        "Loaded {} spectrograms from {} files",
        spects.len(),
        paths.len()
    );
    Ok(spects)
}

/// Load the spectrograms held in a single `.npy` file.
pub fn load_file(path: &Path, axis: StackAxis) -> Result<Vec<Spectrogram>, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let data = decode_npy(&bytes)
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| LoadError::UnsupportedDtype {
            path: path.to_path_buf(),
        })?;
    let shape = data.shape().to_vec();
    let spects = split_array(data, axis).map_err(|ndim| LoadError::InvalidShape {
        path: path.to_path_buf(),
        ndim,
    })?;
    debug!(
        "{}: shape {:?} -> {} spectrograms",
        path.display(),
        shape,
        spects.len()
    );
    Ok(spects)
}

/// Turn a decoded array into 2D spectrograms, or report its rank when unsupported.
pub fn split_array(data: ArrayD<f64>, axis: StackAxis) -> Result<Vec<Spectrogram>, usize> {
    match data.ndim() {
        2 => data
            .into_dimensionality::<Ix2>()
            .map(|matrix| vec![matrix])
            .map_err(|_| 2),
        3 => data
            .into_dimensionality::<Ix3>()
            .map(|stack| split_stack(stack.view(), axis))
            .map_err(|_| 3),
        ndim => Err(ndim),
    }
}

/// Split a 3D stack into owned 2D slices in index order.
pub fn split_stack(stack: ArrayView3<'_, f64>, axis: StackAxis) -> Vec<Spectrogram> {
    let axis = axis.resolve(stack.dim());
    stack
        .axis_iter(Axis(axis))
        .map(|slice| slice.to_owned())
        .collect()
}

/// Decode npy bytes of any supported element type into `f64`.
///
/// `Ok(None)` means the header parsed but no supported dtype matched.
fn decode_npy(bytes: &[u8]) -> Result<Option<ArrayD<f64>>, ReadNpyError> {
    if let Some(array) = try_read::<f64>(bytes)? {
        return Ok(Some(array));
    }
    if let Some(array) = try_read::<f32>(bytes)? {
        return Ok(Some(array.mapv(f64::from)));
    }
    if let Some(array) = try_read::<i64>(bytes)? {
        return Ok(Some(array.mapv(|v| v as f64)));
    }
    if let Some(array) = try_read::<i32>(bytes)? {
        return Ok(Some(array.mapv(f64::from)));
    }
    if let Some(array) = try_read::<i16>(bytes)? {
        return Ok(Some(array.mapv(f64::from)));
    }
    if let Some(array) = try_read::<i8>(bytes)? {
        return Ok(Some(array.mapv(f64::from)));
    }
    if let Some(array) = try_read::<u64>(bytes)? {
        return Ok(Some(array.mapv(|v| v as f64)));
    }
    if let Some(array) = try_read::<u32>(bytes)? {
        return Ok(Some(array.mapv(f64::from)));
    }
    if let Some(array) = try_read::<u16>(bytes)? {
        return Ok(Some(array.mapv(f64::from)));
    }
    if let Some(array) = try_read::<u8>(bytes)? {
        return Ok(Some(array.mapv(f64::from)));
    }
    Ok(None)
}

fn try_read<T: ReadableElement>(bytes: &[u8]) -> Result<Option<ArrayD<T>>, ReadNpyError> {
    match ArrayD::<T>::read_npy(bytes) {
        Ok(array) => Ok(Some(array)),
        Err(ReadNpyError::WrongDescriptor(_)) => Ok(None),
        Err(err) => Err(err),
    }
}
