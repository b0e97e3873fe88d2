//! Slicing core for interactive spectrogram inspection and window export.
//!
//! An external shell loads arrays through [`loader`], drives a
//! [`session::SliceSession`] and renders what it returns.
/// Application directory resolution.
pub mod app_dirs;
/// Sliding-window stacking and `.npy` export.
pub mod export;
/// `.npy` loading and 3D stack splitting.
pub mod loader;
/// Tracing subscriber setup.
pub mod logging;
/// Interactive session state.
pub mod session;
/// Persisted slicer preferences.
pub mod settings;
/// Pooling, contrast stretch, cropping and window extraction.
pub mod slicing;

pub use slicing::Spectrogram;
