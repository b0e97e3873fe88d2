//! Interactive slicing session.
//!
//! [`SliceSession`] is the only mutable state in the crate. The shell owns one
//! session and drives it through these methods; each method computes its full
//! result before touching state, so a returned error leaves the session as it
//! was.

mod navigation;

use std::path::Path;

use ndarray::Array3;
use thiserror::Error;
use tracing::{debug, info};

use crate::export::{ExtractionPolicy, SaveError, save_stack, stack_windows};
use crate::loader::{LoadError, StackAxis, load_spectrograms};
use crate::settings::SlicerSettings;
use crate::slicing::{
    CropRect, DEFAULT_HIGH_PERCENTILE, DEFAULT_LOW_PERCENTILE, PoolingWindow, SliceError,
    Spectrogram, average_pooling, crop, rescale,
};

use navigation::wrap_index;

/// Pooling failure for one spectrogram of the collection.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Spectrogram {index} with shape {shape:?}: {source}")]
pub struct PoolingError {
    /// Position in the collection.
    pub index: usize,
    /// Shape of the spectrogram that failed.
    pub shape: (usize, usize),
    /// Underlying slicing error.
    pub source: SliceError,
}

/// Errors surfaced to the shell by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Load files first")]
    NothingLoaded,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Pooling(#[from] PoolingError),
    #[error(transparent)]
    Slice(#[from] SliceError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Outcome of [`SliceSession::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Number of spectrograms now in the session.
    pub spectrograms: usize,
    /// Set when the automatic pooling pass failed; the collection is then
    /// shown at full resolution until a valid window is applied.
    pub pooling_error: Option<PoolingError>,
}

/// Display-ready copy of the active spectrogram.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    /// Zero-based position of the spectrogram.
    pub index: usize,
    /// Number of spectrograms in the session.
    pub total: usize,
    /// Contrast-stretched intensities.
    pub image: Spectrogram,
}

impl DisplayFrame {
    /// One-based caption such as `Spect 2/5`.
    pub fn title(&self) -> String {
        format!("Spect {}/{}", self.index + 1, self.total)
    }
}

/// Loaded spectrograms plus the view and export parameters applied to them.
#[derive(Debug, Clone)]
pub struct SliceSession {
    sources: Vec<Spectrogram>,
    processed: Vec<Spectrogram>,
    index: usize,
    pooling: PoolingWindow,
    percentiles: (f64, f64),
    policy: ExtractionPolicy,
    stack_axis: StackAxis,
}

impl Default for SliceSession {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            processed: Vec::new(),
            index: 0,
            pooling: PoolingWindow::default(),
            percentiles: (DEFAULT_LOW_PERCENTILE, DEFAULT_HIGH_PERCENTILE),
            policy: ExtractionPolicy::default(),
            stack_axis: StackAxis::default(),
        }
    }
}

impl SliceSession {
    /// Empty session with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session configured from persisted settings.
    pub fn from_settings(settings: &SlicerSettings) -> Self {
        Self {
            pooling: settings.pooling_window(),
            percentiles: settings.percentiles(),
            policy: settings.extraction_policy(),
            stack_axis: settings.loader.stack_axis,
            ..Self::default()
        }
    }

    /// Replace the collection with the contents of `paths` and pool it.
    ///
    /// A load error keeps the previous collection. A pooling error after a
    /// successful load is reported in the [`LoadReport`] with the new
    /// collection kept unpooled, so the caller can retry with another window.
    pub fn load<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<LoadReport, SessionError> {
        let spects = load_spectrograms(paths, self.stack_axis)?;
        let pooled = pool_all(&spects, self.pooling);
        self.processed = match &pooled {
            Ok(pooled) => pooled.clone(),
            Err(_) => spects.clone(),
        };
        self.sources = spects;
        self.index = 0;
        info!("Session holds {} spectrograms", self.sources.len());
        Ok(LoadReport {
            spectrograms: self.sources.len(),
            pooling_error: pooled.err(),
        })
    }

    /// Re-pool every loaded spectrogram with `window`, discarding crops.
    ///
    /// Nothing changes unless every spectrogram pools cleanly.
    pub fn apply_pooling(&mut self, window: PoolingWindow) -> Result<(), SessionError> {
        if self.sources.is_empty() {
            return Err(SessionError::NothingLoaded);
        }
        let pooled = pool_all(&self.sources, window)?;
        self.processed = pooled;
        self.pooling = window;
        self.index = 0;
        info!(
            "Pooled {} spectrograms with window {}x{}",
            self.processed.len(),
            window.rows,
            window.cols
        );
        Ok(())
    }

    /// Change the display contrast percentiles.
    pub fn set_percentiles(&mut self, low: f64, high: f64) -> Result<(), SessionError> {
        if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low > high {
            return Err(SliceError::InvalidPercentiles { low, high }.into());
        }
        self.percentiles = (low, high);
        Ok(())
    }

    /// Advance to the next spectrogram, wrapping past the end.
    pub fn next(&mut self) -> usize {
        self.index = wrap_index(self.index, self.processed.len(), 1);
        self.index
    }

    /// Go back one spectrogram, wrapping past the start.
    pub fn previous(&mut self) -> usize {
        self.index = wrap_index(self.index, self.processed.len(), -1);
        self.index
    }

    /// Active spectrogram, if any are loaded.
    pub fn current(&self) -> Option<&Spectrogram> {
        self.processed.get(self.index)
    }

    /// Contrast-stretched copy of the active spectrogram for rendering.
    ///
    /// The stored spectrogram is never modified.
    pub fn display_frame(&self) -> Result<Option<DisplayFrame>, SessionError> {
        let Some(current) = self.current() else {
            return Ok(None);
        };
        let (low, high) = self.percentiles;
        let image = rescale(current.view(), low, high)?;
        Ok(Some(DisplayFrame {
            index: self.index,
            total: self.processed.len(),
            image,
        }))
    }

    /// Replace the active spectrogram with the region covered by `rect`.
    pub fn crop_current(&mut self, rect: CropRect) -> Result<(), SessionError> {
        let current = self.current().ok_or(SessionError::NothingLoaded)?;
        let cropped = crop(current.view(), rect)?;
        debug!(
            "Cropped spectrogram {} from {:?} to {:?}",
            self.index,
            current.dim(),
            cropped.dim()
        );
        self.processed[self.index] = cropped;
        Ok(())
    }

    /// Stack the export windows of every processed spectrogram.
    pub fn export_stack(&self) -> Result<Array3<f64>, SessionError> {
        if self.processed.is_empty() {
            return Err(SessionError::NothingLoaded);
        }
        Ok(stack_windows(&self.processed, &self.policy)?)
    }

    /// Export windows and write them to `path`, returning the window count.
    ///
    /// Nothing is written when extraction fails.
    pub fn save_windows(&self, path: &Path) -> Result<usize, SessionError> {
        let stack = self.export_stack()?;
        save_stack(path, &stack)?;
        Ok(stack.len_of(ndarray::Axis(0)))
    }

    /// Number of spectrograms in the session.
    pub fn len(&self) -> usize {
        self.processed.len()
    }

    /// Whether nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Position of the active spectrogram.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Spectrograms as loaded, before pooling or cropping.
    pub fn sources(&self) -> &[Spectrogram] {
        &self.sources
    }

    /// Spectrograms after pooling and cropping; these are what get exported.
    pub fn spectrograms(&self) -> &[Spectrogram] {
        &self.processed
    }

    pub fn pooling_window(&self) -> PoolingWindow {
        self.pooling
    }

    pub fn percentiles(&self) -> (f64, f64) {
        self.percentiles
    }

    pub fn extraction_policy(&self) -> ExtractionPolicy {
        self.policy
    }

    pub fn stack_axis(&self) -> StackAxis {
        self.stack_axis
    }
}

fn pool_all(
    spects: &[Spectrogram],
    window: PoolingWindow,
) -> Result<Vec<Spectrogram>, PoolingError> {
    spects
        .iter()
        .enumerate()
        .map(|(index, spect)| {
            average_pooling(spect.view(), window).map_err(|source| PoolingError {
                index,
                shape: spect.dim(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn session_with(spects: Vec<Spectrogram>) -> SliceSession {
        SliceSession {
            processed: spects.clone(),
            sources: spects,
            ..SliceSession::default()
        }
    }

    fn ramp(rows: usize, cols: usize) -> Spectrogram {
        Array2::from_shape_fn((rows, cols), |(r, c)| 1.0 + (r * cols + c) as f64)
    }

    #[test]
    fn navigation_wraps_around_collection() {
        let mut session = session_with(vec![ramp(2, 2), ramp(2, 2), ramp(2, 2)]);
        assert_eq!(session.previous(), 2);
        assert_eq!(session.next(), 0);
        assert_eq!(session.next(), 1);
    }

    #[test]
    fn navigation_on_empty_session_stays_at_zero() {
        let mut session = SliceSession::new();
        assert_eq!(session.next(), 0);
        assert!(session.current().is_none());
        assert_eq!(session.display_frame().unwrap(), None);
    }

    #[test]
    fn apply_pooling_replaces_every_spectrogram() {
        let mut session = session_with(vec![ramp(32, 8), ramp(16, 4)]);
        session.next();
        session.apply_pooling(PoolingWindow::new(8, 2)).unwrap();
        assert_eq!(session.index(), 0);
        assert_eq!(session.spectrograms()[0].dim(), (4, 4));
        assert_eq!(session.spectrograms()[1].dim(), (2, 2));
        assert_eq!(session.pooling_window(), PoolingWindow::new(8, 2));
    }

    #[test]
    fn failed_pooling_leaves_state_untouched() {
        let mut session = session_with(vec![ramp(32, 8), ramp(4, 4)]);
        let before = session.spectrograms().to_vec();
        let err = session.apply_pooling(PoolingWindow::new(8, 2)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Pooling(PoolingError { index: 1, shape: (4, 4), .. })
        ));
        assert_eq!(session.spectrograms(), before.as_slice());
        assert_eq!(session.pooling_window(), PoolingWindow::default());
    }

    #[test]
    fn pooling_without_data_is_reported() {
        let mut session = SliceSession::new();
        assert!(matches!(
            session.apply_pooling(PoolingWindow::new(1, 1)),
            Err(SessionError::NothingLoaded)
        ));
    }

    #[test]
    fn crop_replaces_only_active_spectrogram() {
        let mut session = session_with(vec![ramp(4, 4), ramp(4, 4)]);
        session.next();
        session.crop_current(CropRect::new(0, 2, 1, 3)).unwrap();
        assert_eq!(session.spectrograms()[0].dim(), (4, 4));
        assert_eq!(session.spectrograms()[1], array![[2.0, 3.0], [6.0, 7.0]]);
        assert_eq!(session.sources()[1].dim(), (4, 4));
    }

    #[test]
    fn empty_crop_keeps_active_spectrogram() {
        let mut session = session_with(vec![ramp(4, 4)]);
        assert!(session.crop_current(CropRect::new(2, 2, 0, 4)).is_err());
        assert_eq!(session.spectrograms()[0], ramp(4, 4));
    }

    #[test]
    fn repooling_discards_crops() {
        let mut session = session_with(vec![ramp(8, 8)]);
        session.crop_current(CropRect::new(0, 2, 0, 2)).unwrap();
        session.apply_pooling(PoolingWindow::new(2, 2)).unwrap();
        assert_eq!(session.spectrograms()[0].dim(), (4, 4));
    }

    #[test]
    fn display_frame_is_stretched_copy() {
        let session = session_with(vec![ramp(10, 10)]);
        let frame = session.display_frame().unwrap().unwrap();
        assert_eq!(frame.title(), "Spect 1/1");
        assert_eq!(frame.image.dim(), (10, 10));
        assert!(frame.image.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(session.spectrograms()[0], ramp(10, 10));
    }

    #[test]
    fn display_frame_tolerates_non_finite_cells() {
        let mut matrix = ramp(8, 8);
        matrix[(0, 0)] = f64::NEG_INFINITY;
        matrix[(0, 1)] = f64::NAN;
        let mut session = session_with(vec![matrix]);
        session.apply_pooling(PoolingWindow::new(1, 1)).unwrap();

        let frame = session.display_frame().unwrap().unwrap();
        assert_eq!(frame.image[(0, 0)], 0.0);
        assert!(frame.image[(0, 1)].is_nan());
        assert!(
            frame
                .image
                .iter()
                .filter(|v| !v.is_nan())
                .all(|v| (0.0..=1.0).contains(v))
        );
    }

    #[test]
    fn export_skips_small_and_reports_empty() {
        let session = session_with(vec![ramp(10, 10)]);
        assert!(matches!(
            session.export_stack(),
            Err(SessionError::Slice(SliceError::EmptyResult { skipped: 1 }))
        ));
        assert!(matches!(
            SliceSession::new().export_stack(),
            Err(SessionError::NothingLoaded)
        ));

        let session = session_with(vec![ramp(10, 10), ramp(28, 104)]);
        assert_eq!(session.export_stack().unwrap().dim(), (4, 24, 96));
    }

    #[test]
    fn percentiles_are_validated() {
        let mut session = SliceSession::new();
        assert!(session.set_percentiles(50.0, 10.0).is_err());
        session.set_percentiles(1.0, 99.0).unwrap();
        assert_eq!(session.percentiles(), (1.0, 99.0));
    }
}
