//! Tracing setup for the slicing core.
//!
//! One global subscriber writes to stdout and to a per-session file
//! `spectslice_<timestamp>.log` under `<app dir>/logs`. Only the newest
//! [`MAX_SESSION_LOGS`] session files are kept; other files in the folder are
//! left alone.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Number of session logs kept on disk, including the current one.
pub const MAX_SESSION_LOGS: usize = 10;
const LOG_FILE_PREFIX: &str = "spectslice_";
const LOG_FILE_EXTENSION: &str = ".log";
const DEFAULT_FILTER: &str = "info";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    /// A filesystem step on the log folder failed.
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize tracing under the application logs directory.
///
/// Repeated calls are no-ops. Errors are returned so the shell can keep
/// running without a log file.
pub fn init() -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }
    init_in(&app_dirs::logs_dir()?)
}

/// Initialize tracing with the session log written into `log_dir`.
pub fn init_in(log_dir: &Path) -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }
    fs::create_dir_all(log_dir).map_err(io_error("create log directory", log_dir))?;
    let file_name = session_log_name(now_local_or_utc());
    let log_path = log_dir.join(&file_name);
    fs::File::create(&log_path).map_err(io_error("create log file", &log_path))?;
    prune_session_logs(log_dir, MAX_SESSION_LOGS)?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(log_dir, &file_name));
    let timer = display_timer();
    let subscriber = Registry::default()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with(
            fmt::layer()
                .with_timer(timer.clone())
                .with_writer(std::io::stdout),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("Session log at {}", log_path.display());
    Ok(())
}

fn session_log_name(now: OffsetDateTime) -> String {
    format!(
        "{LOG_FILE_PREFIX}{:04}-{:02}-{:02}_{:02}-{:02}-{:02}{LOG_FILE_EXTENSION}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn is_session_log(name: &str) -> bool {
    name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_EXTENSION)
}

/// Delete the oldest session logs so at most `keep` remain.
///
/// Session log names embed a zero-padded timestamp, so name order is age order.
fn prune_session_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map_err(io_error("read log directory", dir))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_session_log(name))
        .collect();
    names.sort();
    let excess = names.len().saturating_sub(keep);
    for name in &names[..excess] {
        let path = dir.join(name);
        fs::remove_file(&path).map_err(io_error("remove old log", &path))?;
    }
    Ok(())
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> LoggingError {
    let path = path.to_path_buf();
    move |source| LoggingError::Io {
        action,
        path,
        source,
    }
}

fn display_timer() -> fmt::time::OffsetTime<&'static [FormatItem<'static>]> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT)
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
