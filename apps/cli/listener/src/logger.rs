//! Logging for the listener binary.
//!
//! Every record goes to colored stdout and to a plain `listener.log`. Setup runs
//! at most once per process.

use crate::error::ListenerError;

use common::ErrorLocation;
use listener_client::LISTENER_APP_NAME;

use std::fmt::{Arguments, Display};
use std::io::stdout;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

const LOG_FILE_NAME: &str = "listener.log";
const LOG_DIR_NAME: &str = "logs";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// `<local data dir>/bitfocus-listener/logs`
///
/// # Errors
///
/// Returns [`ListenerError::App`] if the platform has no local data directory.
pub fn default_log_dir() -> Result<PathBuf, ListenerError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(LISTENER_APP_NAME).join(LOG_DIR_NAME))
        .ok_or_else(|| ListenerError::App {
            message: "No local data directory on this platform".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Initialize the logger with dual output (stdout + `listener.log` in `log_dir`).
///
/// Safe to call more than once: later calls log a warning and return Ok.
///
/// # Errors
///
/// Returns [`ListenerError::App`] if the log file cannot be created or a global
/// logger is already installed.
pub fn initialize(log_dir: &Path) -> Result<(), ListenerError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir);
        if result.is_ok() {
            info!("Logger initialized with level: {LOG_LEVEL:?}");
        }
    });

    result
}

/// `[<rfc3339> - <LEVEL>] <message> [<file>:<line>]`
fn write_line(
    out: FormatCallback<'_>,
    message: &Arguments<'_>,
    record: &Record<'_>,
    level: impl Display,
) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}

#[track_caller]
pub(crate) fn initialize_internal(log_dir: &Path) -> Result<(), ListenerError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let console = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, message, record, colors.color(record.level()))
        })
        .chain(stdout());

    let log_file = fern::log_file(&log_file_path).map_err(|e| ListenerError::App {
        message: format!("Failed to create log file {}: {e}", log_file_path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Plain text, no colors
    let file = Dispatch::new()
        .format(|out, message, record| write_line(out, message, record, record.level()))
        .chain(log_file);

    Dispatch::new()
        .level(LOG_LEVEL)
        .chain(console)
        .chain(file)
        .apply()
        .map_err(|e| ListenerError::App {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
