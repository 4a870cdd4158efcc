//! Logging for the results binary.

use std::path::{Path, PathBuf};

use ftlog::{
    appender::{FileAppender, Period},
    LevelFilter, LoggerGuard,
};

/// The path of the log file for a run, creating `logs_dir` if needed.
///
/// The name records the shape of the synthetic data so that runs on
/// different shapes do not share a file.
pub fn log_path(logs_dir: &Path, num_classes: usize, per_class: usize, dim: usize) -> Result<PathBuf, String> {
    std::fs::create_dir_all(logs_dir).map_err(|e| e.to_string())?;
    let logs_dir = logs_dir.canonicalize().map_err(|e| e.to_string())?;
    Ok(logs_dir.join(format!("itml-{num_classes}x{per_class}-{dim}d.log")))
}

/// Installs `ftlog` with a daily-rotated file at `log_path` and `level` as
/// the global maximum.
///
/// Warnings from the appender itself go to a sibling `.err.log` file.
pub fn configure_logger(log_path: &Path, level: LevelFilter) -> Result<LoggerGuard, String> {
    let writer = FileAppender::builder().path(log_path).rotate(Period::Day).build();
    let err_path = log_path.with_extension("err.log");

    ftlog::Builder::new()
        .max_log_level(level)
        .root(writer)
        .filter("ftlog::appender", "ftlog-appender", LevelFilter::Warn)
        .appender("ftlog-appender", FileAppender::new(err_path))
        .try_init()
        .map_err(|e| e.to_string())
}
