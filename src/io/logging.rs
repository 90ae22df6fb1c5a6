use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::model::workspace::Workspace;

#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    #[error("unknown log level \"{0}\" (use off, error, warn, info, debug or trace)")]
    UnknownLevel(String),
    #[error("could not open log file {path}: {source}")]
    OpenError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("logger already installed: {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Parse a `[log] level` value.
pub fn parse_level(level: &str) -> Result<LevelFilter, LogInitError> {
    LevelFilter::from_str(level.trim()).map_err(|_| LogInitError::UnknownLevel(level.to_string()))
}

/// Install a file logger for the workspace. The terminal is never written
/// to. With `level = "off"` nothing is installed.
pub fn init_logging(workspace: &Workspace) -> Result<(), LogInitError> {
    let level = parse_level(&workspace.config.log.level)?;
    if level == LevelFilter::Off {
        return Ok(());
    }
    init_file_logger(&workspace.log_path(), level)
}

fn init_file_logger(path: &Path, level: LevelFilter) -> Result<(), LogInitError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LogInitError::OpenError {
            path: path.to_path_buf(),
            source: e,
        })?;
    let config = ConfigBuilder::new()
        .add_filter_allow_str("arbor")
        .set_time_format_rfc3339()
        .build();
    WriteLogger::init(level, config, file)?;
    log::debug!("logging to {} at {}", path.display(), level);
    Ok(())
}
