use std::path::PathBuf;

use super::config::ArborConfig;

/// A discovered arbor workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `arbor/`
    pub root: PathBuf,
    /// Path to the `arbor/` directory
    pub arbor_dir: PathBuf,
    /// Parsed arbor.toml
    pub config: ArborConfig,
}

impl Workspace {
    /// Absolute path of the category store file
    pub fn data_path(&self) -> PathBuf {
        self.arbor_dir.join(&self.config.data.file)
    }

    /// Absolute path of the log file
    pub fn log_path(&self) -> PathBuf {
        self.arbor_dir.join(&self.config.log.file)
    }
}
