use std::path::{Path, PathBuf};

use crate::io::config_io;
use crate::model::workspace::Workspace;

/// Name of the directory that marks a workspace
pub const ARBOR_DIR: &str = "arbor";

/// Config file inside the arbor/ directory
pub const CONFIG_FILE: &str = "arbor.toml";

/// Error type for workspace I/O
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not an arbor workspace: no arbor/arbor.toml found")]
    NotAWorkspace,
    #[error("arbor workspace already exists in {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse arbor.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not serialize arbor.toml: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` looking for `arbor/arbor.toml`. Returns the
/// directory containing `arbor/`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let arbor_dir = current.join(ARBOR_DIR);
        if arbor_dir.is_dir() && arbor_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load the workspace rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let arbor_dir = root.join(ARBOR_DIR);
    if !arbor_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = config_io::read_config(&arbor_dir)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        arbor_dir,
        config,
    })
}

/// Discover from `start` and load.
pub fn open_workspace(start: &Path) -> Result<Workspace, WorkspaceError> {
    let root = discover_workspace(start)?;
    load_workspace(&root)
}
