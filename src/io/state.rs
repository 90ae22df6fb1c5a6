use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::category::CategoryId;

const STATE_FILE: &str = ".state.json";

/// What the tree editor restores on the next launch
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UiState {
    /// Category under the cursor
    #[serde(default)]
    pub cursor: Option<CategoryId>,
    /// Expanded category ids, sorted so the file diffs cleanly
    #[serde(default)]
    pub expanded: Vec<CategoryId>,
    #[serde(default)]
    pub scroll_offset: usize,
}

/// Missing or unreadable state is not an error: the editor starts collapsed.
pub fn read_ui_state(arbor_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(arbor_dir.join(STATE_FILE)).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            log::debug!("ignoring malformed {}: {}", STATE_FILE, e);
            None
        }
    }
}

pub fn write_ui_state(arbor_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    let mut tmp = NamedTempFile::new_in(arbor_dir)?;
    tmp.write_all(content.as_bytes())?;
    let path = arbor_dir.join(STATE_FILE);
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
