use std::fs;
use std::path::Path;

use crate::io::workspace_io::{CONFIG_FILE, WorkspaceError};
use crate::model::config::ArborConfig;

/// Read and parse `arbor.toml` from the arbor directory.
pub fn read_config(arbor_dir: &Path) -> Result<ArborConfig, WorkspaceError> {
    let config_path = arbor_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&config_text)?)
}

/// Render a fresh config file: the live settings followed by commented
/// examples of the optional sections.
pub fn render_config(config: &ArborConfig) -> Result<String, WorkspaceError> {
    let mut out = toml::to_string_pretty(config)?;
    out.push_str(CONFIG_FOOTER);
    Ok(out)
}

/// Write `config` to `arbor.toml`, replacing what was there.
pub fn write_config(arbor_dir: &Path, config: &ArborConfig) -> Result<(), WorkspaceError> {
    let config_path = arbor_dir.join(CONFIG_FILE);
    fs::write(&config_path, render_config(config)?).map_err(|e| WorkspaceError::ReadError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

const CONFIG_FOOTER: &str = r##"
# --- Log levels ---
# off, error, warn, info, debug, trace
#
# --- UI Customization ---
# [ui.colors]
# background = "#0C001B"
# text = "#A09BFE"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#5A5580"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"
"##;
