use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from arbor.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArborConfig {
    pub store: StoreInfo,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Category store file, relative to the arbor/ directory
    #[serde(default = "default_data_file")]
    pub file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            file: default_data_file(),
        }
    }
}

fn default_data_file() -> String {
    "categories.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// off, error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file, relative to the arbor/ directory
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "arbor.log".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Hex color overrides keyed by theme slot (e.g. `highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl ArborConfig {
    pub fn new(store_name: impl Into<String>) -> Self {
        ArborConfig {
            store: StoreInfo {
                name: store_name.into(),
            },
            data: DataConfig::default(),
            log: LogConfig::default(),
            ui: UiConfig::default(),
        }
    }
}
