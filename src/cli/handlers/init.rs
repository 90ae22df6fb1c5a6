use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::config_io;
use crate::io::store_io::JsonStore;
use crate::io::workspace_io::{self, ARBOR_DIR, WorkspaceError};
use crate::model::config::ArborConfig;

/// Lowercase joining words kept as-is inside a store name
const JOINERS: &[&str] = &["e", "de", "da", "do", "das", "dos", "and", "of"];

/// Store name from a directory name: `loja-de-roupas` becomes "Loja de Roupas".
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .enumerate()
        .map(|(i, word)| {
            if i > 0 && JOINERS.contains(&word) {
                return word.to_string();
            }
            let mut chars = word.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let arbor_dir = cwd.join(ARBOR_DIR);

    if arbor_dir.is_dir() {
        return Err(WorkspaceError::AlreadyExists(arbor_dir).into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(ARBOR_DIR).display()
        );
        eprintln!("Creating new workspace in ./{}/", ARBOR_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(&arbor_dir)?;
    let config = ArborConfig::new(name.as_str());
    config_io::write_config(&arbor_dir, &config)?;
    JsonStore::open(arbor_dir.join(&config.data.file)).create_if_missing()?;

    println!("Initialized arbor workspace: {}", name);
    Ok(())
}
