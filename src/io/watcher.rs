use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches the category store for writes made by other processes (or by
/// the CLI while the TUI is open).
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<()>,
}

impl StoreWatcher {
    /// Start watching `data_path`. The parent directory is what gets
    /// watched: an atomic save replaces the file instead of modifying it.
    pub fn start(data_path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir = data_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let file_name: Option<OsString> = data_path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                // Temp files from the atomic write land in the same directory
                if event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name)
                {
                    let _ = tx.send(());
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        log::debug!("watching {}", data_path.display());
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending notifications. True if the store changed since the
    /// last call; a burst of events counts once.
    pub fn changed(&self) -> bool {
        self.rx.try_iter().count() > 0
    }
}
