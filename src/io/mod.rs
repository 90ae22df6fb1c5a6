pub mod backend;
pub mod config_io;
pub mod logging;
pub mod state;
pub mod store_io;
pub mod watcher;
pub mod workspace_io;
