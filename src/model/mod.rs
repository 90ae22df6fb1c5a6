pub mod category;
pub mod config;
pub mod workspace;

pub use category::*;
pub use config::*;
pub use workspace::*;
