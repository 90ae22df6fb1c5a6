pub mod check;
pub mod slug;
pub mod tree_ops;

pub use slug::slugify;
pub use tree_ops::{CategoryTree, TreeError};
