use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arbor", about = concat!("arbor v", env!("CARGO_PKG_VERSION"), " - category tree editor"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new arbor workspace in the current directory
    Init(InitArgs),
    /// Print the category tree
    List(ListArgs),
    /// Show one category
    Show(ShowArgs),
    /// Validate the category store
    Check,
    /// Add a category
    Add(AddArgs),
    /// Rename a category
    Rename(RenameArgs),
    /// Hide or show a category
    Toggle(ToggleArgs),
    /// Delete a category and all of its subcategories
    Rm(RmArgs),
    /// Move a category under another one, or to the root
    Mv(MvArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Store name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Only list hidden categories
    #[arg(long)]
    pub hidden_only: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Category ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Category name
    pub name: String,
    /// Parent category ID (default: root level)
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Category ID
    pub id: String,
    /// New name
    pub name: String,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Category ID
    pub id: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Category ID
    pub id: String,
    /// Delete even when the category has subcategories
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
#[command(group = clap::ArgGroup::new("dest").required(true).args(["to", "root"]))]
pub struct MvArgs {
    /// Category ID
    pub id: String,
    /// New parent category ID
    #[arg(long)]
    pub to: Option<String>,
    /// Move to the root level
    #[arg(long)]
    pub root: bool,
}
