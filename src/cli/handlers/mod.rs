mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::engine::board::{BoardEvent, CategoryBoard, NoticeLevel};
use crate::engine::drag::DropOutcome;
use crate::io::logging;
use crate::io::store_io::JsonStore;
use crate::io::workspace_io::{self, WorkspaceError};
use crate::model::category::CategoryId;
use crate::model::workspace::Workspace;
use crate::ops::check::{self, CheckError, CheckWarning};

/// Global override for the workspace directory (set by -C flag)
static WORKSPACE_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    if let Some(ref dir) = cli.workspace_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        let _ = WORKSPACE_DIR_OVERRIDE.set(abs);
    }

    match cli.command {
        None => Err("no command given (try `arbor --help`)".into()),
        Some(cmd) => match cmd {
            // Init is handled in main.rs before workspace discovery
            Commands::Init(args) => cmd_init(args),

            // Read commands
            Commands::List(args) => cmd_list(args, json),
            Commands::Show(args) => cmd_show(args, json),
            Commands::Check => cmd_check(json),

            // Write commands
            Commands::Add(args) => cmd_add(args, json),
            Commands::Rename(args) => cmd_rename(args, json),
            Commands::Toggle(args) => cmd_toggle(args, json),
            Commands::Rm(args) => cmd_rm(args, json),
            Commands::Mv(args) => cmd_mv(args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the workspace from the -C override or the current directory and
/// start file logging for it.
fn load_workspace_cwd() -> Result<Workspace, WorkspaceError> {
    let start = match WORKSPACE_DIR_OVERRIDE.get() {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let workspace = workspace_io::open_workspace(&start)?;
    if let Err(e) = logging::init_logging(&workspace) {
        eprintln!("warning: {}", e);
    }
    Ok(workspace)
}

fn open_board() -> Result<CategoryBoard<JsonStore>, Box<dyn std::error::Error>> {
    let workspace = load_workspace_cwd()?;
    let store = JsonStore::open(workspace.data_path());
    Ok(CategoryBoard::load(store)?)
}

fn parse_id(raw: &str) -> Result<CategoryId, Box<dyn std::error::Error>> {
    raw.parse::<CategoryId>()
        .map_err(|_| format!("invalid category id: {}", raw).into())
}

/// Turn error and warning notices raised by the last board call into a
/// command failure.
fn finish(board: &mut CategoryBoard<JsonStore>) -> CmdResult {
    let failures: Vec<String> = board
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            BoardEvent::Notice(n) if n.level != NoticeLevel::Info => Some(n.message),
            _ => None,
        })
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; ").into())
    }
}

fn print_write(json: bool, result: WriteResultJson, text: String) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> CmdResult {
    let board = open_board()?;
    let tree = board.tree();

    if args.hidden_only {
        let hidden: Vec<HiddenJson> = tree
            .iter_depth_first()
            .into_iter()
            .filter(|(_, node)| node.hidden())
            .map(|(_, node)| HiddenJson {
                id: node.id,
                name: node.name.clone(),
                path: name_path(tree, node.id),
            })
            .collect();
        if json {
            println!("{}", serde_json::to_string_pretty(&hidden)?);
        } else if hidden.is_empty() {
            println!("no hidden categories");
        } else {
            for h in &hidden {
                println!("#{} {}", h.id, h.path.join(" > "));
            }
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&forest_to_json(tree))?);
    } else if tree.is_empty() {
        println!("no categories");
    } else {
        print!("{}", format_tree(tree));
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> CmdResult {
    let id = parse_id(&args.id)?;
    let board = open_board()?;
    let detail = category_detail_json(board.tree(), id)
        .ok_or_else(|| format!("category not found: {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }
    println!("#{} {}", detail.id, detail.name);
    println!("  slug: {}", detail.slug);
    println!(
        "  status: {}",
        if detail.is_active { "active" } else { "hidden" }
    );
    println!("  path: {}", detail.path.join(" > "));
    if let Some(parent) = detail.parent_id {
        println!("  parent: #{}", parent);
    }
    println!(
        "  subcategories: {} ({} in total)",
        detail.children.len(),
        detail.descendant_count
    );
    Ok(())
}

fn cmd_check(json: bool) -> CmdResult {
    let workspace = load_workspace_cwd()?;
    let store = JsonStore::open(workspace.data_path());
    let result = check::check_forest(&store.read_forest()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    if !result.errors.is_empty() {
        println!("Errors:");
        for err in &result.errors {
            match err {
                CheckError::ParentMismatch {
                    parent_id,
                    child_id,
                    recorded_parent,
                } => {
                    println!(
                        "  #{} is listed under {} but records parent {}",
                        child_id,
                        describe_parent(*parent_id),
                        describe_parent(*recorded_parent)
                    );
                }
                CheckError::DanglingChild {
                    parent_id,
                    child_id,
                } => {
                    println!(
                        "  {} lists missing child #{}",
                        describe_parent(*parent_id),
                        child_id
                    );
                }
                CheckError::Unreachable { id } => {
                    println!("  #{} is not reachable from the roots", id);
                }
                CheckError::MultipleParents { id } => {
                    println!("  #{} is listed under more than one parent", id);
                }
                CheckError::DuplicateId { id } => {
                    println!("  #{} appears more than once", id);
                }
                CheckError::StaleSlug { id, slug, expected } => {
                    println!("  #{} has slug \"{}\", expected \"{}\"", id, slug, expected);
                }
            }
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            println!();
        }
        println!("Warnings:");
        for warn in &result.warnings {
            match warn {
                CheckWarning::EmptyName { id } => println!("  #{} has an empty name", id),
            }
        }
    }
    if result.valid {
        println!("✓ category store is valid");
    } else {
        println!("✗ category store has errors");
    }
    Ok(())
}

fn describe_parent(parent: Option<CategoryId>) -> String {
    match parent {
        Some(id) => format!("#{}", id),
        None => "the root level".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, json: bool) -> CmdResult {
    if args.name.trim().is_empty() {
        return Err("category name cannot be empty".into());
    }
    let parent = args.parent.as_deref().map(parse_id).transpose()?;
    let mut board = open_board()?;

    let temp_id = board.start_add(parent).ok_or_else(|| {
        format!(
            "category not found: {}",
            parent.map(|p| p.to_string()).unwrap_or_default()
        )
    })?;
    board.update_draft_name(temp_id, args.name.as_str());
    let created = board.commit_draft(temp_id);
    finish(&mut board)?;
    let id = created.ok_or("category was not created")?;

    print_write(
        json,
        WriteResultJson {
            action: "add",
            id,
            removed: Vec::new(),
        },
        format!("added #{} {}", id, args.name.trim()),
    )
}

fn cmd_rename(args: RenameArgs, json: bool) -> CmdResult {
    let id = parse_id(&args.id)?;
    if args.name.trim().is_empty() {
        return Err("category name cannot be empty".into());
    }
    let mut board = open_board()?;
    if !board.start_edit(id) {
        return Err(format!("category not found: {}", id).into());
    }
    board.update_edit_name(args.name.as_str());
    board.commit_edit();
    finish(&mut board)?;

    print_write(
        json,
        WriteResultJson {
            action: "rename",
            id,
            removed: Vec::new(),
        },
        format!("renamed #{} to {}", id, args.name.trim()),
    )
}

fn cmd_toggle(args: ToggleArgs, json: bool) -> CmdResult {
    let id = parse_id(&args.id)?;
    let mut board = open_board()?;
    let is_active = board
        .toggle_hidden(id)
        .ok_or_else(|| format!("category not found: {}", id))?;
    finish(&mut board)?;

    let (action, verb) = if is_active {
        ("show", "shown")
    } else {
        ("hide", "hidden")
    };
    print_write(
        json,
        WriteResultJson {
            action,
            id,
            removed: Vec::new(),
        },
        format!("#{} is now {}", id, verb),
    )
}

fn cmd_rm(args: RmArgs, json: bool) -> CmdResult {
    let id = parse_id(&args.id)?;
    let mut board = open_board()?;
    if !board.open_delete_dialog(id) {
        return Err(format!("category not found: {}", id).into());
    }
    if let Some(dialog) = board.delete_dialog()
        && let Some(warning) = &dialog.warning
        && !args.yes
    {
        return Err(format!("{}; pass --yes to delete anyway", warning).into());
    }
    let name = board
        .delete_dialog()
        .map(|d| d.name.clone())
        .unwrap_or_default();
    let removed = board.confirm_delete();
    finish(&mut board)?;

    let count = removed.len();
    print_write(
        json,
        WriteResultJson {
            action: "delete",
            id,
            removed,
        },
        format!(
            "deleted #{} {} ({} {})",
            id,
            name,
            count,
            if count == 1 { "category" } else { "categories" }
        ),
    )
}

fn cmd_mv(args: MvArgs, json: bool) -> CmdResult {
    let id = parse_id(&args.id)?;
    let target = args.to.as_deref().map(parse_id).transpose()?;
    let mut board = open_board()?;
    if !board.tree().contains(id) {
        return Err(format!("category not found: {}", id).into());
    }

    let text = match target {
        None => {
            board.move_to_root(id)?;
            format!("moved #{} to the root level", id)
        }
        Some(target) => {
            if !board.tree().contains(target) {
                return Err(format!("category not found: {}", target).into());
            }
            board.drag_start(id);
            board.drag_over(target);
            match board.drag_end()? {
                DropOutcome::Moved { .. } => format!("moved #{} under #{}", id, target),
                DropOutcome::Ignored => {
                    return Err(format!("cannot move category {} into itself", id).into());
                }
            }
        }
    };
    finish(&mut board)?;

    print_write(
        json,
        WriteResultJson {
            action: "move",
            id,
            removed: Vec::new(),
        },
        text,
    )
}
