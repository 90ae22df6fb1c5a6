use std::process::ExitCode;

use arbor::cli::commands::{Cli, Commands};
use arbor::cli::handlers;
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        // Bare `arbor` opens the tree editor
        None => arbor::tui::run(cli.workspace_dir.as_deref()),
        // Runs before workspace discovery
        Some(Commands::Init(args)) => handlers::cmd_init(args),
        Some(_) => handlers::dispatch(cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
