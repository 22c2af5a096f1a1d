// Standard library
use std::process;

// External crates
use anyhow::Context;
use clap::Parser;

// Internal imports
use ws_core::ws_error;
use ws_logging::LogSession;
use ws_provider::{AwsWorkspaces, WorkspacesApi};

// Local modules
mod cli;
mod commands;

use cli::Args;
use commands::execute_command;

fn connect(args: &Args) -> ws_core::Result<Box<dyn WorkspacesApi>> {
    let client = AwsWorkspaces::new(args.profile.as_deref(), args.region.as_deref())?;
    Ok(Box::new(client))
}

fn main() {
    let args = Args::parse();

    let session = match LogSession::open(args.action.as_str(), &args.log_dir)
        .with_context(|| format!("failed to open log file in {}", args.log_dir.display()))
    {
        Ok(session) => session,
        Err(e) => {
            ws_error!("{:#}", e);
            process::exit(ws_core::error::EXIT_INVALID);
        }
    };

    let code = session.in_scope(|| execute_command(&args, connect));

    // Flush the log file before exiting.
    drop(session);
    process::exit(code);
}
