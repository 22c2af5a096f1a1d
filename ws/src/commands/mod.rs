//! Command dispatch and exit code policy.
//!
//! Exit codes: 0 success, 2 partial success, 3 invalid input or nothing
//! matched, 4 AWS client or API error.

use tracing::{error, info, warn};

use crate::cli::{Action, Args};
use ws_core::error::{EXIT_INVALID, EXIT_PARTIAL, EXIT_PROVIDER, EXIT_SUCCESS};
use ws_core::{ws_print, Result, WsError};
use ws_fleet::report::resolution_table;
use ws_fleet::{parse_targets, LifecycleAction, Resolution, Resolver};
use ws_provider::WorkspacesApi;

mod lifecycle;
mod list;

/// Parse targets, connect and run the requested action.
///
/// `connect` is only called once the input is known to be usable, so input
/// errors never touch AWS.
pub fn execute_command<C>(args: &Args, connect: C) -> i32
where
    C: FnOnce(&Args) -> Result<Box<dyn WorkspacesApi>>,
{
    let targets = match parse_targets(args.names.as_deref(), args.file.as_deref()) {
        Ok(targets) => targets,
        Err(e @ WsError::NotFound(_)) => {
            error!("{}", e);
            return EXIT_INVALID;
        }
        Err(e) => {
            error!("Failed to parse inputs: {}", e);
            return EXIT_INVALID;
        }
    };

    if targets.is_empty() && args.action != Action::Resolve {
        error!("You must provide at least one workspace target via --names or --file.");
        return EXIT_INVALID;
    }

    let api = match connect(args) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to create AWS client: {}", e);
            return EXIT_PROVIDER;
        }
    };

    run_action(args, &targets, api.as_ref())
}

/// Resolve `targets` against `api` and carry out `args.action`.
pub fn run_action(args: &Args, targets: &[String], api: &dyn WorkspacesApi) -> i32 {
    let resolution = if targets.is_empty() {
        Resolution::default()
    } else {
        match Resolver::new(api).resolve(targets, args.include_tags, args.max_tag_lookups) {
            Ok(resolution) => resolution,
            Err(e) => {
                error!("AWS error when resolving targets: {}", e);
                return e.exit_code();
            }
        }
    };

    let handler: fn(&dyn WorkspacesApi, &Resolution) -> i32 = match args.action {
        Action::Resolve => return handle_resolve(&resolution),
        Action::Start => |api, resolution| {
            lifecycle::handle_lifecycle(api, resolution, LifecycleAction::Start)
        },
        Action::Stop => |api, resolution| {
            lifecycle::handle_lifecycle(api, resolution, LifecycleAction::Stop)
        },
        Action::Users => list::handle_users,
        Action::Status => list::handle_status,
    };

    if resolution.resolved.is_empty() {
        error!("No targets resolved to WorkSpaces. Nothing to do.");
        return EXIT_INVALID;
    }

    if args.dry_run {
        return handle_dry_run(args.action, &resolution);
    }

    handler(api, &resolution)
}

fn handle_resolve(resolution: &Resolution) -> i32 {
    if resolution.resolved.is_empty() {
        warn!("No targets resolved.");
    } else {
        ws_print!("{}", resolution_table(&resolution.resolved));
    }
    if !resolution.unresolved.is_empty() {
        warn!("Unresolved inputs: {}", resolution.unresolved.join(", "));
    }

    match (resolution.resolved.is_empty(), resolution.unresolved.is_empty()) {
        (false, false) => EXIT_PARTIAL,
        (true, false) => EXIT_INVALID,
        _ => EXIT_SUCCESS,
    }
}

fn handle_dry_run(action: Action, resolution: &Resolution) -> i32 {
    let verb = action.as_str().to_uppercase();
    for pair in &resolution.resolved {
        info!("[DRY-RUN] {} {} ({})", verb, pair.target, pair.workspace_id);
    }
    if !resolution.unresolved.is_empty() {
        warn!("[DRY-RUN] Unresolved: {}", resolution.unresolved.join(", "));
    }
    EXIT_SUCCESS
}

/// Exit code for listing actions: partial when some targets did not resolve.
fn partial_if_unresolved(resolution: &Resolution) -> i32 {
    if resolution.unresolved.is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_PARTIAL
    }
}
