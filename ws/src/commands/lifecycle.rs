//! Start/stop command handler.

use tracing::{info, warn};

use ws_core::error::{EXIT_INVALID, EXIT_PARTIAL, EXIT_SUCCESS};
use ws_core::ws_print;
use ws_fleet::report::{failure_table, skipped_table};
use ws_fleet::{actuate, filter_by_state, LifecycleAction, Resolution};
use ws_provider::WorkspacesApi;

/// Start or stop the resolved WorkSpaces that are in the required state.
pub fn handle_lifecycle(
    api: &dyn WorkspacesApi,
    resolution: &Resolution,
    action: LifecycleAction,
) -> i32 {
    let has_unresolved = !resolution.unresolved.is_empty();

    let filter = filter_by_state(api, &resolution.resolved, action);
    if !filter.skipped.is_empty() {
        info!(
            "Skipping {} WorkSpaces not in {} state.",
            filter.skipped.len(),
            action.required_state()
        );
        ws_print!("{}", skipped_table(&filter.skipped));
    }

    if filter.allowed.is_empty() {
        warn!("No WorkSpaces in the correct state for this action.");
        return if has_unresolved { EXIT_PARTIAL } else { EXIT_INVALID };
    }

    let outcome = actuate(api, &filter.allowed, action);
    if !outcome.failed.is_empty() {
        ws_print!("{}", failure_table(&outcome));
    }

    if !outcome.failed.is_empty() || has_unresolved {
        if outcome.succeeded.is_empty() {
            EXIT_INVALID
        } else {
            EXIT_PARTIAL
        }
    } else {
        EXIT_SUCCESS
    }
}
