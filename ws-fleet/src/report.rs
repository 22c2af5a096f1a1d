//! The tables printed by each action.

use std::collections::HashMap;

use ws_core::render_table;

use crate::{Actuation, FailureRecord, ResolvedTarget, SkippedWorkspace, StatusRow, UserRow};

pub fn resolution_table(resolved: &[ResolvedTarget]) -> String {
    let rows: Vec<[&str; 2]> = resolved
        .iter()
        .map(|r| [r.target.as_str(), r.workspace_id.as_str()])
        .collect();
    render_table(&["workspace_name", "workspace_id"], &rows)
}

pub fn skipped_table(skipped: &[SkippedWorkspace]) -> String {
    let rows: Vec<[&str; 3]> = skipped
        .iter()
        .map(|s| [s.name.as_str(), s.workspace_id.as_str(), s.current_state.as_str()])
        .collect();
    render_table(&["ws_name", "ws_id", "current_state"], &rows)
}

/// Failure table for a start/stop run.
///
/// Every failed workspace gets a row. Code and message come from the
/// provider's per-item failure when there is one and are empty for
/// workspaces whose whole batch failed.
pub fn failure_table(outcome: &Actuation) -> String {
    let headers = ["ws_name", "ws_id", "error_code", "error_message"];
    let details: HashMap<&str, &FailureRecord> = outcome
        .failures
        .iter()
        .map(|f| (f.workspace_id.as_str(), f))
        .collect();

    let mut rows: Vec<[&str; 4]> = outcome
        .failed
        .iter()
        .map(|p| match details.get(p.workspace_id.as_str()) {
            Some(f) => [
                p.target.as_str(),
                p.workspace_id.as_str(),
                f.error_code.as_str(),
                f.error_message.as_str(),
            ],
            None => [p.target.as_str(), p.workspace_id.as_str(), "", ""],
        })
        .collect();

    // Failures reported for IDs outside the request still get listed.
    rows.extend(
        outcome
            .failures
            .iter()
            .filter(|f| !outcome.failed.iter().any(|p| p.workspace_id == f.workspace_id))
            .map(|f| {
                [
                    f.name.as_str(),
                    f.workspace_id.as_str(),
                    f.error_code.as_str(),
                    f.error_message.as_str(),
                ]
            }),
    );
    render_table(&headers, &rows)
}

pub fn users_table(rows: &[UserRow]) -> String {
    let rows: Vec<[&str; 3]> = rows
        .iter()
        .map(|r| [r.name.as_str(), r.workspace_id.as_str(), r.user_name.as_str()])
        .collect();
    render_table(&["ws_name", "ws_id", "ws_user"], &rows)
}

pub fn status_table(rows: &[StatusRow]) -> String {
    let rows: Vec<[&str; 3]> = rows
        .iter()
        .map(|r| [r.name.as_str(), r.workspace_id.as_str(), r.state.as_str()])
        .collect();
    render_table(&["ws_name", "ws_id", "state"], &rows)
}
