//! Pre-filtering of resolved workspaces by their current state.

use std::collections::HashMap;

use tracing::{debug, warn};
use ws_core::BATCH_SIZE;
use ws_provider::{WorkspaceState, WorkspacesApi};

use crate::{LifecycleAction, ResolvedTarget};

/// Shown for workspaces whose state could not be fetched.
pub const UNKNOWN_STATE: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWorkspace {
    pub name: String,
    pub workspace_id: String,
    pub current_state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateFilter {
    pub allowed: Vec<ResolvedTarget>,
    pub skipped: Vec<SkippedWorkspace>,
}

/// Current state of each workspace, fetched in batches.
///
/// A batch that fails is logged and left out, so its IDs are simply missing
/// from the map.
pub fn fetch_states(
    api: &dyn WorkspacesApi,
    workspace_ids: &[String],
) -> HashMap<String, WorkspaceState> {
    let mut states = HashMap::new();
    for batch in workspace_ids.chunks(BATCH_SIZE) {
        match api.describe_by_ids(batch) {
            Ok(records) => {
                for record in records {
                    if let Some(state) = record.state {
                        states.insert(record.workspace_id, state);
                    }
                }
            }
            Err(e) => warn!("Could not fetch state for {} WorkSpaces: {}", batch.len(), e),
        }
    }
    debug!("Fetched state for {} of {} WorkSpaces", states.len(), workspace_ids.len());
    states
}

/// Split `pairs` into those in the state `action` requires and those skipped.
pub fn filter_by_state(
    api: &dyn WorkspacesApi,
    pairs: &[ResolvedTarget],
    action: LifecycleAction,
) -> StateFilter {
    let ids: Vec<String> = pairs.iter().map(|p| p.workspace_id.clone()).collect();
    let states = fetch_states(api, &ids);
    partition_by_state(pairs, &states, &action.required_state())
}

fn partition_by_state(
    pairs: &[ResolvedTarget],
    states: &HashMap<String, WorkspaceState>,
    required: &WorkspaceState,
) -> StateFilter {
    let mut filter = StateFilter::default();
    for pair in pairs {
        match states.get(&pair.workspace_id) {
            Some(state) if state == required => filter.allowed.push(pair.clone()),
            other => filter.skipped.push(SkippedWorkspace {
                name: pair.target.clone(),
                workspace_id: pair.workspace_id.clone(),
                current_state: other
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| UNKNOWN_STATE.to_string()),
            }),
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use ws_provider::mock::{Call, MockWorkspaces};
    use ws_provider::WorkspaceRecord;

    fn record(id: &str, state: &str) -> WorkspaceRecord {
        WorkspaceRecord::new(id).with_state(WorkspaceState::from_api(state))
    }

    fn pair(id: &str) -> ResolvedTarget {
        ResolvedTarget::new(format!("name-{id}"), id)
    }

    #[test]
    fn test_start_keeps_only_stopped_workspaces() {
        let api = MockWorkspaces::new(vec![
            record("ws-1", "STOPPED"),
            record("ws-2", "AVAILABLE"),
            record("ws-3", "ERROR"),
        ]);
        let pairs = vec![pair("ws-1"), pair("ws-2"), pair("ws-3")];

        let filter = filter_by_state(&api, &pairs, LifecycleAction::Start);

        assert_eq!(filter.allowed, vec![pair("ws-1")]);
        let skipped: Vec<(&str, &str)> = filter
            .skipped
            .iter()
            .map(|s| (s.workspace_id.as_str(), s.current_state.as_str()))
            .collect();
        assert_eq!(skipped, vec![("ws-2", "AVAILABLE"), ("ws-3", "ERROR")]);
        assert_eq!(filter.skipped[0].name, "name-ws-2");
    }

    #[test]
    fn test_stop_keeps_only_available_workspaces() {
        let api = MockWorkspaces::new(vec![
            record("ws-1", "STOPPED"),
            record("ws-2", "AVAILABLE"),
        ]);
        let filter = filter_by_state(&api, &[pair("ws-1"), pair("ws-2")], LifecycleAction::Stop);
        assert_eq!(filter.allowed, vec![pair("ws-2")]);
        assert_eq!(filter.skipped.len(), 1);
    }

    #[test]
    fn test_failed_batch_reports_unknown_state() {
        let records: Vec<WorkspaceRecord> = (0..30)
            .map(|i| record(&format!("ws-{i}"), "STOPPED"))
            .collect();
        let api = MockWorkspaces::new(records).with_describe_failure("ws-29");
        let pairs: Vec<ResolvedTarget> = (0..30).map(|i| pair(&format!("ws-{i}"))).collect();

        let filter = filter_by_state(&api, &pairs, LifecycleAction::Start);

        assert_eq!(filter.allowed.len(), 25);
        assert_eq!(filter.skipped.len(), 5);
        assert!(filter
            .skipped
            .iter()
            .all(|s| s.current_state == UNKNOWN_STATE));
    }

    #[test]
    fn test_states_fetched_in_batches_of_25() {
        let records: Vec<WorkspaceRecord> = (0..51)
            .map(|i| record(&format!("ws-{i}"), "AVAILABLE"))
            .collect();
        let api = MockWorkspaces::new(records);
        let pairs: Vec<ResolvedTarget> = (0..51).map(|i| pair(&format!("ws-{i}"))).collect();

        filter_by_state(&api, &pairs, LifecycleAction::Stop);

        let sizes: Vec<usize> = api
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::DescribeByIds(ids) => Some(ids.len()),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![25, 25, 1]);
    }

    #[test]
    fn test_workspace_missing_from_response_is_unknown() {
        let api = MockWorkspaces::new(vec![record("ws-1", "STOPPED")]);
        let filter = filter_by_state(&api, &[pair("ws-gone")], LifecycleAction::Start);
        assert!(filter.allowed.is_empty());
        assert_eq!(filter.skipped[0].current_state, UNKNOWN_STATE);
    }
}
