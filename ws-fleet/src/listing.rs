//! `users` and `status` listings for resolved workspaces.

use tracing::error;
use ws_core::BATCH_SIZE;
use ws_provider::{WorkspaceRecord, WorkspacesApi};

use crate::ResolvedTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub name: String,
    pub workspace_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub name: String,
    pub workspace_id: String,
    pub state: String,
}

/// Describe the resolved workspaces batch by batch. Failed batches are
/// logged and contribute no records.
fn describe_resolved(api: &dyn WorkspacesApi, pairs: &[ResolvedTarget]) -> Vec<WorkspaceRecord> {
    let ids: Vec<String> = pairs.iter().map(|p| p.workspace_id.clone()).collect();
    let mut records = Vec::new();
    for batch in ids.chunks(BATCH_SIZE) {
        match api.describe_by_ids(batch) {
            Ok(found) => records.extend(found),
            Err(e) => error!("DescribeWorkspaces failed: {}", e),
        }
    }
    records
}

pub fn list_users(api: &dyn WorkspacesApi, pairs: &[ResolvedTarget]) -> Vec<UserRow> {
    describe_resolved(api, pairs)
        .into_iter()
        .map(|ws| UserRow {
            name: ws.display_name().to_string(),
            user_name: ws.user_name.clone().unwrap_or_default(),
            workspace_id: ws.workspace_id,
        })
        .collect()
}

pub fn list_status(api: &dyn WorkspacesApi, pairs: &[ResolvedTarget]) -> Vec<StatusRow> {
    describe_resolved(api, pairs)
        .into_iter()
        .map(|ws| StatusRow {
            name: ws.display_name().to_string(),
            state: ws
                .state
                .as_ref()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            workspace_id: ws.workspace_id,
        })
        .collect()
}
