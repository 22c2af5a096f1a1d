//! Batched start/stop requests with per-item failure accounting.

use std::collections::{HashMap, HashSet};

use tracing::{error, info, warn};
use ws_core::BATCH_SIZE;
use ws_provider::WorkspacesApi;

use crate::{LifecycleAction, ResolvedTarget};

/// A workspace the provider refused to start or stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub name: String,
    pub workspace_id: String,
    pub error_code: String,
    pub error_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actuation {
    pub succeeded: Vec<String>,
    pub failed: Vec<ResolvedTarget>,
    /// Per-item failures the provider reported. Whole-batch failures have
    /// no entry here.
    pub failures: Vec<FailureRecord>,
}

/// Issue `action` for every pair, [`BATCH_SIZE`] workspaces per call.
///
/// A call that fails outright marks its whole batch failed. No retries.
pub fn actuate(
    api: &dyn WorkspacesApi,
    pairs: &[ResolvedTarget],
    action: LifecycleAction,
) -> Actuation {
    let mut outcome = Actuation::default();

    for batch in pairs.chunks(BATCH_SIZE) {
        let ids: Vec<String> = batch.iter().map(|p| p.workspace_id.clone()).collect();
        let result = match action {
            LifecycleAction::Start => api.start_workspaces(&ids),
            LifecycleAction::Stop => api.stop_workspaces(&ids),
        };

        let failed_items = match result {
            Ok(failed_items) => failed_items,
            Err(e) => {
                error!("{} failed: {}", action.operation(), e);
                outcome.failed.extend_from_slice(batch);
                continue;
            }
        };

        let name_by_id: HashMap<&str, &str> = batch
            .iter()
            .map(|p| (p.workspace_id.as_str(), p.target.as_str()))
            .collect();
        let failed_ids: HashSet<&str> = failed_items
            .iter()
            .map(|f| f.workspace_id.as_str())
            .filter(|id| !id.is_empty())
            .collect();

        for item in &failed_items {
            outcome.failures.push(FailureRecord {
                name: name_by_id
                    .get(item.workspace_id.as_str())
                    .copied()
                    .unwrap_or(item.workspace_id.as_str())
                    .to_string(),
                workspace_id: item.workspace_id.clone(),
                error_code: item.error_code.clone(),
                error_message: item.error_message.clone(),
            });
        }

        for pair in batch {
            if failed_ids.contains(pair.workspace_id.as_str()) {
                outcome.failed.push(pair.clone());
            } else {
                outcome.succeeded.push(pair.workspace_id.clone());
            }
        }
    }

    if !outcome.succeeded.is_empty() {
        info!(
            "{} requested for {} WorkSpaces.",
            capitalize(&action.to_string()),
            outcome.succeeded.len()
        );
    }
    if !outcome.failed.is_empty() {
        warn!("{} WorkSpaces failed to {}.", outcome.failed.len(), action);
    }
    outcome
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
