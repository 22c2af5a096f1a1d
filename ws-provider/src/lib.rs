//! WorkSpaces provider abstraction.
//!
//! [`WorkspacesApi`] is the seam between the bulk operations and Amazon
//! WorkSpaces. [`aws::AwsWorkspaces`] talks to the real service; the mock
//! provider behind the `test-helpers` feature replays scripted responses.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use ws_core::Result;

pub mod aws;

// When the `test-helpers` feature is enabled, include the mock provider.
#[cfg(feature = "test-helpers")]
pub mod mock;

pub use aws::AwsWorkspaces;

/// Lifecycle state of a workspace as reported by DescribeWorkspaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceState {
    Available,
    Stopped,
    Other(String),
}

impl WorkspaceState {
    pub fn from_api(state: &str) -> Self {
        match state {
            "AVAILABLE" => WorkspaceState::Available,
            "STOPPED" => WorkspaceState::Stopped,
            other => WorkspaceState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WorkspaceState::Available => "AVAILABLE",
            WorkspaceState::Stopped => "STOPPED",
            WorkspaceState::Other(s) => s,
        }
    }
}

impl Display for WorkspaceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRecord {
    pub workspace_id: String,
    pub computer_name: Option<String>,
    pub user_name: Option<String>,
    pub state: Option<WorkspaceState>,
}

impl WorkspaceRecord {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            computer_name: None,
            user_name: None,
            state: None,
        }
    }

    pub fn with_computer_name(mut self, name: impl Into<String>) -> Self {
        self.computer_name = Some(name.into());
        self
    }

    pub fn with_user_name(mut self, user: impl Into<String>) -> Self {
        self.user_name = Some(user.into());
        self
    }

    pub fn with_state(mut self, state: WorkspaceState) -> Self {
        self.state = Some(state);
        self
    }

    /// Computer name when present, otherwise the workspace ID.
    pub fn display_name(&self) -> &str {
        self.computer_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.workspace_id.as_str())
    }
}

/// One page of DescribeWorkspaces output.
#[derive(Debug, Clone, Default)]
pub struct WorkspacePage {
    pub workspaces: Vec<WorkspaceRecord>,
    pub next_token: Option<String>,
}

/// A per-item failure reported by StartWorkspaces / StopWorkspaces.
///
/// Missing fields in the API response are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FailedChange {
    pub workspace_id: String,
    pub error_code: String,
    pub error_message: String,
}

/// Free-form label of a workspace: its `Name` tag, falling back to `name`.
pub fn label_from_tags(tags: &HashMap<String, String>) -> Option<&str> {
    ["Name", "name"]
        .iter()
        .filter_map(|key| tags.get(*key))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}

/// The calls this tool makes against Amazon WorkSpaces.
///
/// All calls are blocking. Batched calls accept at most
/// [`ws_core::BATCH_SIZE`] IDs; callers are responsible for chunking.
pub trait WorkspacesApi {
    /// Fetch one page of the account inventory.
    fn describe_page(&self, next_token: Option<&str>) -> Result<WorkspacePage>;

    /// Describe specific workspaces by ID.
    fn describe_by_ids(&self, workspace_ids: &[String]) -> Result<Vec<WorkspaceRecord>>;

    /// Fetch the tags attached to one workspace.
    fn describe_tags(&self, workspace_id: &str) -> Result<HashMap<String, String>>;

    /// Request a start for each ID, returning the per-item failures.
    fn start_workspaces(&self, workspace_ids: &[String]) -> Result<Vec<FailedChange>>;

    /// Request a stop for each ID, returning the per-item failures.
    fn stop_workspaces(&self, workspace_ids: &[String]) -> Result<Vec<FailedChange>>;
}
