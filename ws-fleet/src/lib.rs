//! Bulk operations over Amazon WorkSpaces: target parsing, resolution,
//! state filtering, batched start/stop and the text reports around them.

use std::fmt::{self, Display, Formatter};

use ws_provider::WorkspaceState;

pub mod actuate;
pub mod filter;
pub mod listing;
pub mod report;
pub mod resolve;
pub mod targets;

pub use actuate::{actuate, Actuation, FailureRecord};
pub use filter::{filter_by_state, SkippedWorkspace, StateFilter};
pub use listing::{list_status, list_users, StatusRow, UserRow};
pub use resolve::{build_index, Resolution, ResolvedTarget, Resolver, RetryPolicy};
pub use targets::{dedup_case_insensitive, parse_targets, read_targets_file};

/// A state-changing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Stop,
}

impl LifecycleAction {
    /// State a workspace must be in for the action to be attempted.
    pub fn required_state(&self) -> WorkspaceState {
        match self {
            LifecycleAction::Start => WorkspaceState::Stopped,
            LifecycleAction::Stop => WorkspaceState::Available,
        }
    }

    /// Name of the batched API operation.
    pub fn operation(&self) -> &'static str {
        match self {
            LifecycleAction::Start => "StartWorkspaces",
            LifecycleAction::Stop => "StopWorkspaces",
        }
    }
}

impl Display for LifecycleAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleAction::Start => f.write_str("start"),
            LifecycleAction::Stop => f.write_str("stop"),
        }
    }
}
