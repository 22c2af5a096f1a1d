//! Amazon WorkSpaces client built on the AWS SDK.
//!
//! The SDK is async; this client owns a current-thread tokio runtime and
//! blocks on every call so the rest of the tool stays synchronous.

use std::collections::HashMap;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_workspaces::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_workspaces::types::{StartRequest, StopRequest, Workspace};
use aws_sdk_workspaces::Client;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::{FailedChange, WorkspacePage, WorkspaceRecord, WorkspaceState, WorkspacesApi};
use ws_core::{Result, WsError};

pub struct AwsWorkspaces {
    client: Client,
    runtime: Runtime,
}

impl AwsWorkspaces {
    /// Build a client from the standard AWS credential chain.
    ///
    /// `profile` and `region` override the chain's defaults when given.
    pub fn new(profile: Option<&str>, region: Option<&str>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| WsError::Config(format!("failed to start async runtime: {e}")))?;

        let shared_config = runtime.block_on(async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(profile) = profile {
                loader = loader.profile_name(profile);
            }
            if let Some(region) = region {
                loader = loader.region(Region::new(region.to_string()));
            }
            loader.load().await
        });

        match shared_config.region() {
            Some(region) => debug!("Using AWS region {}", region),
            None => {
                return Err(WsError::Config(
                    "no AWS region configured; pass --region or set AWS_REGION".to_string(),
                ))
            }
        }

        Ok(Self {
            client: Client::new(&shared_config),
            runtime,
        })
    }
}

fn sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> WsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    WsError::Provider {
        operation,
        code,
        message,
    }
}

fn to_record(workspace: &Workspace) -> Option<WorkspaceRecord> {
    let Some(workspace_id) = workspace.workspace_id().filter(|id| !id.is_empty()) else {
        debug!("Skipping workspace without an ID");
        return None;
    };
    Some(WorkspaceRecord {
        workspace_id: workspace_id.to_string(),
        computer_name: workspace.computer_name().map(str::to_string),
        user_name: workspace.user_name().map(str::to_string),
        state: workspace
            .state()
            .map(|state| WorkspaceState::from_api(state.as_str())),
    })
}

fn to_failed_changes(
    failed: &[aws_sdk_workspaces::types::FailedWorkspaceChangeRequest],
) -> Vec<FailedChange> {
    failed
        .iter()
        .map(|f| FailedChange {
            workspace_id: f.workspace_id().unwrap_or_default().to_string(),
            error_code: f.error_code().unwrap_or_default().to_string(),
            error_message: f.error_message().unwrap_or_default().to_string(),
        })
        .collect()
}

impl WorkspacesApi for AwsWorkspaces {
    fn describe_page(&self, next_token: Option<&str>) -> Result<WorkspacePage> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .describe_workspaces()
                    .set_next_token(next_token.map(str::to_string))
                    .send(),
            )
            .map_err(|e| sdk_error("DescribeWorkspaces", e))?;

        Ok(WorkspacePage {
            workspaces: output.workspaces().iter().filter_map(to_record).collect(),
            next_token: output
                .next_token()
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        })
    }

    fn describe_by_ids(&self, workspace_ids: &[String]) -> Result<Vec<WorkspaceRecord>> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .describe_workspaces()
                    .set_workspace_ids(Some(workspace_ids.to_vec()))
                    .send(),
            )
            .map_err(|e| sdk_error("DescribeWorkspaces", e))?;

        Ok(output.workspaces().iter().filter_map(to_record).collect())
    }

    fn describe_tags(&self, workspace_id: &str) -> Result<HashMap<String, String>> {
        let output = self
            .runtime
            .block_on(self.client.describe_tags().resource_id(workspace_id).send())
            .map_err(|e| sdk_error("DescribeTags", e))?;

        Ok(output
            .tag_list()
            .iter()
            .map(|tag| {
                (
                    tag.key().to_string(),
                    tag.value().unwrap_or_default().to_string(),
                )
            })
            .collect())
    }

    fn start_workspaces(&self, workspace_ids: &[String]) -> Result<Vec<FailedChange>> {
        let requests = workspace_ids
            .iter()
            .map(|id| StartRequest::builder().workspace_id(id).build())
            .collect();
        let output = self
            .runtime
            .block_on(
                self.client
                    .start_workspaces()
                    .set_start_workspace_requests(Some(requests))
                    .send(),
            )
            .map_err(|e| sdk_error("StartWorkspaces", e))?;

        Ok(to_failed_changes(output.failed_requests()))
    }

    fn stop_workspaces(&self, workspace_ids: &[String]) -> Result<Vec<FailedChange>> {
        let requests = workspace_ids
            .iter()
            .map(|id| StopRequest::builder().workspace_id(id).build())
            .collect();
        let output = self
            .runtime
            .block_on(
                self.client
                    .stop_workspaces()
                    .set_stop_workspace_requests(Some(requests))
                    .send(),
            )
            .map_err(|e| sdk_error("StopWorkspaces", e))?;

        Ok(to_failed_changes(output.failed_requests()))
    }
}
