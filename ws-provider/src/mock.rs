use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::{FailedChange, WorkspacePage, WorkspaceRecord, WorkspacesApi};
use ws_core::{Result, WsError};

/// A call made against [`MockWorkspaces`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DescribePage(Option<String>),
    DescribeByIds(Vec<String>),
    DescribeTags(String),
    Start(Vec<String>),
    Stop(Vec<String>),
}

/// In-memory WorkSpaces account with scripted failures.
#[derive(Debug, Default)]
pub struct MockWorkspaces {
    inventory: Vec<WorkspaceRecord>,
    page_size: Option<usize>,
    inventory_error: Option<String>,
    tags: HashMap<String, HashMap<String, String>>,
    throttles: RefCell<HashMap<String, usize>>,
    tag_errors: HashMap<String, String>,
    describe_failures: HashSet<String>,
    item_failures: HashMap<String, (String, String)>,
    batch_failures: HashSet<String>,
    calls: RefCell<Vec<Call>>,
    tag_lookups: Cell<usize>,
}

impl MockWorkspaces {
    pub fn new(inventory: Vec<WorkspaceRecord>) -> Self {
        Self {
            inventory,
            ..Default::default()
        }
    }

    /// Split the inventory into pages of `size` records.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Make every DescribeWorkspaces inventory page fail with `code`.
    pub fn with_inventory_error(mut self, code: &str) -> Self {
        self.inventory_error = Some(code.to_string());
        self
    }

    pub fn with_tags(mut self, workspace_id: &str, tags: &[(&str, &str)]) -> Self {
        self.tags.insert(
            workspace_id.to_string(),
            tags.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Throttle the first `times` DescribeTags calls for `workspace_id`.
    pub fn with_throttled_tags(self, workspace_id: &str, times: usize) -> Self {
        self.throttles
            .borrow_mut()
            .insert(workspace_id.to_string(), times);
        self
    }

    /// Fail DescribeTags for `workspace_id` with a non-throttling `code`.
    pub fn with_tag_error(mut self, workspace_id: &str, code: &str) -> Self {
        self.tag_errors
            .insert(workspace_id.to_string(), code.to_string());
        self
    }

    /// Fail any DescribeWorkspaces-by-ID batch that contains `workspace_id`.
    pub fn with_describe_failure(mut self, workspace_id: &str) -> Self {
        self.describe_failures.insert(workspace_id.to_string());
        self
    }

    /// Report `workspace_id` in the failed requests of a start/stop call.
    pub fn with_item_failure(mut self, workspace_id: &str, code: &str, message: &str) -> Self {
        self.item_failures.insert(
            workspace_id.to_string(),
            (code.to_string(), message.to_string()),
        );
        self
    }

    /// Fail the whole start/stop call for any batch containing `workspace_id`.
    pub fn with_batch_failure(mut self, workspace_id: &str) -> Self {
        self.batch_failures.insert(workspace_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Number of DescribeTags calls made, retries included.
    pub fn tag_lookups(&self) -> usize {
        self.tag_lookups.get()
    }

    /// Workspace IDs of every start/stop call, one entry per batch.
    pub fn mutation_batches(&self) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Start(ids) | Call::Stop(ids) => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn mutate(&self, operation: &'static str, workspace_ids: &[String]) -> Result<Vec<FailedChange>> {
        if let Some(id) = workspace_ids
            .iter()
            .find(|id| self.batch_failures.contains(*id))
        {
            return Err(WsError::provider(
                operation,
                None::<String>,
                format!("connection reset while sending batch containing {id}"),
            ));
        }
        Ok(workspace_ids
            .iter()
            .filter_map(|id| {
                self.item_failures
                    .get(id)
                    .map(|(code, message)| FailedChange {
                        workspace_id: id.clone(),
                        error_code: code.clone(),
                        error_message: message.clone(),
                    })
            })
            .collect())
    }
}

impl WorkspacesApi for MockWorkspaces {
    fn describe_page(&self, next_token: Option<&str>) -> Result<WorkspacePage> {
        self.record(Call::DescribePage(next_token.map(str::to_string)));
        if let Some(code) = &self.inventory_error {
            return Err(WsError::provider(
                "DescribeWorkspaces",
                Some(code.clone()),
                "inventory unavailable",
            ));
        }

        let start = match next_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                WsError::provider("DescribeWorkspaces", Some("InvalidParameterValuesException"), "bad token")
            })?,
            None => 0,
        };
        let size = self.page_size.unwrap_or(self.inventory.len().max(1));
        let end = (start + size).min(self.inventory.len());
        Ok(WorkspacePage {
            workspaces: self.inventory[start.min(end)..end].to_vec(),
            next_token: (end < self.inventory.len()).then(|| end.to_string()),
        })
    }

    fn describe_by_ids(&self, workspace_ids: &[String]) -> Result<Vec<WorkspaceRecord>> {
        self.record(Call::DescribeByIds(workspace_ids.to_vec()));
        if workspace_ids
            .iter()
            .any(|id| self.describe_failures.contains(id))
        {
            return Err(WsError::provider(
                "DescribeWorkspaces",
                Some("InternalFailure"),
                "describe failed",
            ));
        }
        Ok(self
            .inventory
            .iter()
            .filter(|ws| workspace_ids.contains(&ws.workspace_id))
            .cloned()
            .collect())
    }

    fn describe_tags(&self, workspace_id: &str) -> Result<HashMap<String, String>> {
        self.record(Call::DescribeTags(workspace_id.to_string()));
        self.tag_lookups.set(self.tag_lookups.get() + 1);

        if let Some(remaining) = self.throttles.borrow_mut().get_mut(workspace_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(WsError::provider(
                    "DescribeTags",
                    Some("ThrottlingException"),
                    "Rate exceeded",
                ));
            }
        }
        if let Some(code) = self.tag_errors.get(workspace_id) {
            return Err(WsError::provider("DescribeTags", Some(code.clone()), "tag lookup failed"));
        }
        Ok(self.tags.get(workspace_id).cloned().unwrap_or_default())
    }

    fn start_workspaces(&self, workspace_ids: &[String]) -> Result<Vec<FailedChange>> {
        self.record(Call::Start(workspace_ids.to_vec()));
        self.mutate("StartWorkspaces", workspace_ids)
    }

    fn stop_workspaces(&self, workspace_ids: &[String]) -> Result<Vec<FailedChange>> {
        self.record(Call::Stop(workspace_ids.to_vec()));
        self.mutate("StopWorkspaces", workspace_ids)
    }
}
