//! Target resolution.
//!
//! Targets are matched in two phases. The first is an exact, case-insensitive
//! lookup of workspace ID, computer name and user name against one inventory
//! snapshot. The optional second phase walks the inventory calling
//! DescribeTags per workspace and matches the `Name` tag, bounded by a lookup
//! cap because every lookup is a separate API call.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::{debug, info, warn};
use ws_core::Result;
use ws_provider::{label_from_tags, WorkspaceRecord, WorkspacesApi};

/// Log a progress line every this many tag lookups.
pub const PROGRESS_EVERY: usize = 50;

/// Backoff applied to throttled DescribeTags calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub target: String,
    pub workspace_id: String,
}

impl ResolvedTarget {
    pub fn new(target: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            workspace_id: workspace_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: Vec<ResolvedTarget>,
    pub unresolved: Vec<String>,
    /// Workspaces whose tags were looked up during the fallback phase.
    pub label_lookups: usize,
}

/// Index lowercased ID, computer name and user name to the workspace ID.
///
/// When two workspaces share a key the one indexed last wins. That ambiguity
/// is left as is; changing it would change which workspace a name resolves to.
pub fn build_index(records: &[WorkspaceRecord]) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for record in records {
        let keys = [
            Some(record.workspace_id.as_str()),
            record.computer_name.as_deref(),
            record.user_name.as_deref(),
        ];
        for key in keys.into_iter().flatten().filter(|k| !k.is_empty()) {
            index.insert(key.to_lowercase(), record.workspace_id.clone());
        }
    }
    index
}

pub struct Resolver<'a> {
    api: &'a dyn WorkspacesApi,
    retry: RetryPolicy,
    sleeper: Box<dyn Fn(Duration) + 'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(api: &'a dyn WorkspacesApi) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            sleeper: Box::new(std::thread::sleep),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the function used to wait between throttled retries.
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + 'a) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Fetch every workspace in the account, following continuation tokens.
    pub fn fetch_inventory(&self) -> Result<Vec<WorkspaceRecord>> {
        let mut workspaces = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = self.api.describe_page(next_token.as_deref())?;
            workspaces.extend(page.workspaces);
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        debug!("Fetched {} workspaces", workspaces.len());
        Ok(workspaces)
    }

    /// Resolve `targets` to workspace IDs.
    ///
    /// Only an inventory fetch failure is an error. Tag lookup failures and
    /// reaching `max_label_lookups` leave targets unresolved.
    pub fn resolve(
        &self,
        targets: &[String],
        use_label_fallback: bool,
        max_label_lookups: usize,
    ) -> Result<Resolution> {
        let inventory = self.fetch_inventory()?;
        let index = build_index(&inventory);

        let mut resolution = Resolution::default();
        for target in targets {
            match index.get(&target.to_lowercase()) {
                Some(workspace_id) => resolution
                    .resolved
                    .push(ResolvedTarget::new(target.clone(), workspace_id.clone())),
                None => resolution.unresolved.push(target.clone()),
            }
        }

        if use_label_fallback && !resolution.unresolved.is_empty() {
            self.resolve_by_label(&inventory, &mut resolution, max_label_lookups);
        }

        Ok(resolution)
    }

    fn resolve_by_label(
        &self,
        inventory: &[WorkspaceRecord],
        resolution: &mut Resolution,
        max_label_lookups: usize,
    ) {
        info!(
            "Attempting tag-based resolution for {} input(s) with a cap of {} tag lookups.",
            resolution.unresolved.len(),
            max_label_lookups
        );

        let mut pending: HashMap<String, String> = resolution
            .unresolved
            .iter()
            .map(|target| (target.to_lowercase(), target.clone()))
            .collect();
        // Case variants share one key; the spelling left in the map is the
        // one a tag match resolves, the others stay unresolved.
        let mut matched: HashSet<String> = HashSet::new();

        for record in inventory {
            if pending.is_empty() {
                break;
            }
            if resolution.label_lookups >= max_label_lookups {
                warn!(
                    "Reached the tag lookup cap ({}) before resolving all names.",
                    max_label_lookups
                );
                break;
            }

            let label = self.lookup_label(&record.workspace_id);
            resolution.label_lookups += 1;
            if resolution.label_lookups % PROGRESS_EVERY == 0 {
                info!("Tag lookups performed: {}", resolution.label_lookups);
            }

            let Some(label) = label else {
                continue;
            };
            if let Some(target) = pending.remove(&label) {
                debug!("Matched '{}' to {} by Name tag", target, record.workspace_id);
                matched.insert(target.clone());
                resolution
                    .resolved
                    .push(ResolvedTarget::new(target, record.workspace_id.clone()));
            }
        }

        resolution
            .unresolved
            .retain(|target| !matched.contains(target));
    }

    /// Lowercased, trimmed label of one workspace, or `None` when it has none
    /// or the lookup failed.
    fn lookup_label(&self, workspace_id: &str) -> Option<String> {
        let mut delay = self.retry.initial_delay;
        for attempt in 1..=self.retry.max_attempts {
            match self.api.describe_tags(workspace_id) {
                Ok(tags) => {
                    return label_from_tags(&tags)
                        .map(|label| label.trim().to_lowercase())
                        .filter(|label| !label.is_empty());
                }
                Err(e) if e.is_throttling() => {
                    debug!(
                        "DescribeTags throttled for {} (attempt {}/{})",
                        workspace_id, attempt, self.retry.max_attempts
                    );
                    if attempt < self.retry.max_attempts {
                        (self.sleeper)(delay);
                        delay = (delay * 2).min(self.retry.max_delay);
                    }
                }
                Err(e) => {
                    debug!("DescribeTags failed for {}: {}", workspace_id, e);
                    return None;
                }
            }
        }
        debug!("Giving up on tags for {} after throttling", workspace_id);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use ws_core::WsError;
    use ws_provider::mock::{Call, MockWorkspaces};
    use ws_provider::WorkspaceState;

    fn targets(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fleet() -> Vec<WorkspaceRecord> {
        vec![
            WorkspaceRecord::new("ws-1")
                .with_computer_name("A-PC")
                .with_user_name("alice"),
            WorkspaceRecord::new("ws-abc")
                .with_computer_name("Bob's PC")
                .with_user_name("bob"),
            WorkspaceRecord::new("ws-3")
                .with_computer_name("C-PC")
                .with_user_name("carol")
                .with_state(WorkspaceState::Stopped),
        ]
    }

    fn no_sleep(_: Duration) {}

    #[test]
    fn test_fetch_inventory_follows_continuation_tokens() {
        let api = MockWorkspaces::new(fleet()).with_page_size(2);
        let inventory = Resolver::new(&api).fetch_inventory().unwrap();

        assert_eq!(inventory.len(), 3);
        assert_eq!(
            api.calls(),
            vec![
                Call::DescribePage(None),
                Call::DescribePage(Some("2".to_string())),
            ]
        );
    }

    #[test]
    fn test_inventory_failure_is_an_error() {
        let api = MockWorkspaces::new(fleet()).with_inventory_error("AccessDeniedException");
        let err = Resolver::new(&api)
            .resolve(&targets(&["ws-1"]), false, 10)
            .unwrap_err();
        assert!(matches!(err, WsError::Provider { .. }));
        assert_eq!(err.exit_code(), ws_core::error::EXIT_PROVIDER);
    }

    #[test]
    fn test_exact_phase_matches_id_computer_and_user_name_in_any_case() {
        let api = MockWorkspaces::new(fleet());
        let resolution = Resolver::new(&api)
            .resolve(&targets(&["WS-1", "bob's pc", "CAROL"]), false, 0)
            .unwrap();

        assert_eq!(
            resolution.resolved,
            vec![
                ResolvedTarget::new("WS-1", "ws-1"),
                ResolvedTarget::new("bob's pc", "ws-abc"),
                ResolvedTarget::new("CAROL", "ws-3"),
            ]
        );
        assert!(resolution.unresolved.is_empty());
        assert!(api.calls().iter().all(|c| !matches!(c, Call::DescribeTags(_))));
    }

    #[test]
    fn test_mixed_targets_leave_unknown_unresolved() {
        let api = MockWorkspaces::new(fleet());
        let resolution = Resolver::new(&api)
            .resolve(&targets(&["ws-1", "Bob's PC", "ghost"]), false, 500)
            .unwrap();

        assert_eq!(
            resolution.resolved,
            vec![
                ResolvedTarget::new("ws-1", "ws-1"),
                ResolvedTarget::new("Bob's PC", "ws-abc"),
            ]
        );
        assert_eq!(resolution.unresolved, vec!["ghost"]);
    }

    #[test]
    fn test_index_collisions_resolve_to_last_indexed_workspace() {
        let records = vec![
            WorkspaceRecord::new("ws-old").with_computer_name("shared"),
            WorkspaceRecord::new("ws-new").with_user_name("SHARED"),
        ];
        let index = build_index(&records);
        assert_eq!(index.get("shared").map(String::as_str), Some("ws-new"));
        assert_eq!(index.get("ws-old").map(String::as_str), Some("ws-old"));
    }

    #[test]
    fn test_fallback_disabled_makes_no_tag_lookups() {
        let api = MockWorkspaces::new(fleet()).with_tags("ws-1", &[("Name", "Finance Desk")]);
        let resolution = Resolver::new(&api)
            .resolve(&targets(&["finance desk"]), false, 500)
            .unwrap();
        assert_eq!(resolution.unresolved, vec!["finance desk"]);
        assert_eq!(api.tag_lookups(), 0);
    }

    #[test]
    fn test_fallback_matches_trimmed_name_tag_case_insensitively() {
        let api = MockWorkspaces::new(fleet())
            .with_tags("ws-1", &[("Owner", "ops")])
            .with_tags("ws-abc", &[("name", "  Finance Desk ")]);
        let resolution = Resolver::new(&api)
            .with_sleeper(no_sleep)
            .resolve(&targets(&["ws-3", "FINANCE DESK"]), true, 500)
            .unwrap();

        assert_eq!(
            resolution.resolved,
            vec![
                ResolvedTarget::new("ws-3", "ws-3"),
                ResolvedTarget::new("FINANCE DESK", "ws-abc"),
            ]
        );
        assert!(resolution.unresolved.is_empty());
        assert_eq!(resolution.label_lookups, 2);
    }

    #[test]
    fn test_fallback_first_matching_workspace_claims_target() {
        let api = MockWorkspaces::new(fleet())
            .with_tags("ws-1", &[("Name", "Kiosk")])
            .with_tags("ws-abc", &[("Name", "kiosk")]);
        let resolution = Resolver::new(&api)
            .resolve(&targets(&["kiosk", "ghost"]), true, 500)
            .unwrap();

        assert_eq!(resolution.resolved, vec![ResolvedTarget::new("kiosk", "ws-1")]);
        assert_eq!(resolution.unresolved, vec!["ghost"]);
        assert_eq!(resolution.label_lookups, 3);
    }

    #[test]
    fn test_fallback_never_exceeds_lookup_cap() {
        let api = MockWorkspaces::new(fleet()).with_tags("ws-3", &[("Name", "Kiosk")]);
        let resolution = Resolver::new(&api)
            .resolve(&targets(&["kiosk"]), true, 2)
            .unwrap();

        assert_eq!(resolution.label_lookups, 2);
        assert_eq!(api.tag_lookups(), 2);
        assert_eq!(resolution.unresolved, vec!["kiosk"]);
    }

    #[test]
    fn test_zero_cap_skips_fallback_entirely() {
        let api = MockWorkspaces::new(fleet()).with_tags("ws-1", &[("Name", "Kiosk")]);
        let resolution = Resolver::new(&api)
            .resolve(&targets(&["kiosk"]), true, 0)
            .unwrap();
        assert_eq!(api.tag_lookups(), 0);
        assert_eq!(resolution.unresolved, vec!["kiosk"]);
    }

    #[test]
    fn test_fallback_stops_once_everything_resolved() {
        let api = MockWorkspaces::new(fleet()).with_tags("ws-1", &[("Name", "Kiosk")]);
        let resolution = Resolver::new(&api)
            .resolve(&targets(&["kiosk"]), true, 500)
            .unwrap();

        assert_eq!(resolution.resolved, vec![ResolvedTarget::new("kiosk", "ws-1")]);
        assert_eq!(resolution.label_lookups, 1);
        assert_eq!(api.tag_lookups(), 1);
    }

    #[test]
    fn test_throttled_lookup_retries_with_doubling_backoff() {
        let api = MockWorkspaces::new(fleet())
            .with_tags("ws-1", &[("Name", "Kiosk")])
            .with_throttled_tags("ws-1", 3);
        let delays = RefCell::new(Vec::new());
        let resolution = Resolver::new(&api)
            .with_sleeper(|d| delays.borrow_mut().push(d))
            .resolve(&targets(&["kiosk"]), true, 500)
            .unwrap();

        assert_eq!(resolution.resolved, vec![ResolvedTarget::new("kiosk", "ws-1")]);
        assert_eq!(resolution.label_lookups, 1);
        assert_eq!(api.tag_lookups(), 4);
        assert_eq!(
            delays.into_inner(),
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
            ]
        );
    }

    #[test]
    fn test_exhausted_retries_yield_no_label() {
        let api = MockWorkspaces::new(fleet())
            .with_tags("ws-1", &[("Name", "Kiosk")])
            .with_throttled_tags("ws-1", 10);
        let delays = RefCell::new(Vec::new());
        let resolution = Resolver::new(&api)
            .with_sleeper(|d| delays.borrow_mut().push(d))
            .resolve(&targets(&["kiosk"]), true, 1)
            .unwrap();

        assert_eq!(resolution.unresolved, vec!["kiosk"]);
        assert_eq!(resolution.label_lookups, 1);
        assert_eq!(api.tag_lookups(), 5);
        assert_eq!(
            delays.into_inner(),
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn test_backoff_is_capped() {
        let api = MockWorkspaces::new(fleet()).with_throttled_tags("ws-1", 10);
        let delays = RefCell::new(Vec::new());
        Resolver::new(&api)
            .with_retry_policy(RetryPolicy {
                max_attempts: 7,
                ..RetryPolicy::default()
            })
            .with_sleeper(|d| delays.borrow_mut().push(d))
            .resolve(&targets(&["kiosk"]), true, 1)
            .unwrap();

        let delays = delays.into_inner();
        assert_eq!(delays.len(), 6);
        assert!(delays[3..].iter().all(|d| *d == Duration::from_secs(4)));
    }

    #[test]
    fn test_non_throttling_error_is_not_retried() {
        let api = MockWorkspaces::new(fleet())
            .with_tag_error("ws-1", "ResourceNotFoundException")
            .with_tags("ws-abc", &[("Name", "Kiosk")]);
        let resolution = Resolver::new(&api)
            .with_sleeper(|_| panic!("must not sleep"))
            .resolve(&targets(&["kiosk"]), true, 500)
            .unwrap();

        assert_eq!(resolution.resolved, vec![ResolvedTarget::new("kiosk", "ws-abc")]);
        assert_eq!(api.tag_lookups(), 2);
    }

    #[test]
    fn test_case_variant_targets_are_not_lost_by_tag_match() {
        let api = MockWorkspaces::new(fleet()).with_tags("ws-1", &[("Name", "Kiosk")]);
        let resolution = Resolver::new(&api)
            .resolve(&targets(&["kiosk", "KIOSK"]), true, 500)
            .unwrap();

        assert_eq!(resolution.resolved, vec![ResolvedTarget::new("KIOSK", "ws-1")]);
        assert_eq!(resolution.unresolved, vec!["kiosk"]);
    }
}
