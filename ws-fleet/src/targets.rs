//! Target parsing from `--names` and `--file`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;
use ws_core::{Result, WsError};

/// Split a comma-separated list into trimmed, non-empty entries.
fn split_csv(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Drop case-insensitive duplicates, keeping the first spelling seen.
pub fn dedup_case_insensitive<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(Into::into)
        .filter(|item: &String| seen.insert(item.to_lowercase()))
        .collect()
}

/// Read targets from a file: one or more per line, comma-separated.
pub fn read_targets_file(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(WsError::NotFound(path.display().to_string()));
    }
    let contents = fs::read_to_string(path)?;
    let entries: Vec<&str> = contents.lines().flat_map(split_csv).collect();
    debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(dedup_case_insensitive(entries))
}

/// Merge inline and file targets into one ordered, de-duplicated list.
///
/// Inline entries come first. Uniqueness is case-insensitive and the first
/// occurrence wins.
pub fn parse_targets(names: Option<&str>, file: Option<&Path>) -> Result<Vec<String>> {
    let mut targets: Vec<String> = names
        .map(|n| split_csv(n).map(str::to_string).collect())
        .unwrap_or_default();
    if let Some(path) = file {
        targets.extend(read_targets_file(path)?);
    }
    Ok(dedup_case_insensitive(targets))
}
