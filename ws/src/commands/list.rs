//! `users` and `status` command handlers

use tracing::debug;

use super::partial_if_unresolved;
use ws_core::ws_print;
use ws_fleet::report::{status_table, users_table};
use ws_fleet::{list_status, list_users, Resolution};
use ws_provider::WorkspacesApi;

pub fn handle_users(api: &dyn WorkspacesApi, resolution: &Resolution) -> i32 {
    let rows = list_users(api, &resolution.resolved);
    debug!("Listing users for {} WorkSpaces", rows.len());
    ws_print!("{}", users_table(&rows));
    partial_if_unresolved(resolution)
}

pub fn handle_status(api: &dyn WorkspacesApi, resolution: &Resolution) -> i32 {
    let rows = list_status(api, &resolution.resolved);
    debug!("Listing status for {} WorkSpaces", rows.len());
    ws_print!("{}", status_table(&rows));
    partial_if_unresolved(resolution)
}
