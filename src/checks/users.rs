//! Checks over the `users` table alone

use crate::models::User;
use crate::snapshot::Snapshot;

use super::{column_count_findings, keys_without_single_value, CheckContext, Finding};

/// `users` has exactly 5 columns
pub fn user_column_count(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    column_count_findings(
        snapshot.users.name(),
        snapshot.users.columns(),
        User::EXPECTED_COLUMN_COUNT,
    )
}

/// Every `login_hash` has exactly one distinct `currency`
pub fn user_single_currency(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    keys_without_single_value(
        snapshot
            .users
            .rows()
            .iter()
            .map(|u| (u.login_hash.as_deref(), u.currency.as_deref())),
        "login_hash",
        "currency",
    )
}
