//! Data-quality checks
//!
//! Every check is a plain function from a [`Snapshot`] to the list of
//! [`Finding`]s that violate its invariant. An empty list means the check
//! passed. Checks never mutate the snapshot and never depend on each other,
//! so they can run in any order.

pub mod joined;
pub mod registry;
pub mod trades;
pub mod users;

pub use registry::{Check, CheckFn, CheckGroup, CheckRegistry};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-run inputs shared by all checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckContext {
    /// Reference time for time-dependent checks, captured once per run
    pub now: DateTime<Utc>,
}

impl CheckContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn at_current_time() -> Self {
        Self::new(Utc::now())
    }
}

/// One offending item reported by a failing check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// What is wrong (e.g., `ticket_hash=t1`)
    pub subject: String,

    /// Why it is wrong
    pub detail: String,
}

impl Finding {
    pub fn new(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

/// Render an optional value the way it is printed in findings
pub(crate) fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NULL".to_string(),
    }
}

/// Check that every key maps to exactly one distinct non-NULL value
///
/// Rows with a NULL key are ignored. A key whose values are all NULL has no
/// distinct value and is reported. Keys are reported in sorted order.
pub(crate) fn keys_without_single_value<'a, I>(
    pairs: I,
    key_column: &str,
    value_column: &str,
) -> Vec<Finding>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (key, value) in pairs {
        let Some(key) = key else { continue };
        let values = groups.entry(key).or_default();
        if let Some(value) = value {
            values.insert(value);
        }
    }

    groups
        .into_iter()
        .filter(|(_, values)| values.len() != 1)
        .map(|(key, values)| {
            let detail = if values.is_empty() {
                format!("no {} recorded", value_column)
            } else {
                format!(
                    "{} distinct {} values: {}",
                    values.len(),
                    value_column,
                    values.into_iter().collect::<Vec<_>>().join(", ")
                )
            };
            Finding::new(format!("{}={}", key_column, key), detail)
        })
        .collect()
}

/// Check that a table has exactly `expected` columns
pub(crate) fn column_count_findings(table: &str, columns: &[String], expected: usize) -> Vec<Finding> {
    if columns.len() == expected {
        return Vec::new();
    }
    vec![Finding::new(
        table,
        format!(
            "expected {} columns, found {}: {}",
            expected,
            columns.len(),
            columns.join(", ")
        ),
    )]
}
