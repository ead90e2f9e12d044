//! Ordered registry of named checks

use serde::{Deserialize, Serialize};

use crate::errors::SchemaError;
use crate::models::{Trade, User};
use crate::snapshot::Snapshot;

use super::{joined, trades, users, CheckContext, Finding};

/// Signature shared by every check
pub type CheckFn = fn(&Snapshot, &CheckContext) -> Vec<Finding>;

/// Which table(s) a check looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckGroup {
    Users,
    Trades,
    Joined,
}

impl CheckGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckGroup::Users => "users",
            CheckGroup::Trades => "trades",
            CheckGroup::Joined => "joined",
        }
    }
}

/// A named check together with the tables whose rows it reads
///
/// Column-count checks read no rows and always run.
#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    pub group: CheckGroup,
    pub description: &'static str,
    pub reads_users: bool,
    pub reads_trades: bool,
    pub run: CheckFn,
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("reads_users", &self.reads_users)
            .field("reads_trades", &self.reads_trades)
            .finish_non_exhaustive()
    }
}

impl Check {
    /// Run the check after verifying the tables it reads were fully loaded
    ///
    /// A table missing any loaded column has no rows in the snapshot, so a
    /// check reading it would see an empty table. Such checks report the
    /// schema problem instead of a verdict.
    pub fn evaluate(
        &self,
        snapshot: &Snapshot,
        ctx: &CheckContext,
    ) -> Result<Vec<Finding>, SchemaError> {
        if self.reads_users {
            snapshot.users.require_columns(User::LOADED_COLUMNS)?;
        }
        if self.reads_trades {
            snapshot.trades.require_columns(Trade::LOADED_COLUMNS)?;
        }
        Ok((self.run)(snapshot, ctx))
    }
}

/// The list of checks a run executes, in report order
#[derive(Debug, Clone)]
pub struct CheckRegistry {
    checks: Vec<Check>,
}

impl CheckRegistry {
    pub fn new(checks: Vec<Check>) -> Self {
        Self { checks }
    }

    /// All data-quality checks for `users` and `trades`
    pub fn standard() -> Self {
        Self::new(vec![
            Check {
                name: "user_column_count",
                group: CheckGroup::Users,
                description: "users has exactly 5 columns",
                reads_users: false,
                reads_trades: false,
                run: users::user_column_count,
            },
            Check {
                name: "user_single_currency",
                group: CheckGroup::Users,
                description: "each login_hash has exactly one currency",
                reads_users: true,
                reads_trades: false,
                run: users::user_single_currency,
            },
            Check {
                name: "trades_column_count",
                group: CheckGroup::Trades,
                description: "trades has exactly 11 columns",
                reads_users: false,
                reads_trades: false,
                run: trades::trades_column_count,
            },
            Check {
                name: "ticket_hash_uniqueness",
                group: CheckGroup::Trades,
                description: "ticket_hash is unique",
                reads_users: false,
                reads_trades: true,
                run: trades::ticket_hash_uniqueness,
            },
            Check {
                name: "non_negative_open_price",
                group: CheckGroup::Trades,
                description: "open_price is not negative",
                reads_users: false,
                reads_trades: true,
                run: trades::non_negative_open_price,
            },
            Check {
                name: "open_before_close",
                group: CheckGroup::Trades,
                description: "open_time is not after close_time",
                reads_users: false,
                reads_trades: true,
                run: trades::open_before_close,
            },
            Check {
                name: "symbol_alphanumeric",
                group: CheckGroup::Trades,
                description: "symbol codes are alphanumeric",
                reads_users: false,
                reads_trades: true,
                run: trades::symbol_alphanumeric,
            },
            Check {
                name: "close_time_in_past",
                group: CheckGroup::Trades,
                description: "close_time is in the past",
                reads_users: false,
                reads_trades: true,
                run: trades::close_time_in_past,
            },
            Check {
                name: "volume_positive",
                group: CheckGroup::Trades,
                description: "volume is positive",
                reads_users: false,
                reads_trades: true,
                run: trades::volume_positive,
            },
            Check {
                name: "user_single_server",
                group: CheckGroup::Trades,
                description: "each login_hash trades on exactly one server",
                reads_users: false,
                reads_trades: true,
                run: trades::user_single_server,
            },
            Check {
                name: "trades_reference_existing_user",
                group: CheckGroup::Joined,
                description: "every trade belongs to a known user",
                reads_users: true,
                reads_trades: true,
                run: joined::trades_reference_existing_user,
            },
            Check {
                name: "no_trades_for_disabled_user",
                group: CheckGroup::Joined,
                description: "disabled users have no trades",
                reads_users: true,
                reads_trades: true,
                run: joined::no_trades_for_disabled_user,
            },
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
