use serde::{Deserialize, Serialize};

/// One row of the `users` table
///
/// Only the columns the checks read are loaded. Every field is optional
/// because the source table does not declare them `NOT NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque account identifier, referenced by `trades.login_hash`
    pub login_hash: Option<String>,

    /// Account currency code (e.g., "USD")
    pub currency: Option<String>,

    /// Account flag, `0` means the account is disabled
    pub enable: Option<i32>,
}

impl User {
    pub const TABLE: &'static str = "users";

    /// Columns read by the loader
    pub const LOADED_COLUMNS: &'static [&'static str] = &["login_hash", "currency", "enable"];

    /// Number of columns the `users` table is expected to have
    pub const EXPECTED_COLUMN_COUNT: usize = 5;

    pub fn new(login_hash: &str, currency: &str, enable: i32) -> Self {
        Self {
            login_hash: Some(login_hash.to_string()),
            currency: Some(currency.to_string()),
            enable: Some(enable),
        }
    }

    /// True only for an explicit `0` flag; a NULL flag is not treated as disabled
    pub fn is_disabled(&self) -> bool {
        self.enable == Some(0)
    }
}
