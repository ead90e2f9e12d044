use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the `trades` table
///
/// Only the columns the checks read are loaded. Every field is optional
/// because the source table does not declare them `NOT NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique trade identifier
    pub ticket_hash: Option<String>,

    /// Owning account, foreign key to `users.login_hash`
    pub login_hash: Option<String>,

    /// Trading server that handled the trade
    pub server_hash: Option<String>,

    /// Instrument code (e.g., "EURUSD", "XAUUSD")
    pub symbol: Option<String>,

    pub open_price: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub open_time: Option<DateTime<Utc>>,
    pub close_time: Option<DateTime<Utc>>,
}

impl Trade {
    pub const TABLE: &'static str = "trades";

    /// Columns read by the loader
    pub const LOADED_COLUMNS: &'static [&'static str] = &[
        "ticket_hash",
        "login_hash",
        "server_hash",
        "symbol",
        "open_price",
        "volume",
        "open_time",
        "close_time",
    ];

    /// Number of columns the `trades` table is expected to have
    pub const EXPECTED_COLUMN_COUNT: usize = 11;

    /// Label used when reporting on this trade
    pub fn ticket_label(&self) -> &str {
        self.ticket_hash.as_deref().unwrap_or("NULL")
    }

    /// `Some(true)` when the trade opens after it closes, `None` if either time is missing
    pub fn opens_after_close(&self) -> Option<bool> {
        match (self.open_time, self.close_time) {
            (Some(open), Some(close)) => Some(open > close),
            _ => None,
        }
    }
}
