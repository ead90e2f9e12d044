use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::models::{Trade, User};
use crate::snapshot::{Snapshot, Table};

/// Column layout of the production `users` table
pub const USERS_COLUMNS: &[&str] = &[
    "login_hash",
    "server_hash",
    "country_hash",
    "currency",
    "enable",
];

/// Column layout of the production `trades` table
pub const TRADES_COLUMNS: &[&str] = &[
    "login_hash",
    "ticket_hash",
    "server_hash",
    "symbol",
    "digits",
    "cmd",
    "volume",
    "open_time",
    "open_price",
    "close_time",
    "contractsize",
];

/// Fixed open time used by default fixtures, safely in the past
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn to_columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|c| c.to_string()).collect()
}

/// `users` table with the production column layout
pub fn users_table(rows: Vec<User>) -> Table<User> {
    Table::new(User::TABLE, to_columns(USERS_COLUMNS), rows)
}

/// `trades` table with the production column layout
pub fn trades_table(rows: Vec<Trade>) -> Table<Trade> {
    Table::new(Trade::TABLE, to_columns(TRADES_COLUMNS), rows)
}

pub fn snapshot(users: Vec<User>, trades: Vec<Trade>) -> Snapshot {
    Snapshot::new(users_table(users), trades_table(trades))
}

/// Builder for a valid trade that individual tests then break
///
/// Defaults: server `s1`, symbol `EURUSD`, open price `1.1`, volume `1.0`,
/// open at [`base_time`], closed one hour later.
#[derive(Debug, Clone)]
pub struct TradeBuilder {
    trade: Trade,
}

impl TradeBuilder {
    pub fn new(ticket_hash: &str, login_hash: &str) -> Self {
        let open = base_time();
        Self {
            trade: Trade {
                ticket_hash: Some(ticket_hash.to_string()),
                login_hash: Some(login_hash.to_string()),
                server_hash: Some("s1".to_string()),
                symbol: Some("EURUSD".to_string()),
                open_price: Some(Decimal::new(11, 1)),
                volume: Some(Decimal::new(10, 1)),
                open_time: Some(open),
                close_time: Some(open + Duration::hours(1)),
            },
        }
    }

    pub fn ticket_hash(mut self, ticket_hash: Option<&str>) -> Self {
        self.trade.ticket_hash = ticket_hash.map(str::to_string);
        self
    }

    pub fn login_hash(mut self, login_hash: Option<&str>) -> Self {
        self.trade.login_hash = login_hash.map(str::to_string);
        self
    }

    pub fn server_hash(mut self, server_hash: Option<&str>) -> Self {
        self.trade.server_hash = server_hash.map(str::to_string);
        self
    }

    pub fn symbol(mut self, symbol: Option<&str>) -> Self {
        self.trade.symbol = symbol.map(str::to_string);
        self
    }

    pub fn open_price(mut self, open_price: Option<Decimal>) -> Self {
        self.trade.open_price = open_price;
        self
    }

    pub fn volume(mut self, volume: Option<Decimal>) -> Self {
        self.trade.volume = volume;
        self
    }

    pub fn open_time(mut self, open_time: Option<DateTime<Utc>>) -> Self {
        self.trade.open_time = open_time;
        self
    }

    pub fn close_time(mut self, close_time: Option<DateTime<Utc>>) -> Self {
        self.trade.close_time = close_time;
        self
    }

    pub fn build(self) -> Trade {
        self.trade
    }
}
