use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::models::Trade;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Numeric, Text, Timestamptz};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::ConnectionProvider;

/// Trade repository trait - full-table reads of `trades`
pub trait TradeRepository: Send + Sync {
    /// Get all trades, unfiltered and unordered
    fn get_all(&self) -> Result<Vec<Trade>, DatabaseError>;
}

/// Concrete implementation of TradeRepository
pub struct TradeRepositoryImpl {
    get_conn: ConnectionProvider,
}

impl TradeRepositoryImpl {
    /// Create new trade repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

// Timestamps without time zone are interpreted in the session time zone.
// Decimal has no NaN, so numeric NaN is read as NULL.
const SELECT_TRADES: &str = "SELECT ticket_hash::text AS ticket_hash, \
     login_hash::text AS login_hash, \
     server_hash::text AS server_hash, \
     symbol::text AS symbol, \
     NULLIF(open_price::numeric, 'NaN') AS open_price, \
     NULLIF(volume::numeric, 'NaN') AS volume, \
     open_time::timestamptz AS open_time, \
     close_time::timestamptz AS close_time \
     FROM trades";

#[derive(QueryableByName, Debug)]
struct TradeRow {
    #[diesel(sql_type = Nullable<Text>)]
    ticket_hash: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    login_hash: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    server_hash: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    symbol: Option<String>,
    #[diesel(sql_type = Nullable<Numeric>)]
    open_price: Option<Decimal>,
    #[diesel(sql_type = Nullable<Numeric>)]
    volume: Option<Decimal>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    open_time: Option<DateTime<Utc>>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    close_time: Option<DateTime<Utc>>,
}

impl From<TradeRow> for Trade {
    fn from(row: TradeRow) -> Self {
        Trade {
            ticket_hash: row.ticket_hash,
            login_hash: row.login_hash,
            server_hash: row.server_hash,
            symbol: row.symbol,
            open_price: row.open_price,
            volume: row.volume,
            open_time: row.open_time,
            close_time: row.close_time,
        }
    }
}

impl TradeRepository for TradeRepositoryImpl {
    fn get_all(&self) -> Result<Vec<Trade>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let rows = diesel::sql_query(SELECT_TRADES).load::<TradeRow>(&mut conn)?;

        tracing::debug!("Loaded {} rows from {}", rows.len(), Trade::TABLE);

        Ok(rows.into_iter().map(Trade::from).collect())
    }
}
