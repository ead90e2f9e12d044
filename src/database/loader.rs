//! Snapshot loading
//!
//! Reads both source tables once, in full, and hands them back as an
//! immutable [`Snapshot`]. No filtering happens here: the checks see exactly
//! what the database returned.

use crate::config::ValidatorConfig;
use crate::errors::{SchemaError, ValidatorError};
use crate::models::{Trade, User};
use crate::snapshot::{Snapshot, Table};

use super::connection::{establish_connection_pool, get_connection, DatabaseError};
use super::repositories::{
    SchemaRepository, SchemaRepositoryImpl, TradeRepository, TradeRepositoryImpl,
    UserRepository, UserRepositoryImpl,
};

/// Loads both tables through the repository traits
pub struct SnapshotLoader<'a> {
    schema: &'a dyn SchemaRepository,
    users: &'a dyn UserRepository,
    trades: &'a dyn TradeRepository,
}

impl<'a> SnapshotLoader<'a> {
    pub fn new(
        schema: &'a dyn SchemaRepository,
        users: &'a dyn UserRepository,
        trades: &'a dyn TradeRepository,
    ) -> Self {
        Self {
            schema,
            users,
            trades,
        }
    }

    /// Load `users` and `trades`
    ///
    /// A missing table aborts the load. A table that lacks some of the
    /// columns the loader reads is returned with its column list and no rows,
    /// so column-count checks still run and the dependent checks report the
    /// schema problem themselves.
    pub fn load(&self) -> Result<Snapshot, ValidatorError> {
        let users = self.load_table(User::TABLE, User::LOADED_COLUMNS, || {
            self.users.get_all()
        })?;
        let trades = self.load_table(Trade::TABLE, Trade::LOADED_COLUMNS, || {
            self.trades.get_all()
        })?;

        Ok(Snapshot::new(users, trades))
    }

    fn load_table<R, F>(
        &self,
        table: &str,
        loaded_columns: &[&str],
        fetch: F,
    ) -> Result<Table<R>, ValidatorError>
    where
        F: FnOnce() -> Result<Vec<R>, DatabaseError>,
    {
        let columns = self.schema.table_columns(table)?;
        if columns.is_empty() {
            return Err(SchemaError::MissingTable(table.to_string()).into());
        }

        let snapshot = Table::new(table, columns, Vec::new());
        if let Err(err) = snapshot.require_columns(loaded_columns) {
            tracing::warn!("Rows of {} not loaded: {}", table, err);
            return Ok(snapshot);
        }

        let rows = fetch()?;
        tracing::info!(
            "Loaded {} rows ({} columns) from {}",
            rows.len(),
            snapshot.column_count(),
            table
        );

        Ok(snapshot.with_rows(rows))
    }
}

/// Connect with `config` and load both tables
///
/// The pool is dropped before returning; validation works purely in memory.
pub fn load_snapshot(config: &ValidatorConfig) -> Result<Snapshot, ValidatorError> {
    let pool = establish_connection_pool(config)?;

    let schema_pool = pool.clone();
    let schema = SchemaRepositoryImpl::new(move || get_connection(&schema_pool));

    let users_pool = pool.clone();
    let users = UserRepositoryImpl::new(move || get_connection(&users_pool));

    let trades = TradeRepositoryImpl::new(move || get_connection(&pool));

    SnapshotLoader::new(&schema, &users, &trades).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckContext, CheckRegistry};
    use crate::report::{CheckStatus, Reporter};
    use crate::testing::fixtures::{self, TradeBuilder};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSchema(HashMap<&'static str, Vec<String>>);

    impl SchemaRepository for FakeSchema {
        fn table_columns(&self, table: &str) -> Result<Vec<String>, DatabaseError> {
            Ok(self.0.get(table).cloned().unwrap_or_default())
        }
    }

    struct FakeUsers(Vec<User>);

    impl UserRepository for FakeUsers {
        fn get_all(&self) -> Result<Vec<User>, DatabaseError> {
            Ok(self.0.clone())
        }
    }

    struct FakeTrades {
        rows: Vec<Trade>,
        calls: AtomicUsize,
    }

    impl TradeRepository for FakeTrades {
        fn get_all(&self) -> Result<Vec<Trade>, DatabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    fn schema() -> FakeSchema {
        let mut tables = HashMap::new();
        tables.insert(User::TABLE, columns(fixtures::USERS_COLUMNS));
        tables.insert(Trade::TABLE, columns(fixtures::TRADES_COLUMNS));
        FakeSchema(tables)
    }

    fn trades() -> FakeTrades {
        FakeTrades {
            rows: vec![TradeBuilder::new("t1", "a").build()],
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_load_both_tables() {
        let schema = schema();
        let users = FakeUsers(vec![User::new("a", "USD", 1)]);
        let trades = trades();

        let snapshot = SnapshotLoader::new(&schema, &users, &trades).load().unwrap();

        assert_eq!(snapshot.users.column_count(), 5);
        assert_eq!(snapshot.users.row_count(), 1);
        assert_eq!(snapshot.trades.column_count(), 11);
        assert_eq!(snapshot.trades.row_count(), 1);
    }

    #[test]
    fn test_missing_table_is_schema_error() {
        let mut schema = schema();
        schema.0.remove(Trade::TABLE);
        let users = FakeUsers(vec![]);
        let trades = trades();

        let err = SnapshotLoader::new(&schema, &users, &trades).load().unwrap_err();
        assert!(matches!(
            err,
            ValidatorError::Schema(SchemaError::MissingTable(ref t)) if t == "trades"
        ));
    }

    #[test]
    fn test_missing_column_skips_rows() {
        let mut schema = schema();
        schema.0.insert(
            Trade::TABLE,
            columns(&["ticket_hash", "login_hash", "server_hash"]),
        );
        let users = FakeUsers(vec![User::new("a", "USD", 1)]);
        let trades = trades();

        let snapshot = SnapshotLoader::new(&schema, &users, &trades).load().unwrap();

        assert_eq!(snapshot.trades.column_count(), 3);
        assert_eq!(snapshot.trades.row_count(), 0);
        assert_eq!(trades.calls.load(Ordering::SeqCst), 0);
        assert!(snapshot.trades.require_columns(&["symbol"]).is_err());
    }

    fn without(layout: &[&str], column: &str) -> Vec<String> {
        layout
            .iter()
            .filter(|c| **c != column)
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_unloaded_trades_error_every_trades_check() {
        let mut schema = schema();
        schema
            .0
            .insert(Trade::TABLE, without(fixtures::TRADES_COLUMNS, "symbol"));
        let users = FakeUsers(vec![User::new("a", "USD", 1)]);
        // Rows that would fail uniqueness, volume and the user reference if read
        let trades = FakeTrades {
            rows: vec![
                TradeBuilder::new("t1", "a").build(),
                TradeBuilder::new("t1", "ghost").volume(Some(dec!(-1))).build(),
            ],
            calls: AtomicUsize::new(0),
        };

        let snapshot = SnapshotLoader::new(&schema, &users, &trades).load().unwrap();
        let registry = CheckRegistry::standard();
        let report = Reporter::new(CheckRegistry::standard(), 20)
            .run(&snapshot, &CheckContext::at_current_time());

        for check in registry.iter().filter(|c| c.reads_trades) {
            let result = report.result(check.name).unwrap();
            assert_eq!(result.status, CheckStatus::Error, "{}", check.name);
            assert!(result.error.as_deref().unwrap().contains("symbol"));
        }
        assert_eq!(
            report.result("trades_column_count").unwrap().status,
            CheckStatus::Failed
        );
        assert_eq!(
            report.result("user_single_currency").unwrap().status,
            CheckStatus::Passed
        );
        assert_eq!(report.passed, 2);
    }

    #[test]
    fn test_unloaded_users_error_every_users_check() {
        let mut schema = schema();
        schema
            .0
            .insert(User::TABLE, without(fixtures::USERS_COLUMNS, "enable"));
        let users = FakeUsers(vec![User::new("a", "USD", 1), User::new("a", "EUR", 1)]);
        let trades = trades();

        let snapshot = SnapshotLoader::new(&schema, &users, &trades).load().unwrap();
        assert_eq!(snapshot.users.row_count(), 0);

        let registry = CheckRegistry::standard();
        let report = Reporter::new(CheckRegistry::standard(), 20)
            .run(&snapshot, &CheckContext::at_current_time());

        for check in registry.iter().filter(|c| c.reads_users) {
            let result = report.result(check.name).unwrap();
            assert_eq!(result.status, CheckStatus::Error, "{}", check.name);
            assert!(result.error.as_deref().unwrap().contains("enable"));
        }
        assert_eq!(
            report.result("user_single_currency").unwrap().status,
            CheckStatus::Error
        );
        assert_eq!(
            report.result("user_column_count").unwrap().status,
            CheckStatus::Failed
        );
        assert_eq!(
            report.result("volume_positive").unwrap().status,
            CheckStatus::Passed
        );
    }

    #[test]
    fn test_query_failure_propagates() {
        struct BrokenUsers;

        impl UserRepository for BrokenUsers {
            fn get_all(&self) -> Result<Vec<User>, DatabaseError> {
                Err(DatabaseError::QueryError("invalid input syntax".to_string()))
            }
        }

        let schema = schema();
        let trades = trades();
        let err = SnapshotLoader::new(&schema, &BrokenUsers, &trades)
            .load()
            .unwrap_err();
        assert!(matches!(err, ValidatorError::Query(_)));
    }
}
