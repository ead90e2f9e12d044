use crate::database::connection::{DatabaseError, PgPooledConnection};
use diesel::prelude::*;
use diesel::sql_types::Text;
use std::sync::Arc;

use super::ConnectionProvider;

/// Columns of the relation `$1` resolves to through the session `search_path`
///
/// `to_regclass` yields NULL for an unknown name, so a missing table lists no
/// columns.
const SELECT_TABLE_COLUMNS: &str = "SELECT attname::text AS column_name \
     FROM pg_attribute \
     WHERE attrelid = to_regclass($1) AND attnum > 0 AND NOT attisdropped \
     ORDER BY attnum";

/// Schema repository trait - reads table metadata from the database catalog
pub trait SchemaRepository: Send + Sync {
    /// Column names of `table` as resolved by the search path, ordered by position
    ///
    /// Returns an empty list when the table does not exist.
    fn table_columns(&self, table: &str) -> Result<Vec<String>, DatabaseError>;
}

/// Concrete implementation of SchemaRepository backed by the `pg_attribute` catalog
pub struct SchemaRepositoryImpl {
    get_conn: ConnectionProvider,
}

impl SchemaRepositoryImpl {
    /// Create new schema repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

#[derive(QueryableByName, Debug)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    column_name: String,
}

impl SchemaRepository for SchemaRepositoryImpl {
    fn table_columns(&self, table: &str) -> Result<Vec<String>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let rows = diesel::sql_query(SELECT_TABLE_COLUMNS)
            .bind::<Text, _>(table)
            .load::<ColumnRow>(&mut conn)?;

        Ok(rows.into_iter().map(|row| row.column_name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::database::connection::{establish_connection_pool, get_connection};

    #[test]
    fn test_columns_resolved_through_search_path() {
        // Row queries name tables unqualified; columns must come from the same relation
        assert!(SELECT_TABLE_COLUMNS.contains("to_regclass($1)"));
        assert!(SELECT_TABLE_COLUMNS.contains("NOT attisdropped"));
        assert!(!SELECT_TABLE_COLUMNS.contains("current_schema"));
    }

    #[test]
    #[ignore]
    fn test_table_columns() {
        // Requires a reachable database configured through the environment
        let pool = establish_connection_pool(&ValidatorConfig::from_env().unwrap()).unwrap();
        let repo = SchemaRepositoryImpl::new(move || get_connection(&pool));

        assert!(repo.table_columns("users").unwrap().contains(&"login_hash".to_string()));
        assert!(repo.table_columns("no_such_table").unwrap().is_empty());
    }
}
