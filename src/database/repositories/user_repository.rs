use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::models::User;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Nullable, Text};
use std::sync::Arc;

use super::ConnectionProvider;

/// User repository trait - full-table reads of `users`
pub trait UserRepository: Send + Sync {
    /// Get all users, unfiltered and unordered
    fn get_all(&self) -> Result<Vec<User>, DatabaseError>;
}

/// Concrete implementation of UserRepository
pub struct UserRepositoryImpl {
    get_conn: ConnectionProvider,
}

impl UserRepositoryImpl {
    /// Create new user repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

// Explicit casts pin the SQL types regardless of how the columns were declared
// (e.g. `enable` stored as boolean, smallint or text)
const SELECT_USERS: &str = "SELECT login_hash::text AS login_hash, \
     currency::text AS currency, \
     CAST(enable AS int4) AS enable \
     FROM users";

#[derive(QueryableByName, Debug)]
struct UserRow {
    #[diesel(sql_type = Nullable<Text>)]
    login_hash: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    currency: Option<String>,
    #[diesel(sql_type = Nullable<Integer>)]
    enable: Option<i32>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            login_hash: row.login_hash,
            currency: row.currency,
            enable: row.enable,
        }
    }
}

impl UserRepository for UserRepositoryImpl {
    fn get_all(&self) -> Result<Vec<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let rows = diesel::sql_query(SELECT_USERS).load::<UserRow>(&mut conn)?;

        tracing::debug!("Loaded {} rows from {}", rows.len(), User::TABLE);

        Ok(rows.into_iter().map(User::from).collect())
    }
}
