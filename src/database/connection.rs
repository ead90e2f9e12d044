use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use thiserror::Error;

use crate::config::ValidatorConfig;

/// Type alias for PostgreSQL connection pool
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Type alias for pooled connection
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

/// Get a connection from the pool
pub fn get_connection(pool: &PgPool) -> Result<PgPooledConnection, DatabaseError> {
    pool.get()
        .map_err(|e| DatabaseError::ConnectionPoolError(e.to_string()))
}

/// Establish the connection pool for the source database
///
/// The run only ever needs one connection. Both building the pool and checking
/// out the first connection are bounded by `connect_timeout_secs`, so an
/// unreachable server fails fast instead of hanging.
///
/// # Returns
/// * `Result<PgPool, DatabaseError>` - Pool with one verified connection, or error
pub fn establish_connection_pool(config: &ValidatorConfig) -> Result<PgPool, DatabaseError> {
    tracing::info!(
        target_db = %config.database.display_target(),
        "Establishing database connection..."
    );

    let timeout = Duration::from_secs(config.connect_timeout_secs);
    let manager = ConnectionManager::<PgConnection>::new(
        config.database.connection_string(config.connect_timeout_secs),
    );

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(timeout)
        .build(manager)
        .map_err(|e| DatabaseError::ConnectionFailed(format!("{}", e)))?;

    // Test connection
    let _ = pool
        .get()
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    tracing::info!("Database connection successful");

    Ok(pool)
}
