/// Database module for reading the source PostgreSQL tables
///
/// This module provides:
/// - A small r2d2 connection pool over Diesel's `PgConnection`
/// - Repository traits and their Diesel implementations
/// - The snapshot loader that turns both tables into an immutable [`Snapshot`](crate::snapshot::Snapshot)

pub mod connection;
pub mod loader;
pub mod repositories;

pub use connection::{establish_connection_pool, DatabaseError, PgPool, PgPooledConnection};
pub use loader::{load_snapshot, SnapshotLoader};
