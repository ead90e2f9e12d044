/// Repository traits and their Diesel implementations
///
/// The loader only depends on the traits, so it can be exercised with
/// in-memory repositories in tests.

pub mod schema_repository;
pub mod trade_repository;
pub mod user_repository;

pub use schema_repository::{SchemaRepository, SchemaRepositoryImpl};
pub use trade_repository::{TradeRepository, TradeRepositoryImpl};
pub use user_repository::{UserRepository, UserRepositoryImpl};

use std::sync::Arc;

use super::connection::{DatabaseError, PgPooledConnection};

/// Connection provider shared by the repository implementations
pub type ConnectionProvider =
    Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>;
