//! Error types for the validator
//!
//! Fatal errors stop the run before (or instead of) validation. A data
//! invariant that does not hold is *not* an error: it is reported as a failed
//! check in the [`Report`](crate::report::Report) and never raised.

use thiserror::Error;

use crate::config::ConfigError;
use crate::database::DatabaseError;

/// An expected table or column is absent from the source database
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The table does not exist (or has no visible columns)
    #[error("Table not found: {0}")]
    MissingTable(String),

    /// The table exists but lacks columns a check needs
    #[error("Table {table} is missing column(s): {}", .columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },
}

/// Errors that abort a validation run
///
/// # Error Categories
///
/// - **Before connecting**: `Config`
/// - **Data source**: `Connection`, `Query`
/// - **Shape of the data**: `Schema`
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Required connection parameter missing or malformed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database unreachable or authentication failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Expected table absent
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Any other failure while reading the tables
    #[error("Query error: {0}")]
    Query(String),
}

impl ValidatorError {
    /// Process exit code for a run aborted by this error
    pub const EXIT_CODE: u8 = 2;

    /// Returns true if the error happened before any database access
    pub fn is_config_error(&self) -> bool {
        matches!(self, ValidatorError::Config(_))
    }

    /// Returns true if the data source could not be reached or read
    pub fn is_data_source_error(&self) -> bool {
        matches!(
            self,
            ValidatorError::Connection(_) | ValidatorError::Query(_)
        )
    }

    pub fn exit_code(&self) -> u8 {
        Self::EXIT_CODE
    }
}

impl From<DatabaseError> for ValidatorError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConnectionFailed(msg) | DatabaseError::ConnectionPoolError(msg) => {
                ValidatorError::Connection(msg)
            }
            other => ValidatorError::Query(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::MissingColumns {
            table: "trades".to_string(),
            columns: vec!["symbol".to_string(), "volume".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Table trades is missing column(s): symbol, volume"
        );
        assert_eq!(
            SchemaError::MissingTable("users".to_string()).to_string(),
            "Table not found: users"
        );
    }

    #[test]
    fn test_error_categories() {
        assert!(ValidatorError::from(ConfigError::Missing("PORT")).is_config_error());
        assert!(ValidatorError::Connection("refused".to_string()).is_data_source_error());
        assert!(!ValidatorError::from(SchemaError::MissingTable("users".to_string()))
            .is_data_source_error());
    }

    #[test]
    fn test_database_error_mapping() {
        let err = ValidatorError::from(DatabaseError::ConnectionFailed("timed out".to_string()));
        assert!(matches!(err, ValidatorError::Connection(ref m) if m == "timed out"));

        let err = ValidatorError::from(DatabaseError::QueryError("bad cast".to_string()));
        assert!(matches!(err, ValidatorError::Query(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
