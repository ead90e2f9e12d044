//! Immutable in-memory copies of the source tables

use chrono::{DateTime, Utc};

use crate::errors::SchemaError;
use crate::models::{Trade, User};

/// A fully loaded table: its column list as found in the database plus typed rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    name: String,
    columns: Vec<String>,
    rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<R>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Replace the rows, keeping name and columns
    pub fn with_rows(self, rows: Vec<R>) -> Self {
        Self { rows, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Columns from `required` that the table does not have, in the given order
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn require_columns(&self, required: &[&str]) -> Result<(), SchemaError> {
        let columns = self.missing_columns(required);
        if columns.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingColumns {
                table: self.name.clone(),
                columns,
            })
        }
    }
}

/// Both tables, read once and shared read-only by every check
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub users: Table<User>,
    pub trades: Table<Trade>,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(users: Table<User>, trades: Table<Trade>) -> Self {
        Self {
            users,
            trades,
            loaded_at: Utc::now(),
        }
    }
}
