//! Database access: connection handling, introspection, and query execution

use thiserror::Error;

pub mod mysql;

/// Database error type
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection could not be established (bad credentials, unreachable host)
    #[error("Connection failed: {0}")]
    Connection(String),

    /// An operation was attempted with no active connection config
    #[error("No database connection")]
    NotConnected,

    /// Table name not present in the database
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Query execution failed (malformed SQL, unknown column, server-side
    /// rejection)
    #[error("Query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}
