//! Error taxonomy for database tool calls.

use std::time::Duration;

/// Failure of a single tool call.
///
/// Absent tables are not errors: catalog lookups on a missing table
/// simply return empty lists.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// A connection could not be established (network, auth, closed pool).
    #[error("connection error: {0}")]
    Connection(String),

    /// Every pooled connection stayed busy for the whole acquire timeout.
    #[error("connection pool exhausted: no connection available after {0:?}")]
    PoolExhausted(Duration),

    /// The statement or catalog query failed on the server or in decoding.
    #[error("query execution error: {0}")]
    QueryExecution(String),
}

impl DatabaseError {
    /// Classify a failure raised while acquiring a pooled connection.
    pub fn from_acquire(err: sqlx::Error, timeout: Duration) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::PoolExhausted(timeout),
            other => Self::Connection(other.to_string()),
        }
    }

    /// Wrap a failure raised while a statement was running.
    pub fn query(err: sqlx::Error) -> Self {
        Self::QueryExecution(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
