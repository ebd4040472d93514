//! Unified error type for data layer
//!
//! Wraps DuckDB failures and the filter translation errors raised while a
//! search is assembled and executed on the database thread.

use thiserror::Error;

use crate::data::duckdb::DuckdbError;
use crate::query::QueryError;

#[derive(Error, Debug)]
pub enum DataError {
    /// Filter could not be translated or executed
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Database connection is closed")]
    Closed,
}

impl DataError {
    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<DuckdbError> for DataError {
    fn from(e: DuckdbError) -> Self {
        match e {
            DuckdbError::Database(e) => Self::Duckdb(e),
            DuckdbError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                version,
                name,
                error,
            },
            DuckdbError::Io(e) => Self::Io(e),
            DuckdbError::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            DuckdbError::Closed => Self::Closed,
        }
    }
}
