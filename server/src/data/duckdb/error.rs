//! DuckDB error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuckdbError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// `conn()` called after `close()`
    #[error("DuckDB connection already closed")]
    Closed,
}
