//! DuckDB inventory and fault store
//!
//! Holds nodes, alarms, events, notifications and outages in a single
//! embedded database. Schema definitions and migrations are managed here;
//! filter translation lives in [`sql`].

pub mod error;
pub mod fixtures;
mod lookup;
mod migrations;
pub mod repositories;
mod repository_impl;
pub mod schema;
pub mod sql;
pub mod tables;

pub use error::DuckdbError;

use std::sync::Arc;
use std::time::Duration;

use duckdb::Connection;
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::constants::{DUCKDB_CHECKPOINT_INTERVAL_SECS, DUCKDB_DB_FILENAME};
use crate::core::storage::{AppStorage, DataSubdir};

const SESSION_SETTINGS: &str = "SET autoinstall_known_extensions = false;
     SET autoload_known_extensions = false;
     SET extension_directory = '';
     SET force_compression = 'auto';
     PRAGMA enable_checkpoint_on_shutdown;";

/// DuckDB search service
///
/// Uses a single shared connection protected by a mutex. Every query runs
/// on the blocking pool and is bounded by `query_timeout`.
pub struct DuckdbService {
    conn: Mutex<Option<Connection>>,
    query_timeout: Duration,
}

impl Drop for DuckdbService {
    fn drop(&mut self) {
        let Some(conn) = self.conn.get_mut().take() else {
            return;
        };
        if let Err((_, e)) = conn.close() {
            tracing::warn!(error = %e, "Database close on drop failed");
        }
    }
}

impl DuckdbService {
    /// Open (or create) the database file under the storage directory
    pub async fn init(storage: &AppStorage, query_timeout: Duration) -> Result<Self, DuckdbError> {
        let db_path = storage.subdir(DataSubdir::Duckdb).join(DUCKDB_DB_FILENAME);
        let path_for_log = db_path.clone();

        let conn = blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SESSION_SETTINGS)?;
            migrations::run_migrations(&conn)?;
            Ok(conn)
        })
        .await?;

        tracing::debug!(path = %path_for_log.display(), "DuckdbService initialized");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            query_timeout,
        })
    }

    /// In-memory database with the current schema applied
    #[cfg(test)]
    pub fn open_in_memory(query_timeout: Duration) -> Result<Self, DuckdbError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            query_timeout,
        })
    }

    /// Get exclusive access to the connection.
    ///
    /// Fails with [`DuckdbError::Closed`] after `close()`.
    pub fn conn(&self) -> Result<MappedMutexGuard<'_, Connection>, DuckdbError> {
        MutexGuard::try_map(self.conn.lock(), |opt| opt.as_mut()).map_err(|_| DuckdbError::Closed)
    }

    /// Check if the connection is still open (test utility only)
    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Run a blocking DuckDB query with the configured timeout
    pub async fn run_query<T, F>(&self, f: F) -> Result<T, DuckdbError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let timeout_secs = self.query_timeout.as_secs();
        match tokio::time::timeout(self.query_timeout, tokio::task::spawn_blocking(f)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Query task panicked or was cancelled");
                Err(DuckdbError::Io(std::io::Error::other(e)))
            }
            Err(_) => {
                tracing::warn!(timeout_secs, "Query timed out");
                Err(DuckdbError::Timeout { timeout_secs })
            }
        }
    }

    /// Load the sample data set. Returns `false` when data already exists.
    pub async fn seed(self: &Arc<Self>) -> Result<bool, DuckdbError> {
        let db = Arc::clone(self);
        self.run_query(move || {
            let conn = db.conn()?;
            fixtures::seed(&conn)
        })
        .await?
    }

    /// Flush the WAL into the database file. A closed service is a no-op.
    pub async fn checkpoint(self: &Arc<Self>) -> Result<(), DuckdbError> {
        let db = Arc::clone(self);
        blocking(move || {
            if let Some(conn) = db.conn.lock().as_ref() {
                conn.execute_batch("CHECKPOINT")?;
                tracing::trace!("Checkpoint written");
            }
            Ok(())
        })
        .await
    }

    /// Checkpoint and release the connection; later queries fail with `Closed`
    pub async fn close(self: Arc<Self>) -> Result<(), DuckdbError> {
        blocking(move || {
            let Some(conn) = self.conn.lock().take() else {
                return Ok(());
            };
            if let Err(e) = conn.execute_batch("CHECKPOINT") {
                tracing::warn!(error = %e, "Checkpoint before close failed");
            }
            conn.close().map_err(|(_, e)| DuckdbError::Database(e))
        })
        .await
    }

    /// Periodic checkpoints until the shutdown flag flips
    pub fn start_checkpoint_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let db = Arc::clone(self);
        let period = Duration::from_secs(DUCKDB_CHECKPOINT_INTERVAL_SECS);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticks.tick() => {
                        if let Err(e) = db.checkpoint().await {
                            tracing::warn!(error = %e, "Periodic checkpoint failed");
                        }
                    }
                }
            }
            tracing::debug!("Checkpoint task stopped");
        })
    }
}

async fn blocking<T, F>(f: F) -> Result<T, DuckdbError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DuckdbError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))?
}

/// Run `f` inside BEGIN/COMMIT, rolling back if it fails
pub(crate) fn in_transaction<F, T>(conn: &Connection, f: F) -> Result<T, DuckdbError>
where
    F: FnOnce(&Connection) -> Result<T, DuckdbError>,
{
    conn.execute_batch("BEGIN TRANSACTION")?;
    match f(conn) {
        Ok(val) => {
            conn.execute_batch("COMMIT")?;
            Ok(val)
        }
        Err(e) => {
            if let Err(rollback) = conn.execute_batch("ROLLBACK") {
                tracing::warn!(error = %rollback, "Rollback failed");
            }
            Err(e)
        }
    }
}
