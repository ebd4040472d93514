//! Schema version tracking
//!
//! A fresh database gets the full schema at [`SCHEMA_VERSION`]; an older one
//! is stepped forward one version at a time. A database written by a newer
//! build is refused rather than downgraded.

use duckdb::{Connection, OptionalExt};

use super::error::DuckdbError;
use super::in_transaction;
use super::schema::{SCHEMA, SCHEMA_VERSION};

/// Bring the schema up to [`SCHEMA_VERSION`]
pub fn run_migrations(conn: &Connection) -> Result<(), DuckdbError> {
    match stored_version(conn)? {
        None => apply_initial_schema(conn),
        Some(found) if found > SCHEMA_VERSION => Err(DuckdbError::MigrationFailed {
            version: found,
            name: "version_check".to_string(),
            error: format!(
                "Database schema version {} is newer than this build ({}). Upgrade NmsQuery.",
                found, SCHEMA_VERSION
            ),
        }),
        Some(found) if found == SCHEMA_VERSION => {
            tracing::debug!(version = found, "Schema up to date");
            Ok(())
        }
        Some(found) => ((found + 1)..=SCHEMA_VERSION)
            .try_for_each(|version| apply_migration(conn, version)),
    }
}

/// `None` for a database that has never been initialized
fn stored_version(conn: &Connection) -> Result<Option<i32>, DuckdbError> {
    let tracked: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM information_schema.tables WHERE table_name = 'schema_version'",
        [],
        |row| row.get(0),
    )?;
    if !tracked {
        return Ok(None);
    }

    let version = conn
        .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(version)
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), DuckdbError> {
    let applied_at = chrono::Utc::now().timestamp_micros();
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, applied_at, description) VALUES (1, ?, ?, ?)",
        duckdb::params![version, applied_at, description],
    )?;
    Ok(())
}

fn apply_initial_schema(conn: &Connection) -> Result<(), DuckdbError> {
    let start = std::time::Instant::now();

    in_transaction(conn, |conn| {
        conn.execute_batch(SCHEMA)?;
        record_version(conn, SCHEMA_VERSION, "Initial schema")
    })?;

    tracing::debug!(
        version = SCHEMA_VERSION,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Initialized schema"
    );
    Ok(())
}

fn apply_migration(conn: &Connection, version: i32) -> Result<(), DuckdbError> {
    tracing::debug!(version, "Applying schema migration");
    in_transaction(conn, |conn| {
        let description = match version {
            // Base tables use IF NOT EXISTS
            1 => {
                conn.execute_batch(SCHEMA)?;
                "Initial schema"
            }
            2 => {
                conn.execute_batch(SCHEMA)?;
                "Add monitored_services"
            }
            _ => {
                return Err(DuckdbError::MigrationFailed {
                    version,
                    name: "unknown".to_string(),
                    error: format!("No migration defined for version {}", version),
                });
            }
        };
        record_version(conn, version, description)
    })
}
