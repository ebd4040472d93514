// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "NmsQuery";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "nmsquery";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".nmsquery";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "nmsquery.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "NMSQUERY_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

pub const ENV_HOST: &str = "NMSQUERY_HOST";

pub const ENV_PORT: &str = "NMSQUERY_PORT";

pub const ENV_LOG: &str = "NMSQUERY_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

pub const DEFAULT_HOST: &str = "127.0.0.1";

pub const DEFAULT_PORT: u16 = 8980;

/// Versioned prefix for REST routes
pub const API_PREFIX: &str = "/api/v1";

// =============================================================================
// Environment Variables - Storage
// =============================================================================

pub const ENV_DATA_DIR: &str = "NMSQUERY_DATA_DIR";

// =============================================================================
// Search Queries
// =============================================================================

pub const ENV_QUERY_DEFAULT_LIMIT: &str = "NMSQUERY_QUERY_DEFAULT_LIMIT";

pub const ENV_QUERY_MAX_LIMIT: &str = "NMSQUERY_QUERY_MAX_LIMIT";

pub const ENV_QUERY_TIMEOUT_SECS: &str = "NMSQUERY_QUERY_TIMEOUT_SECS";

/// Page size when a request omits `limit`
pub const DEFAULT_QUERY_LIMIT: u32 = 10;

/// Largest `limit` a request may ask for
pub const DEFAULT_QUERY_MAX_LIMIT: u32 = 1000;

// =============================================================================
// DuckDB Database
// =============================================================================

pub const DUCKDB_DB_FILENAME: &str = "nmsquery.duckdb";

/// Background checkpoint interval
pub const DUCKDB_CHECKPOINT_INTERVAL_SECS: u64 = 300;

/// Default timeout for a single search
pub const DUCKDB_QUERY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Shutdown
// =============================================================================

/// Upper bound on waiting for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
