//! Layered configuration
//!
//! Defaults, then `~/.nmsquery/nmsquery.json`, then `./nmsquery.json` (or the
//! file named by `--config`), then CLI flags and their env fallbacks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_QUERY_LIMIT,
    DEFAULT_QUERY_MAX_LIMIT, DUCKDB_QUERY_TIMEOUT_SECS,
};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    pub default_limit: Option<u32>,
    pub max_limit: Option<u32>,
    pub timeout_secs: Option<u64>,
}

/// One JSON config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub query: Option<QueryFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let parsed: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON in config file {}", path.display()))?;

        if let serde_json::Value::Object(unknown) = &parsed.extra
            && !unknown.is_empty()
        {
            let keys: Vec<&str> = unknown.keys().map(String::as_str).collect();
            tracing::warn!(
                path = %path.display(),
                fields = %keys.join(", "),
                "Ignoring unrecognized config keys"
            );
        }
        Ok(parsed)
    }

    /// Fields set in `other` win
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(Default::default);
            overlay(&mut current.host, server.host);
            overlay(&mut current.port, server.port);
        }
        if let Some(query) = other.query {
            let current = self.query.get_or_insert_with(Default::default);
            overlay(&mut current.default_limit, query.default_limit);
            overlay(&mut current.max_limit, query.max_limit);
            overlay(&mut current.timeout_secs, query.timeout_secs);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Search query limits
#[derive(Debug, Clone, Copy)]
pub struct QueryConfig {
    pub default_limit: u32,
    pub max_limit: u32,
    pub timeout_secs: u64,
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_QUERY_LIMIT,
            max_limit: DEFAULT_QUERY_MAX_LIMIT,
            timeout_secs: DUCKDB_QUERY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub query: QueryConfig,
}

impl AppConfig {
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let mut merged = FileConfig::default();
        let mut sources: Vec<PathBuf> = Vec::new();

        let profile = dirs::home_dir()
            .map(|home| home.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME));
        if let Some(path) = profile.filter(|p| p.exists()) {
            merged.merge(FileConfig::read(&path)?);
            sources.push(path);
        }

        let explicit = cli
            .config
            .as_ref()
            .map(|path| expand_path(&path.to_string_lossy()));
        let local = match explicit {
            Some(path) if !path.exists() => {
                anyhow::bail!("Config file not found: {}", path.display())
            }
            Some(path) => Some(path),
            None => Some(PathBuf::from(CONFIG_FILE_NAME)).filter(|p| p.exists()),
        };
        if let Some(path) = local {
            merged.merge(FileConfig::read(&path)?);
            sources.push(path);
        }

        let config = Self::layer(cli, merged);
        config.validate()?;

        tracing::debug!(
            sources = ?sources,
            host = %config.server.host,
            port = config.server.port,
            default_limit = config.query.default_limit,
            max_limit = config.query.max_limit,
            timeout_secs = config.query.timeout_secs,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// CLI and env values beat file values, which beat defaults
    fn layer(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_query = file_config.query.unwrap_or_default();
        let defaults = QueryConfig::default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let query = QueryConfig {
            default_limit: cli
                .query_default_limit
                .or(file_query.default_limit)
                .unwrap_or(defaults.default_limit),
            max_limit: cli
                .query_max_limit
                .or(file_query.max_limit)
                .unwrap_or(defaults.max_limit),
            timeout_secs: cli
                .query_timeout_secs
                .or(file_query.timeout_secs)
                .unwrap_or(defaults.timeout_secs),
        };

        Self {
            server: ServerConfig { host, port },
            query,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Invalid configuration: server.host must not be empty");
        }

        // Port 0 would bind an ephemeral port nobody knows about
        if self.server.port == 0 {
            anyhow::bail!("Invalid configuration: server.port must be greater than 0");
        }

        if self.query.max_limit == 0 {
            anyhow::bail!("Invalid configuration: query.max_limit must be greater than 0");
        }
        if self.query.default_limit == 0 || self.query.default_limit > self.query.max_limit {
            anyhow::bail!(
                "Invalid configuration: query.default_limit ({}) must be between 1 and query.max_limit ({})",
                self.query.default_limit,
                self.query.max_limit
            );
        }
        if self.query.timeout_secs == 0 {
            anyhow::bail!("Invalid configuration: query.timeout_secs must be greater than 0");
        }

        if is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Binding the unauthenticated search API to all network interfaces"
            );
        }

        Ok(())
    }
}

/// `0.0.0.0` and the IPv6 unspecified address
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "query": { "default_limit": 25, "max_limit": 200, "timeout_secs": 5 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host, Some("0.0.0.0".to_string()));
        assert_eq!(server.port, Some(8080));

        let query = config.query.as_ref().unwrap();
        assert_eq!(query.default_limit, Some(25));
        assert_eq!(query.max_limit, Some(200));
        assert_eq!(query.timeout_secs, Some(5));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.query.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("localhost".to_string())
        );
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("base.host".to_string()),
                port: Some(1000),
            }),
            query: Some(QueryFileConfig {
                default_limit: Some(20),
                max_limit: Some(100),
                timeout_secs: None,
            }),
            extra: serde_json::Value::Null,
        };
        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(2000),
            }),
            query: Some(QueryFileConfig {
                default_limit: None,
                max_limit: Some(500),
                timeout_secs: Some(10),
            }),
            extra: serde_json::Value::Null,
        };

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host, Some("base.host".to_string()));
        assert_eq!(server.port, Some(2000));
        let query = base.query.unwrap();
        assert_eq!(query.default_limit, Some(20));
        assert_eq!(query.max_limit, Some(500));
        assert_eq!(query.timeout_secs, Some(10));
    }

    #[test]
    fn test_layer_defaults() {
        let config = AppConfig::layer(&CliConfig::default(), FileConfig::default());

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.query.default_limit, DEFAULT_QUERY_LIMIT);
        assert_eq!(config.query.max_limit, DEFAULT_QUERY_MAX_LIMIT);
        assert_eq!(config.query.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layer_cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "server": { "port": 9000 }, "query": { "default_limit": 50, "timeout_secs": 3 } }"#,
        )
        .unwrap();
        let cli = CliConfig {
            port: Some(3000),
            query_default_limit: Some(5),
            ..Default::default()
        };

        let config = AppConfig::layer(&cli, file);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.query.default_limit, 5);
        assert_eq!(config.query.timeout_secs, 3);
    }

    #[test]
    fn test_load_from_cli_config_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "server": {{ "host": "10.1.2.3" }}, "query": {{ "max_limit": 50 }} }}"#
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, "10.1.2.3");
        assert_eq!(config.query.max_limit, 50);
    }

    #[test]
    fn test_load_missing_config_path() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/nmsquery.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_validation_server_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let config = AppConfig::layer(&cli, FileConfig::default());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port must be greater than 0"));
    }

    #[test]
    fn test_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        let config = AppConfig::layer(&cli, FileConfig::default());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host must not be empty"));
    }

    #[test]
    fn test_validation_default_limit_above_max() {
        let cli = CliConfig {
            query_default_limit: Some(2000),
            ..Default::default()
        };
        let config = AppConfig::layer(&cli, FileConfig::default());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("query.default_limit (2000)"));
    }

    #[test]
    fn test_validation_zero_limits_and_timeout() {
        for cli in [
            CliConfig {
                query_default_limit: Some(0),
                ..Default::default()
            },
            CliConfig {
                query_max_limit: Some(0),
                ..Default::default()
            },
            CliConfig {
                query_timeout_secs: Some(0),
                ..Default::default()
            },
        ] {
            let config = AppConfig::layer(&cli, FileConfig::default());
            assert!(config.validate().is_err(), "{:?} should be rejected", cli);
        }
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));

        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
        assert!(!is_all_interfaces("::1"));
    }
}
