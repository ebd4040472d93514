use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_HOST, ENV_PORT, ENV_QUERY_DEFAULT_LIMIT, ENV_QUERY_MAX_LIMIT,
    ENV_QUERY_TIMEOUT_SECS,
};

#[derive(Parser)]
#[command(name = "nmsquery")]
#[command(version, about = "Filter-expression search over network inventory and faults", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Page size used when a request omits `limit`
    #[arg(long, global = true, env = ENV_QUERY_DEFAULT_LIMIT)]
    pub query_default_limit: Option<u32>,

    /// Largest page size a request may ask for
    #[arg(long, global = true, env = ENV_QUERY_MAX_LIMIT)]
    pub query_max_limit: Option<u32>,

    /// Timeout for a single search in seconds
    #[arg(long, global = true, env = ENV_QUERY_TIMEOUT_SECS)]
    pub query_timeout_secs: Option<u64>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Load the sample inventory and fault data set into an empty database
    Seed,
    /// Delete local data directory (database included). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub query_default_limit: Option<u32>,
    pub query_max_limit: Option<u32>,
    pub query_timeout_secs: Option<u64>,
}

impl Cli {
    fn into_parts(self) -> (CliConfig, Option<Commands>) {
        let config = CliConfig {
            host: self.host,
            port: self.port,
            config: self.config,
            query_default_limit: self.query_default_limit,
            query_max_limit: self.query_max_limit,
            query_timeout_secs: self.query_timeout_secs,
        };
        (config, self.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    Cli::parse().into_parts()
}
