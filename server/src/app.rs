//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig, Commands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME, APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::DuckdbService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<DuckdbService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => {
                return Self::handle_system_command(system_cmd, &cli_config).await;
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;

        let database = Arc::new(
            DuckdbService::init(&storage, config.query.timeout())
                .await
                .context("Failed to open database")?,
        );
        let shutdown = ShutdownService::new(Arc::clone(&database));

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
        })
    }

    async fn handle_system_command(cmd: SystemCommands, cli: &CliConfig) -> Result<()> {
        match cmd {
            SystemCommands::Seed => Self::seed_data(cli).await,
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    async fn seed_data(cli: &CliConfig) -> Result<()> {
        let app = Self::init(cli).await?;

        let loaded = app
            .database
            .seed()
            .await
            .context("Failed to load sample data")?;
        if loaded {
            println!(
                "Sample data loaded into {}",
                app.storage.data_dir().display()
            );
        } else {
            println!("Database already holds nodes; sample data not loaded.");
        }

        app.database
            .checkpoint()
            .await
            .context("Failed to checkpoint database")?;
        Arc::clone(&app.database)
            .close()
            .await
            .context("Failed to close database")?;
        Ok(())
    }

    /// Delete the data directory after confirmation
    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();
        if !data_dir.exists() {
            println!("Nothing to prune: {} does not exist", data_dir.display());
            return Ok(());
        }
        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!(
            "About to delete {} and every database in it.",
            data_dir.display()
        );
        println!("Stop any running {} server first.", APP_NAME);

        if !skip_confirm && !confirm("Delete it? [y/N] ")? {
            println!("Aborted.");
            return Ok(());
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        tracing::info!(data_dir = %data_dir.display(), "Data directory pruned");
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        tracing::info!(
            host = %app.config.server.host,
            port = app.config.server.port,
            data_dir = %app.storage.data_dir().display(),
            "{} v{} listening",
            APP_NAME,
            env!("CARGO_PKG_VERSION")
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        tracing::info!("{} stopped", APP_NAME);
        Ok(())
    }

    async fn start_background_tasks(&self) {
        self.shutdown
            .register(
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        tracing::debug!("Background tasks started");
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("\n{}", prompt);
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
