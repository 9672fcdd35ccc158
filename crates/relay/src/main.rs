//! Main application entry point for the relay server
//!
//! Parses the command line, loads configuration, installs logging and runs
//! the relay until SIGINT/SIGTERM.

mod cli;
mod config;
mod logging;
mod signals;

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use cli::CliArgs;
use config::{AppConfig, PORT_ENV};
use relay_server::{create_server_with_config, RelayServer};

/// Time allowed for writer tasks to flush Close frames after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Main application struct
pub struct Application {
    config: AppConfig,
    server: Arc<RelayServer>,
}

impl Application {
    /// Builds the application from parsed arguments.
    pub async fn new(args: CliArgs) -> Result<Self> {
        // Configuration is loaded before logging so the level can come from it.
        let mut config = AppConfig::load_from_file(&args.config_path).await?;
        let env_port = std::env::var(PORT_ENV).ok();
        config.apply_overrides(&args, env_port.as_deref())?;

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

        logging::setup_logging(&config.logging)?;
        info!("🔧 Logging initialized with level: {}", config.logging.level);

        let server_config = config.to_server_config()?;
        let server = Arc::new(create_server_with_config(server_config));

        info!("📂 Config: {}", args.config_path.display());
        Ok(Self { config, server })
    }

    /// Runs the server until a shutdown signal arrives or the server fails.
    pub async fn run(self) -> Result<()> {
        info!("🌟 Starting relay server v{}", env!("CARGO_PKG_VERSION"));
        info!("📋 Configuration Summary:");
        info!(
            "  🌐 Bind address: {}:{}",
            self.config.server.host, self.config.server.port
        );
        info!("  👥 Max connections: {}", self.config.server.max_connections);
        info!(
            "  📦 Outbound queue: {} frame(s) per client",
            self.config.server.outbound_queue_capacity
        );

        let mut server_handle = {
            let server = self.server.clone();
            tokio::spawn(async move { server.start().await })
        };

        tokio::select! {
            finished = &mut server_handle => {
                // The accept loop only returns on its own when it failed to start.
                let outcome = finished.context("Server task panicked")?;
                if let Err(e) = &outcome {
                    error!("❌ Server error: {}", e);
                }
                return outcome.context("Relay server failed");
            }
            signal = signals::wait_for_shutdown_signal() => {
                let signal = signal.context("Failed to listen for shutdown signals")?;
                info!(
                    "📡 Received {}, closing {} player connection(s)",
                    signal,
                    self.server.player_count().await
                );
            }
        }

        self.server.shutdown().await?;
        server_handle
            .await
            .context("Server task panicked")?
            .context("Relay server failed")?;
        sleep(SHUTDOWN_GRACE).await;

        info!("✅ Relay server shutdown complete");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let app = Application::new(args).await?;
    app.run().await
}
