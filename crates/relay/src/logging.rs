//! Logging system setup.
//!
//! Structured logging through `tracing`. `RUST_LOG` takes precedence over the
//! configured level when set.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Installs the global tracing subscriber.
///
/// Fails if a global subscriber has already been installed.
pub fn setup_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if settings.json_format {
        registry
            .with(fmt::layer().json().with_target(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
