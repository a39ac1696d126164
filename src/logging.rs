//! Logging setup for the application.
//!
//! Installs a global tracing subscriber writing to stderr. The filter comes
//! from `HMC_DASHBOARD_LOG` (same syntax as `RUST_LOG`), defaulting to `info`.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

pub const LOG_ENV_VAR: &str = "HMC_DASHBOARD_LOG";
const DEFAULT_FILTER: &str = "info";

static INITIALIZED: OnceLock<()> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the subscriber. Subsequent calls are no-ops.
pub fn init() -> Result<(), LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let subscriber = Registry::default().with(build_env_filter()).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INITIALIZED.set(());
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
