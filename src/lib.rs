pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod uploads;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, Settings};
use crate::core_state::{CoreError, CoreState};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load settings, build the shared state and serve until Ctrl-C.
///
/// Blocking HTTP clients are created and dropped outside the async runtime.
pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = Settings::from_env()?;
    let bind_addr = settings.bind_addr;
    let core = Arc::new(CoreState::build(settings)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(core.clone(), bind_addr))?;
    drop(runtime);
    drop(core);
    Ok(())
}
