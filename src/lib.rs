pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod prediction;

use tracing_subscriber::EnvFilter;

use crate::api::{start_api_server, ApiContext, ServerError};
use crate::config::{AppConfig, ConfigError};
use crate::db::DatabaseError;

/// Startup failures of the service binary.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to open database: {0}")]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Run the service until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    tracing::info!(
        database = %config.database_path.display(),
        predictor = %config.predictor_program,
        script = %config.predictor_script.display(),
        timeout_secs = config.predictor_timeout.as_secs(),
        mail_relay = config.mail_relay_url.is_some(),
        "Configuration loaded"
    );

    let ctx = ApiContext::from_config(&config)?;
    let mut server = start_api_server(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }

    server.shutdown();
    server.stopped().await;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
