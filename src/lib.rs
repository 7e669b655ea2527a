pub mod api; // HTTP surface
pub mod config;
pub mod leads; // Lead status forwarding
pub mod notify; // Contact notifications
pub mod pipeline; // Site specification generation

use tracing_subscriber::EnvFilter;

use crate::api::{start_server_on, ApiContext, ServerError};
use crate::api::types::ContextError;
use crate::config::{AppConfig, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Start the service and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    let ctx = ApiContext::from_config(&config)?;

    tracing::info!(
        model = %config.model.model,
        email = config.email.is_configured(),
        messaging = config.messaging_webhook_url.is_some(),
        sheets = config.sheets_webhook_url.is_some(),
        "Integrations loaded"
    );

    let mut server = start_server_on(ctx, config.bind_addr, config.cors_origin.as_deref()).await?;
    tracing::info!(
        session_id = %server.session.session_id,
        started_at = %server.session.started_at,
        addr = %server.session.server_addr,
        "Serving until Ctrl-C"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    server.shutdown();
    server.stopped().await;
    Ok(())
}
