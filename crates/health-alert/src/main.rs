use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use health_alert::{
    config::Config,
    server::Server,
    sinks::{HttpTransport, SlackNotifier},
    sources::HealthAlertHandler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("health_alert=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::load().context("loading configuration")?;
    info!("Loaded configuration for server at {}", config.server.addr);

    let transport = Arc::new(HttpTransport::new()?);
    let notifier = Arc::new(SlackNotifier::new(config.slack.clone(), transport));
    let handler =
        Arc::new(HealthAlertHandler::new(notifier).context("building alert handler")?);

    let server = Server::new(handler);

    info!("Starting server on {}", config.server.addr);
    server
        .start(&config.server.addr)
        .await
        .with_context(|| format!("serving on {}", config.server.addr))?;

    Ok(())
}
