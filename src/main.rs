use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipeline::bot::AppState;
use recipeline::config::Config;
use recipeline::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from the environment
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Configuration loaded");
    info!("  Model: {}", config.openai.chat_model);
    info!(
        "  Image reply: {}",
        config
            .openai
            .image
            .as_ref()
            .map(|i| i.model.as_str())
            .unwrap_or("disabled")
    );
    info!("  Port: {}", config.port);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    let state = Arc::new(AppState::new(config));

    info!("Bot is starting...");
    server::run(listener, state).await?;

    Ok(())
}
