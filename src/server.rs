//! Webhook receiver: one route, `POST /callback`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use tracing::{error, info};

use crate::bot::{self, AppState};
use crate::line::{self, WebhookRequest};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .with_state(state)
}

/// Serves the webhook until the process is stopped.
pub async fn run(listener: tokio::net::TcpListener, state: Arc<AppState>) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read local address")?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    let signature = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok());

    match dispatch(&state, signature, &body).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            error!("Webhook error: {:#}", e);
            (StatusCode::BAD_REQUEST, "")
        }
    }
}

/// Verify, parse, then hand each event to the bot in arrival order.
async fn dispatch(state: &AppState, signature: Option<&str>, body: &str) -> Result<()> {
    let signature = signature.context("Missing x-line-signature header")?;

    anyhow::ensure!(
        line::verify_signature(&state.config.line.channel_secret, signature, body.as_bytes()),
        "Signature verification failed"
    );

    let request: WebhookRequest =
        serde_json::from_str(body).context("Failed to parse webhook payload")?;

    for event in request.events {
        bot::handle_event(state, event).await?;
    }

    Ok(())
}
