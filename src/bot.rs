use anyhow::Result;
use tracing::{error, info};

use crate::config::Config;
use crate::line::{LineClient, MessageContent, OutboundMessage, WebhookEvent};
use crate::llm::OpenAiClient;
use crate::recipe;

/// Shared application state, built once at startup.
pub struct AppState {
    pub config: Config,
    llm: OpenAiClient,
    line: LineClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let llm = OpenAiClient::new(config.openai.clone());
        let line = LineClient::new(config.line.clone());
        Self { config, llm, line }
    }
}

/// Handles one webhook event end to end.
///
/// Generative failures are caught here and turned into the fixed fallback
/// reply, so the one-time token is always spent on a user-visible message.
/// A failure of the reply call itself propagates to the webhook layer.
pub async fn handle_event(state: &AppState, event: WebhookEvent) -> Result<()> {
    let WebhookEvent::Message {
        reply_token,
        message,
        ..
    } = event
    else {
        return Ok(());
    };
    let MessageContent::Text { text, .. } = message else {
        return Ok(());
    };

    info!("Received ingredients: {}", text);

    let messages = match cook_reply(state, &text).await {
        Ok(messages) => messages,
        Err(e) => {
            error!("Recipe generation failed: {:#}", e);
            vec![OutboundMessage::text(recipe::FALLBACK_MESSAGE)]
        }
    };

    state.line.reply(reply_token, messages).await
}

/// Text completion plus the optional image step: [text] or [text, image].
async fn cook_reply(state: &AppState, user_text: &str) -> Result<Vec<OutboundMessage>> {
    let prompt = recipe::recipe_prompt(user_text);
    let recipe_text = state.llm.chat(&prompt).await?;

    let mut messages = vec![OutboundMessage::text(recipe_text.clone())];

    if state.config.openai.image.is_some() {
        let title = recipe::extract_title(&recipe_text);
        info!("Generating recipe photo for: {}", title);
        let url = state.llm.generate_image(&recipe::image_prompt(title)).await?;
        messages.push(OutboundMessage::image(url));
    }

    Ok(messages)
}
