//! LINE Messaging API integration: webhook signature verification, the
//! inbound event model, and the reply client.

use anyhow::{Context, Result};
use base64::prelude::{Engine, BASE64_STANDARD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::config::LineConfig;

type HmacSha256 = Hmac<Sha256>;

/// Checks the `x-line-signature` header against the raw request body.
///
/// The header carries a base64-encoded HMAC-SHA256 of the body keyed by the
/// channel secret. Malformed base64 and wrong-length digests are treated as
/// verification failures, never as errors.
pub fn verify_signature(channel_secret: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(expected) = BASE64_STANDARD.decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// ── Inbound webhook model ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub destination: String,
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEvent {
    #[serde(rename = "message", rename_all = "camelCase")]
    Message {
        reply_token: ReplyToken,
        message: MessageContent,
        #[serde(default)]
        timestamp: i64,
    },
    /// Follow/unfollow/postback and friends: acknowledged, never replied to.
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum MessageContent {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        id: String,
        text: String,
    },
    #[serde(other)]
    Other,
}

/// One-time reply credential. [`LineClient::reply`] takes it by value, so a
/// token cannot be used for a second dispatch.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ReplyToken(String);

impl ReplyToken {
    #[cfg(test)]
    pub fn for_tests(token: &str) -> Self {
        Self(token.to_string())
    }
}

// ── Outbound messages ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image message with the original also serving as the preview.
    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::Image {
            original_content_url: url.clone(),
            preview_image_url: url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest {
    reply_token: ReplyToken,
    messages: Vec<OutboundMessage>,
}

// ── Reply client ───────────────────────────────────────────────────────────

pub struct LineClient {
    client: reqwest::Client,
    config: LineConfig,
}

impl LineClient {
    pub fn new(config: LineConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Sends one reply for one inbound event, consuming its token.
    ///
    /// LINE accepts between one and five messages per reply call; this bot
    /// sends one (text) or two (text then image).
    pub async fn reply(&self, reply_token: ReplyToken, messages: Vec<OutboundMessage>) -> Result<()> {
        anyhow::ensure!(
            (1..=5).contains(&messages.len()),
            "A reply must carry between 1 and 5 messages, got {}",
            messages.len()
        );

        let url = format!("{}/v2/bot/message/reply", self.config.api_base);
        debug!("Sending {} message(s) to LINE reply API", messages.len());

        let request = ReplyRequest {
            reply_token,
            messages,
        };

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.channel_access_token),
            )
            .json(&request)
            .send()
            .await
            .context("Failed to send reply to LINE")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("LINE reply API error ({}): {}", status, error_body);
        }

        Ok(())
    }
}
