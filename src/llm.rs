//! OpenAI client: chat completions for the recipe text, image generation for
//! the optional recipe photo.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OpenAiConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: String,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// One-shot completion: a single user message, first choice's content,
    /// trimmed of surrounding whitespace.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!("Sending completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to send completion request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion API error ({}): {}", status, error_body);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Completion response contained no choices")?;

        Ok(content.trim().to_string())
    }

    /// Requests one square image and returns its URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let image = self
            .config
            .image
            .as_ref()
            .context("Image generation is not configured")?;

        let request = ImageRequest {
            model: image.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: image.size.clone(),
            quality: image.quality.clone(),
        };

        let url = format!("{}/images/generations", self.config.base_url);
        debug!("Sending image request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to send image request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Image API error ({}): {}", status, error_body);
        }

        let image_response: ImageResponse = response
            .json()
            .await
            .context("Failed to parse image response")?;

        image_response
            .data
            .into_iter()
            .next()
            .map(|d| d.url)
            .context("Image response contained no entries")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageConfig;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String, image: Option<ImageConfig>) -> OpenAiConfig {
        OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url,
            chat_model: "gpt-4o".to_string(),
            max_tokens: 1024,
            image,
        }
    }

    fn image_config() -> ImageConfig {
        ImageConfig {
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
        }
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": "prompt here"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "  レシピ名: 卵炒め\n材料: 卵\n作り方: 炒める \n"}},
                    {"message": {"role": "assistant", "content": "second choice, ignored"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(test_config(server.uri(), None));
        let reply = client.chat("prompt here").await.unwrap();
        assert_eq!(reply, "レシピ名: 卵炒め\n材料: 卵\n作り方: 炒める");
    }

    #[tokio::test]
    async fn test_chat_error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string(r#"{"error": "rate limited"}"#),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::new(test_config(server.uri(), None));
        let err = client.chat("prompt").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_chat_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::new(test_config(server.uri(), None));
        assert!(client.chat("prompt").await.is_err());
    }

    #[tokio::test]
    async fn test_generate_image_returns_first_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(serde_json::json!({
                "model": "dall-e-3",
                "prompt": "卵炒めのフォトリアリスティックなイラスト",
                "n": 1,
                "size": "1024x1024",
                "quality": "standard"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": 1700000000,
                "data": [{"url": "https://img.example/generated.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(test_config(server.uri(), Some(image_config())));
        let url = client
            .generate_image("卵炒めのフォトリアリスティックなイラスト")
            .await
            .unwrap();
        assert_eq!(url, "https://img.example/generated.png");
    }

    #[tokio::test]
    async fn test_generate_image_without_config_is_an_error() {
        let client = OpenAiClient::new(test_config("http://127.0.0.1:9".to_string(), None));
        let err = client.generate_image("anything").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
