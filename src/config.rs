use anyhow::{Context, Result};

/// Process configuration, built once at startup and passed into the
/// request-handling state. All secrets come from the environment; there is
/// no config file and no CLI surface.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub line: LineConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_access_token: String,
    pub channel_secret: String,
    /// Override point for tests and self-hosted proxies.
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub max_tokens: u32,
    /// `Some` enables the recipe-photo reply alongside the text reply.
    pub image: Option<ImageConfig>,
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub model: String,
    pub size: String,
    pub quality: String,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_port() -> u16 {
    8000
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any name → value lookup, so tests don't have to
    /// mutate the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("Missing required environment variable: {name}"))
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {raw}"))?,
            None => default_port(),
        };

        let max_tokens = match lookup("OPENAI_MAX_TOKENS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("Invalid OPENAI_MAX_TOKENS value: {raw}"))?,
            None => default_max_tokens(),
        };

        let image_reply = lookup("IMAGE_REPLY")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let image = image_reply.then(|| ImageConfig {
            model: lookup("IMAGE_MODEL").unwrap_or_else(default_image_model),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
        });

        Ok(Config {
            port,
            line: LineConfig {
                channel_access_token: required("LINE_CHANNEL_ACCESS_TOKEN")?,
                channel_secret: required("LINE_CHANNEL_SECRET")?,
                api_base: lookup("LINE_API_BASE").unwrap_or_else(default_line_api_base),
            },
            openai: OpenAiConfig {
                api_key: required("OPENAI_API_KEY")?,
                base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(default_openai_base_url),
                chat_model: lookup("OPENAI_MODEL").unwrap_or_else(default_chat_model),
                max_tokens,
                image,
            },
        })
    }
}
