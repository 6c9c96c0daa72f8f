use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

#[derive(Debug, Clone)]
pub struct Config {
    // Translation endpoint
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub model: String,
    pub max_tokens: u32,

    // Request behaviour
    pub request_timeout: Duration,
    pub max_attempts: u32,

    // Server
    pub api_key: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let max_attempts = std::env::var("CONVERT_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        if max_attempts == 0 {
            bail!("CONVERT_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            // Translation endpoint
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .context("ANTHROPIC_API_KEY not set")?,
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            model: std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tokens: std::env::var("MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),

            // Request behaviour
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            ),
            max_attempts,

            // Server (empty API_KEY means the API is open)
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}
