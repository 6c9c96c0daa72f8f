use crate::config::Config;
use crate::error::{ConversionError, TransportError};
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API request
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Build the prompt asking the model to convert `source_code`.
pub fn build_conversion_prompt(source_language: &str, target_language: &str, source_code: &str) -> String {
    format!(
        "Convert the following {} code to {}. Provide ONLY the converted code without any explanations, comments, or markdown formatting:\n\n{}",
        source_language, target_language, source_code
    )
}

/// Client for the remote text-completion endpoint.
///
/// Holds one pooled `reqwest::Client`; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TranslationService {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    retry: RetryConfig,
}

impl TranslationService {
    pub fn new(config: &Config) -> Result<Self> {
        if config.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.anthropic_api_url.clone(),
            api_key: config.anthropic_api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            retry: RetryConfig::conversion(config.max_attempts),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` as a single user message and return the first text block.
    pub async fn complete(&self, prompt: &str) -> Result<String, ConversionError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        with_retry_if(
            &self.retry,
            "Conversion request",
            || self.send(&request),
            ConversionError::is_retryable,
        )
        .await
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<String, ConversionError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response.text().await?;
        debug!("Translation endpoint answered {} ({} bytes)", status, body.len());

        extract_text(&body)
    }
}

/// Pull `content[0].text` out of a Messages API response body.
///
/// A body that is not JSON at all is a transport failure; JSON of the wrong
/// shape is a format failure.
fn extract_text(body: &str) -> Result<String, ConversionError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(TransportError::Body)?;
    let parsed: MessagesResponse = serde_json::from_value(value)
        .map_err(|e| ConversionError::ResponseFormat(format!("unexpected response shape: {}", e)))?;

    parsed
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ConversionError::ResponseFormat("missing content[0].text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn create_test_config(api_url: &str) -> Config {
        Config {
            anthropic_api_key: "test-anthropic-key".to_string(),
            anthropic_api_url: api_url.to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4000,
            request_timeout: Duration::from_secs(5),
            max_attempts: 1,
            api_key: None,
            port: 8080,
        }
    }

    fn create_messages_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [{ "type": "text", "text": text }],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 40, "output_tokens": 12 }
        })
    }

    // ==================== Prompt Tests ====================

    #[test]
    fn test_prompt_format() {
        let prompt = build_conversion_prompt("Python", "Rust", "print(1)");
        assert_eq!(
            prompt,
            "Convert the following Python code to Rust. Provide ONLY the converted code without any explanations, comments, or markdown formatting:\n\nprint(1)"
        );
    }

    #[test]
    fn test_prompt_keeps_source_verbatim() {
        let source = "  def f():\n\treturn \"quoted\" # comment\n";
        let prompt = build_conversion_prompt("Python", "Go", source);
        assert!(prompt.ends_with(source));
    }

    // ==================== Request Serialization Tests ====================

    #[test]
    fn test_request_serialization() {
        let request = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 4000,
            messages: vec![Message {
                role: "user",
                content: "hello",
            }],
        };

        let json = serde_json::to_value(&request).expect("Should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 4000,
                "messages": [{ "role": "user", "content": "hello" }]
            })
        );
    }

    // ==================== Response Parsing Tests ====================

    #[test]
    fn test_extract_text_first_block() {
        let body = r#"{"content": [{"text": "first"}, {"text": "second"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "first");
    }

    #[test]
    fn test_extract_text_empty_content() {
        let err = extract_text(r#"{"content": []}"#).unwrap_err();
        assert!(matches!(err, ConversionError::ResponseFormat(_)));
    }

    #[test]
    fn test_extract_text_missing_text() {
        let err = extract_text(r#"{"content": [{"type": "tool_use"}]}"#).unwrap_err();
        assert!(matches!(err, ConversionError::ResponseFormat(_)));
    }

    #[test]
    fn test_extract_text_empty_text() {
        let err = extract_text(r#"{"content": [{"text": ""}]}"#).unwrap_err();
        assert!(matches!(err, ConversionError::ResponseFormat(_)));
    }

    #[test]
    fn test_extract_text_missing_content() {
        let err = extract_text(r#"{"completion": "x"}"#).unwrap_err();
        assert!(matches!(err, ConversionError::ResponseFormat(_)));
    }

    #[test]
    fn test_extract_text_not_json() {
        let err = extract_text("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Transport(TransportError::Body(_))
        ));
        assert_eq!(err.user_message(), crate::error::TRANSPORT_MESSAGE);
    }

    #[test]
    fn test_extract_text_wrong_types() {
        let err = extract_text(r#"{"content": [{"text": 42}]}"#).unwrap_err();
        assert!(matches!(err, ConversionError::ResponseFormat(_)));
    }

    // ==================== HTTP Tests ====================

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-anthropic-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 4000,
                "messages": [{ "role": "user", "content": "say hi" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_messages_response("hi")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/messages", mock_server.uri()));
        let service = TranslationService::new(&config).unwrap();

        assert_eq!(service.complete("say hi").await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_complete_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = TranslationService::new(&config).unwrap();

        let err = service.complete("x").await.unwrap_err();
        match err {
            ConversionError::Transport(TransportError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid x-api-key");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_messages_response("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&mock_server.uri());
        config.request_timeout = Duration::from_millis(50);
        let service = TranslationService::new(&config).unwrap();

        let err = service.complete("x").await.unwrap_err();
        assert!(matches!(err, ConversionError::Transport(TransportError::Timeout)));
    }

    #[tokio::test]
    async fn test_complete_connection_refused() {
        // Nothing listens on port 9 locally
        let config = create_test_config("http://127.0.0.1:9/v1/messages");
        let service = TranslationService::new(&config).unwrap();

        let err = service.complete("x").await.unwrap_err();
        assert!(matches!(err, ConversionError::Transport(_)));
    }

    #[tokio::test]
    async fn test_complete_malformed_success_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = TranslationService::new(&config).unwrap();

        let err = service.complete("x").await.unwrap_err();
        assert!(matches!(err, ConversionError::ResponseFormat(_)));
    }

    #[tokio::test]
    async fn test_retries_transient_errors_when_enabled() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_messages_response("ok")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&mock_server.uri());
        config.max_attempts = 2;
        let service = TranslationService::new(&config).unwrap();

        assert_eq!(service.complete("x").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_client_errors_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&mock_server.uri());
        config.max_attempts = 3;
        let service = TranslationService::new(&config).unwrap();

        assert!(service.complete("x").await.is_err());
    }

    #[tokio::test]
    async fn test_format_errors_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&mock_server.uri());
        config.max_attempts = 3;
        let service = TranslationService::new(&config).unwrap();

        let err = service.complete("x").await.unwrap_err();
        assert!(matches!(err, ConversionError::ResponseFormat(_)));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&mock_server.uri());
        config.max_attempts = 3;
        let service = TranslationService::new(&config).unwrap();

        let err = service.complete("x").await.unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Transport(TransportError::Body(_))
        ));
        assert_eq!(err.user_message(), crate::error::TRANSPORT_MESSAGE);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = create_test_config("http://127.0.0.1:9");
        config.max_attempts = 0;

        let err = TranslationService::new(&config).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }
}
