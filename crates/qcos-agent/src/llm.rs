use std::time::Duration;

use async_trait::async_trait;
use qcos_core::{LlmConfig, QcosError};
use serde::{Deserialize, Serialize};

use crate::prompt;

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use qcos_agent::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("Rewrite this file");
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use qcos_agent::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// Per-call knobs for [`TextCompletionService::complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Ask the provider for a JSON object instead of free text.
    pub json_response: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            json_response: false,
        }
    }
}

/// A generative text backend.
///
/// Consumers receive an implementation by injection (usually an
/// `Arc<dyn TextCompletionService>`), which lets tests substitute a canned
/// responder for the HTTP client.
#[async_trait]
pub trait TextCompletionService: Send + Sync {
    /// Model identifier, for reporting.
    fn model(&self) -> &str;

    /// Complete `prompt` under `system_instruction` and return the raw text.
    async fn complete(
        &self,
        prompt: &str,
        system_instruction: &str,
        options: &CompletionOptions,
    ) -> Result<String, QcosError>;

    /// Complete `prompt` and parse the answer as JSON conforming to `schema`.
    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, QcosError>;
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes the `/v1/chat/completions` endpoint.
/// Requests rejected with HTTP 429 are retried with exponential backoff.
///
/// # Examples
///
/// ```
/// use qcos_core::LlmConfig;
/// use qcos_agent::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QcosError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, QcosError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QcosError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Send a chat completion request and return the text of the first choice.
    ///
    /// # Errors
    ///
    /// Returns [`QcosError::RateLimited`] once retries are exhausted on HTTP
    /// 429, and [`QcosError::Llm`] on other HTTP errors, empty content, or
    /// an unexpected response shape.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        response_format: Option<serde_json::Value>,
    ) -> Result<String, QcosError> {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": temperature,
        });
        if let Some(format) = response_format {
            body["response_format"] = format;
        }

        let mut attempt = 0u32;
        loop {
            match self.send(&body).await {
                Err(QcosError::RateLimited(detail)) if attempt < self.config.max_retries => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited by completion API, retrying: {detail}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.config.retry_base_ms.saturating_mul(factor))
    }

    async fn send(&self, body: &serde_json::Value) -> Result<String, QcosError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com")
            .trim_end_matches('/');
        let url = format!("{base_url}/v1/chat/completions");

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        tracing::debug!(model = %self.config.model, %url, "sending completion request");
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| QcosError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body_text = response.text().await.unwrap_or_default();
            return Err(QcosError::RateLimited(format!("{status}: {body_text}")));
        }
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(QcosError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| QcosError::Llm(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                QcosError::Llm(format!("unexpected response structure: {response_body}"))
            })?;

        if content.trim().is_empty() {
            return Err(QcosError::Llm("received an empty response from the model".into()));
        }

        Ok(content.to_string())
    }
}

#[async_trait]
impl TextCompletionService for LlmClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        prompt: &str,
        system_instruction: &str,
        options: &CompletionOptions,
    ) -> Result<String, QcosError> {
        let messages = [
            ChatMessage::system(system_instruction),
            ChatMessage::user(prompt),
        ];
        let format = options
            .json_response
            .then(|| serde_json::json!({ "type": "json_object" }));
        self.chat(&messages, options.temperature, format).await
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, QcosError> {
        let messages = [
            ChatMessage::system(prompt::STRUCTURED_SYSTEM_INSTRUCTION),
            ChatMessage::user(prompt),
        ];
        let format = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": "structured_response",
                "schema": schema,
            },
        });
        let text = self
            .chat(&messages, CompletionOptions::default().temperature, Some(format))
            .await?;
        prompt::parse_json_response(&text)
    }
}
