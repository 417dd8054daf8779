//! Completion provider seam and the OpenAI-compatible implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use huddle_config::RelayConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CompletionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

impl CompletionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a `chat/completions` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
}

/// The first choice's text, if the provider returned one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: Option<String>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, CompletionError>;

    fn name(&self) -> &'static str;
}

/// Talks to `{base_url}/chat/completions` on any OpenAI-compatible endpoint.
pub struct OpenAiCompletionProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompletionProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, CompletionError> {
        Self::new(
            config.base_url.clone(),
            config.resolved_api_key(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    #[serde(default)]
    choices: Vec<ChoiceRaw>,
}

#[derive(Debug, Deserialize)]
struct ChoiceRaw {
    message: ChoiceMessageRaw,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessageRaw {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let start = Instant::now();

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(error = %err, "completion request failed");
            CompletionError::Http(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "completion provider error");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponseRaw =
            serde_json::from_str(&body).map_err(|err| CompletionError::Parse(err.to_string()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "chat completion"
        );

        Ok(CompletionResponse {
            content: parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content),
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialises_in_wire_format() {
        let request = CompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![CompletionMessage::system("be brief"), CompletionMessage::user("hi")],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ]
            })
        );
    }

    #[test]
    fn missing_choices_and_null_content_parse_as_absent() {
        let empty: ChatResponseRaw = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(empty.choices.is_empty());

        let null_content: ChatResponseRaw =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#)
                .unwrap();
        assert!(null_content.choices[0].message.content.is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider =
            OpenAiCompletionProvider::new("http://localhost:9999/v1/", None, Duration::from_secs(1))
                .unwrap();

        assert_eq!(provider.base_url, "http://localhost:9999/v1");
        assert!(!provider.has_api_key());
    }
}
