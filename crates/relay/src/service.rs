//! The relay action.

use std::sync::Arc;

use huddle_config::{CompletionFailurePolicy, RelayConfig};
use huddle_database::ChatMessage;
use serde::Serialize;
use tracing::{info, warn};

use crate::completion::{CompletionMessage, CompletionProvider, CompletionRequest};
use crate::error::RelayError;
use crate::sink::MessageSink;

pub const SYSTEM_PROMPT: &str =
    "You are a terse bot in a group chat responding to questions with 2-sentence answers";

pub const FALLBACK_REPLY: &str = "I'm sorry, I don't understand that";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayOutcome {
    pub message: ChatMessage,
    pub used_fallback: bool,
}

#[derive(Clone)]
pub struct RelayService {
    provider: Arc<dyn CompletionProvider>,
    sink: Arc<dyn MessageSink>,
    model: String,
    on_completion_failure: CompletionFailurePolicy,
}

impl RelayService {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        sink: Arc<dyn MessageSink>,
        config: &RelayConfig,
    ) -> Self {
        Self {
            provider,
            sink,
            model: config.model.clone(),
            on_completion_failure: config.on_completion_failure,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the provider for a reply to `message_body` and post it into the
    /// conversation as the bot. Exactly one message is delivered on success.
    pub async fn relay_message(
        &self,
        message_body: &str,
        conversation_id: &str,
    ) -> Result<RelayOutcome, RelayError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                CompletionMessage::system(SYSTEM_PROMPT),
                CompletionMessage::user(message_body),
            ],
        };

        let reply = match self.provider.complete(request).await {
            Ok(response) => response
                .content
                .filter(|content| !content.trim().is_empty()),
            Err(err) => match self.on_completion_failure {
                CompletionFailurePolicy::Fallback => {
                    warn!(
                        %conversation_id,
                        provider = self.provider.name(),
                        error = %err,
                        "completion failed, posting fallback reply"
                    );
                    None
                }
                CompletionFailurePolicy::Propagate => return Err(err.into()),
            },
        };

        let used_fallback = reply.is_none();
        let content = reply.unwrap_or_else(|| FALLBACK_REPLY.to_string());

        let message = self.sink.send_bot_message(conversation_id, &content).await?;
        info!(%conversation_id, used_fallback, "relayed bot reply");

        Ok(RelayOutcome {
            message,
            used_fallback,
        })
    }
}
