//! Chat relay: forwards a chat message to a completion provider and posts the
//! reply back into the conversation as the bot.

pub mod completion;
pub mod error;
pub mod service;
pub mod sink;

pub use completion::{
    CompletionMessage, CompletionProvider, CompletionRequest, CompletionResponse,
    OpenAiCompletionProvider,
};
pub use error::{CompletionError, RelayError};
pub use service::{RelayOutcome, RelayService, FALLBACK_REPLY, SYSTEM_PROMPT};
pub use sink::MessageSink;
