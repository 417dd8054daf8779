use huddle_database::MessageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid completion response: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
    #[error("failed to deliver bot message: {0}")]
    Delivery(#[from] MessageError),
}
