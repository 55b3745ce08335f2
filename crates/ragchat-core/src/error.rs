use thiserror::Error;

/// The one failure the chat transport can produce.
///
/// Network errors, non-success statuses and undecodable bodies all collapse
/// into this; callers only ever show a fixed message for it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("chat request failed: {message}")]
pub struct RequestError {
    message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::new(format!("invalid response body: {err}"))
        } else {
            Self::new(err.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for RequestError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(format!("request task ended abnormally: {err}"))
    }
}
