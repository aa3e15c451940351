/// Common error type for every backend, storage and session operation.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error {status}: {body}")]
    BadResponse { status: u16, body: String },

    #[error("Response has no readable body")]
    MissingBody,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Not ready: {0}")]
    NotReady(&'static str),

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChatError {
    pub fn bad_response(status: u16, body: impl Into<String>) -> Self {
        Self::BadResponse {
            status,
            body: body.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            ChatError::bad_response(status.as_u16(), err.to_string())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::MalformedPayload(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
