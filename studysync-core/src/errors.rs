use serde_json::Value;
use thiserror::Error;

pub const CONNECTIVITY_MESSAGE: &str = "Unable to reach the server. Check your connection and try again.";

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received at all.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered outside the 2xx range; `body` is the parsed JSON (or `{}`).
    #[error("http {status}: {body}")]
    Status { status: u16, body: Value },
    /// A 2xx body that did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
}

impl ApiError {
    pub fn status(status: u16, body: Value) -> Self {
        ApiError::Status { status, body }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// `error` wins over `message`, matching how the backend reports failures.
    pub fn server_message(&self) -> Option<&str> {
        let body = self.body()?;
        ["error", "message"]
            .iter()
            .filter_map(|k| body.get(*k))
            .find_map(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Transport(_) => CONNECTIVITY_MESSAGE.to_string(),
            ApiError::Status { .. } => self
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            ApiError::Decode(_) | ApiError::BaseUrl(_) => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {context}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| StoreError::Io { context, source }
    }
}
