//! Error types for remote calls

use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("request failed with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    /// Request never completed (offline, CORS, DNS)
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Client is misconfigured (bad base URL, missing token)
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Text for the error banner: the server's own message when it sent
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Http { message: Some(message), .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http { status: 404, .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Http {
            status: 403,
            message: Some("You are not a member of this project".into()),
        };
        assert_eq!(err.user_message("Failed"), "You are not a member of this project");
        assert_eq!(ApiError::Network("offline".into()).user_message("Failed"), "Failed");
        let blank = ApiError::Http { status: 500, message: Some(" ".into()) };
        assert_eq!(blank.user_message("Failed"), "Failed");
    }

    #[test]
    fn test_display() {
        let err = ApiError::Http { status: 404, message: None };
        assert_eq!(err.to_string(), "request failed with status 404: no message");
        assert!(err.is_not_found());
    }
}
