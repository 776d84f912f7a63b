//! Gateway error types.
//!
//! Every way a single assistant turn can fail has a named variant. None of
//! them is fatal to the session.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API key not found: set the {env_var} environment variable")]
    MissingCredential { env_var: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Authentication failed (check the API key)")]
    AuthFailed,

    #[error("Rate limited by the assistant service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Assistant service error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed assistant response: {0}")]
    MalformedResponse(String),

    #[error("Assistant returned an empty answer")]
    EmptyAnswer,

    #[error("Assistant did not answer within {}s", .0.as_secs())]
    Timeout(Duration),
}

impl GatewayError {
    /// Whether resubmitting the same message may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport(_)
                | GatewayError::RateLimited { .. }
                | GatewayError::Server { .. }
                | GatewayError::Timeout(_)
        )
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_reports_seconds() {
        let err = GatewayError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Assistant did not answer within 30s");
    }

    #[test]
    fn auth_failures_are_not_retryable() {
        assert!(!GatewayError::AuthFailed.is_retryable());
        assert!(GatewayError::RateLimited { retry_after_secs: 5 }.is_retryable());
        assert!(GatewayError::Timeout(Duration::from_secs(1)).is_retryable());
    }
}
