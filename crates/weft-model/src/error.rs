//! Error taxonomy for model-capability calls.

use thiserror::Error;

/// Errors surfaced by a model capability.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompletionError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error: {0}")]
    Api(String),
}

impl CompletionError {
    /// Stable error-kind label for trace metadata and exports.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Authentication(_) => "authentication",
            CompletionError::InvalidRequest(_) => "invalid_request",
            CompletionError::RateLimit(_) => "rate_limit",
            CompletionError::Timeout(_) => "timeout",
            CompletionError::Api(_) => "api",
        }
    }

    /// Whether a retry could plausibly succeed. Rate-limit and timeout
    /// kinds are transient; generic API errors are sniffed for transient
    /// wording. Authentication and invalid-request failures never retry.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::RateLimit(_) | CompletionError::Timeout(_) => true,
            CompletionError::Api(message) => {
                let text = message.to_lowercase();
                text.contains("timeout")
                    || text.contains("timed out")
                    || text.contains("rate limit")
                    || text.contains("too many requests")
                    || text.contains("overloaded")
                    || text.contains("temporarily unavailable")
                    || text.contains("503")
                    || text.contains("429")
            }
            _ => false,
        }
    }
}

/// Result type alias for capability operations
pub type CompletionResult<T> = Result<T, CompletionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_and_timeout_are_transient() {
        assert!(CompletionError::RateLimit("slow down".into()).is_transient());
        assert!(CompletionError::Timeout("30s elapsed".into()).is_transient());
    }

    #[test]
    fn test_auth_and_invalid_request_never_retry() {
        assert!(!CompletionError::Authentication("bad key".into()).is_transient());
        assert!(!CompletionError::InvalidRequest("bad schema".into()).is_transient());
    }

    #[test]
    fn test_api_errors_sniffed_for_transience() {
        assert!(CompletionError::Api("upstream 503".into()).is_transient());
        assert!(CompletionError::Api("model overloaded, retry".into()).is_transient());
        assert!(!CompletionError::Api("unknown model name".into()).is_transient());
    }
}
