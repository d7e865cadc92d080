//! Failure kinds of the two outbound backends.

use thiserror::Error;

use crate::util::FALLBACK_MODE_MESSAGE;

/// Generation backend failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenError {
    #[error("generation API key is not configured")]
    MissingApiKey,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limit or quota exceeded")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("model returned no response")]
    EmptyResponse,
}

impl GenError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Transient failures worth one more attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Network(_) | Self::RateLimited | Self::Unavailable(_)
        )
    }

    /// Text shown to the user in place of a model reply.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => FALLBACK_MODE_MESSAGE.to_string(),
            Self::Auth(_) => "⚠️ The AI service rejected our credentials. \
                Please check GENERATION_API_KEY and try again."
                .to_string(),
            Self::RateLimited => "⚠️ The AI service is busy right now (rate limit or quota reached). \
                Please try again in a moment."
                .to_string(),
            Self::Timeout => {
                "⚠️ The AI service took too long to respond. Please try again.".to_string()
            }
            Self::EmptyResponse => "⚠️ The AI service returned no response.".to_string(),
            other => format!("⚠️ Error connecting to the AI service: {other}"),
        }
    }
}

/// Search backend failure. Never shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search API key is not configured")]
    MissingApiKey,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("search API error ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl SearchError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(GenError::Timeout.is_retryable());
        assert!(GenError::RateLimited.is_retryable());
        assert!(GenError::Network("reset".into()).is_retryable());
        assert!(!GenError::Auth("bad key".into()).is_retryable());
        assert!(!GenError::InvalidRequest("bad".into()).is_retryable());
        assert!(!GenError::MissingApiKey.is_retryable());
    }

    #[test]
    fn user_messages_are_non_empty() {
        let errors = [
            GenError::MissingApiKey,
            GenError::Auth("401".into()),
            GenError::RateLimited,
            GenError::Timeout,
            GenError::Network("dns".into()),
            GenError::InvalidRequest("400".into()),
            GenError::Unavailable("503".into()),
            GenError::Parse("eof".into()),
            GenError::EmptyResponse,
        ];
        for err in errors {
            assert!(!err.user_message().trim().is_empty(), "{err:?}");
        }
    }

    #[test]
    fn missing_key_reports_fallback_mode() {
        assert!(GenError::MissingApiKey.user_message().contains("fallback mode"));
    }

    #[test]
    fn timeout_detection() {
        assert!(SearchError::Timeout.is_timeout());
        assert!(!SearchError::RateLimited.is_timeout());
        assert!(GenError::Timeout.is_timeout());
    }
}
