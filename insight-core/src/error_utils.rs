use crate::error::*;
use std::time::Duration;
use tracing::error;

/// Wait used for transient failures that carry no server hint.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("{}", self);
        match self {
            CoreError::Llm(e) => error!("LLM error details: {:?}", e),
            CoreError::Export(e) => error!("Export error details: {:?}", e),
            CoreError::Upload(e) => error!("Upload error details: {:?}", e),
            _ => {}
        }
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Llm(e) => e.is_retryable(),
            CoreError::Network(e) => e.is_timeout() || e.is_connect(),
            CoreError::RequestFailed { status_code, .. } => {
                matches!(status_code, Some(408) | Some(500..=599))
            }
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::Llm(e) => e.retry_after(),
            _ if self.is_retryable() => Some(DEFAULT_RETRY_DELAY),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Network(_) => "Could not reach the LLM endpoint.".to_string(),
            other => other.to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimitExceeded { .. }
                | LlmError::ServiceUnavailable { .. }
                | LlmError::RequestTimeout { .. }
        )
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimitExceeded { retry_after, .. } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ if self.is_retryable() => Some(DEFAULT_RETRY_DELAY),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::InvalidApiKey { provider } => format!(
                "No usable API key for {provider}; set OPENROUTER_API_KEY or OPENAI_API_KEY."
            ),
            LlmError::RateLimitExceeded {
                provider,
                retry_after,
            } => format!("{provider} is rate limiting requests (retry in {retry_after}s)."),
            LlmError::ServiceUnavailable {
                provider,
                status_code,
            } => format!("{provider} answered {status_code}; it may be overloaded."),
            LlmError::RequestTimeout { provider } => {
                format!("{provider} did not answer before the timeout.")
            }
            other => other.to_string(),
        }
    }
}
