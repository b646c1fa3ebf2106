//! Error recovery strategies for calls that leave the process.
//!
//! Only the LLM endpoint is called remotely, so the strategies here are kept
//! to what that call needs: bounded retries with exponential backoff for
//! transient failures, or a single attempt.

use crate::{CoreError, ErrorExt, RetryPolicy};
use std::time::Duration;
use tracing::{info, warn};

/// Recovery strategy for handling errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Retry the operation with exponential backoff
    RetryWithBackoff {
        max_attempts: usize,
        initial_delay: Duration,
        max_delay: Duration,
    },
    /// Run the operation once and propagate any error
    Fail,
}

impl From<&RetryPolicy> for RecoveryStrategy {
    fn from(policy: &RetryPolicy) -> Self {
        if policy.max_attempts <= 1 {
            return RecoveryStrategy::Fail;
        }
        RecoveryStrategy::RetryWithBackoff {
            max_attempts: policy.max_attempts,
            initial_delay: Duration::from_millis(policy.initial_backoff_ms),
            max_delay: Duration::from_millis(policy.max_backoff_ms),
        }
    }
}

/// Result of an error recovery attempt
#[derive(Debug)]
pub enum RecoveryResult<T> {
    /// The operation succeeded, possibly after retries
    Recovered(T),
    /// Recovery failed, error should be propagated
    Failed(CoreError),
}

impl<T> RecoveryResult<T> {
    pub fn into_result(self) -> Result<T, CoreError> {
        match self {
            RecoveryResult::Recovered(value) => Ok(value),
            RecoveryResult::Failed(error) => Err(error),
        }
    }
}

pub struct ErrorRecovery;

impl ErrorRecovery {
    /// Apply the recovery strategy to an operation
    pub async fn apply_strategy<F, T, Fut>(
        strategy: RecoveryStrategy,
        mut operation: F,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>> + Send,
        T: Send,
    {
        match strategy {
            RecoveryStrategy::RetryWithBackoff {
                max_attempts,
                initial_delay,
                max_delay,
            } => Self::retry_with_backoff(operation, max_attempts, initial_delay, max_delay).await,
            RecoveryStrategy::Fail => match operation().await {
                Ok(value) => RecoveryResult::Recovered(value),
                Err(error) => RecoveryResult::Failed(error),
            },
        }
    }

    async fn retry_with_backoff<F, T, Fut>(
        mut operation: F,
        max_attempts: usize,
        initial_delay: Duration,
        max_delay: Duration,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>> + Send,
        T: Send,
    {
        if max_attempts == 0 {
            return RecoveryResult::Failed(CoreError::Internal {
                message: "retry strategy configured with zero attempts".to_string(),
            });
        }

        let mut attempt = 0;
        let mut delay = initial_delay;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Operation succeeded after {} retries", attempt);
                    }
                    return RecoveryResult::Recovered(result);
                }
                Err(error) => {
                    attempt += 1;

                    if attempt >= max_attempts || !error.is_retryable() {
                        return RecoveryResult::Failed(error);
                    }

                    // A server-provided hint may only lengthen the wait.
                    if let Some(hint) = error.retry_after() {
                        delay = delay.max(hint);
                    }
                    delay = delay.min(max_delay);

                    warn!(
                        "Attempt {}/{} failed. Retrying after {:?}: {}",
                        attempt,
                        max_attempts,
                        delay,
                        error.user_friendly_message()
                    );

                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(delay * 2, max_delay);
                }
            }
        }
    }
}
