//! Quota-aware retry around a [`ModelClient`].
//!
//! A failed call is retried exactly once, and only when the failure looks
//! like a quota signal. The pause before the retry is fixed and is awaited
//! through a [`Delay`], so concurrent requests keep running while one waits.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tooling::async_utils::delay::{Delay, TokioDelay};
use tooling::async_utils::retry::{retry_bounded, FixedBackoff};
use tracing::{info, warn};

use crate::client::{GenerateRequest, ModelClient};
use crate::error::LlmError;

/// Upper bound on upstream calls per generation. Not configurable.
pub const MAX_MODEL_ATTEMPTS: usize = 2;

/// Default pause before the single retry.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(45);

/// Terminal outcome of a failed generation.
#[derive(Debug, Error)]
pub enum GenerateFailure {
    /// The first attempt failed with a non-quota error. No retry was made.
    #[error("{0}")]
    Rejected(LlmError),

    /// The first attempt hit a quota signal and the retry failed too.
    #[error("{0}")]
    RetryExhausted(LlmError),
}

impl GenerateFailure {
    /// The error returned by the last attempt.
    pub fn error(&self) -> &LlmError {
        match self {
            GenerateFailure::Rejected(e) | GenerateFailure::RetryExhausted(e) => e,
        }
    }

    /// Number of upstream calls made before giving up.
    pub fn attempts(&self) -> usize {
        match self {
            GenerateFailure::Rejected(_) => 1,
            GenerateFailure::RetryExhausted(_) => MAX_MODEL_ATTEMPTS,
        }
    }
}

/// Model client wrapper applying the one-retry quota policy.
#[derive(Clone)]
pub struct RetryingModel {
    inner: Arc<dyn ModelClient>,
    delay: Arc<dyn Delay>,
    backoff: Duration,
}

impl RetryingModel {
    /// Wrap `inner` with the default 45 second backoff on tokio's timer.
    pub fn new(inner: Arc<dyn ModelClient>) -> Self {
        Self {
            inner,
            delay: Arc::new(TokioDelay),
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replace the scheduler used for the backoff pause.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    /// Generate a reply, retrying once after the backoff on a quota failure.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateFailure> {
        let policy = FixedBackoff::new(MAX_MODEL_ATTEMPTS - 1, self.backoff);

        let outcome = retry_bounded(
            &policy,
            self.delay.as_ref(),
            LlmError::is_rate_limited,
            || self.inner.generate(request),
        )
        .await;

        match outcome {
            Ok(text) => Ok(text.trim().to_string()),
            Err(failure) if failure.retried() => {
                warn!(
                    model = self.model_name(),
                    attempts = failure.state.attempts,
                    error = %failure.error,
                    "Model still failing after retry"
                );
                Err(GenerateFailure::RetryExhausted(failure.error))
            }
            Err(failure) => {
                info!(model = self.model_name(), error = %failure.error, "Model call rejected");
                Err(GenerateFailure::Rejected(failure.error))
            }
        }
    }
}
