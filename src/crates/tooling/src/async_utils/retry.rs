//! Bounded retry with a fixed backoff
//!
//! A retry is modelled as a small state machine:
//!
//! ```text
//! Calling ──ok──────────────────────────────→ Done(value)
//!    │
//!    └─err─┬─ retryable && retries left ──→ Backoff ──→ Calling
//!          └─ otherwise ─────────────────→ Done(error)
//! ```
//!
//! The backoff is a constant pause (no jitter, no growth) and is awaited through
//! a [`Delay`], so the pause never blocks other tasks on the runtime.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::delay::Delay;

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    /// Retries allowed after the first attempt
    pub max_retries: usize,

    /// Pause before every retry
    pub delay: Duration,
}

impl FixedBackoff {
    /// Create a policy allowing `max_retries` retries separated by `delay`
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total number of attempts this policy can make
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Decide the phase that follows a failed attempt (1-indexed)
    pub fn after_failure(&self, attempt: usize, retryable: bool) -> RetryPhase {
        if retryable && attempt <= self.max_retries {
            RetryPhase::Backoff {
                attempt,
                delay: self.delay,
            }
        } else {
            RetryPhase::Done
        }
    }
}

/// What follows a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    /// Waiting before the attempt after `attempt`
    Backoff { attempt: usize, delay: Duration },

    /// No further attempts will be made
    Done,
}

/// Retry state for tracking attempts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Number of attempts made so far
    pub attempts: usize,

    /// Last error message
    pub last_error: Option<String>,
}

impl RetryState {
    /// Create a new retry state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt
    pub fn record_attempt(&mut self, error: Option<String>) {
        self.attempts += 1;
        self.last_error = error;
    }
}

/// Final failure of a bounded retry
#[derive(Debug)]
pub struct RetryError<E> {
    /// Error returned by the last attempt
    pub error: E,

    /// Attempts made before giving up
    pub state: RetryState,
}

impl<E> RetryError<E> {
    /// Whether at least one retry happened before giving up
    pub fn retried(&self) -> bool {
        self.state.attempts > 1
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (after {} attempt(s))", self.error, self.state.attempts)
    }
}

/// Run `operation`, retrying failures that `should_retry` accepts
///
/// At most `policy.max_attempts()` calls are made. Failures rejected by
/// `should_retry` end the run immediately.
pub async fn retry_bounded<F, Fut, T, E, P, D>(
    policy: &FixedBackoff,
    delay: &D,
    should_retry: P,
    mut operation: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
    D: Delay + ?Sized,
{
    let mut state = RetryState::new();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Retry succeeded");
                }
                return Ok(value);
            }
            Err(error) => {
                state.record_attempt(Some(error.to_string()));
                match policy.after_failure(attempt, should_retry(&error)) {
                    RetryPhase::Backoff { delay: pause, .. } => {
                        warn!(
                            attempt,
                            delay_secs = pause.as_secs_f64(),
                            error = %error,
                            "Attempt failed, backing off before retry"
                        );
                        delay.sleep(pause).await;
                        attempt += 1;
                    }
                    RetryPhase::Done => {
                        debug!(attempt, error = %error, "Giving up");
                        return Err(RetryError { error, state });
                    }
                }
            }
        }
    }
}

/// Check whether an error message carries an upstream quota signal
///
/// Matches an HTTP 429 status or the word "quota" in any case.
///
/// # Example
///
/// ```rust
/// use tooling::async_utils::retry::is_rate_limit_message;
///
/// assert!(is_rate_limit_message("429 Too Many Requests"));
/// assert!(is_rate_limit_message("Quota exceeded for metric"));
/// assert!(!is_rate_limit_message("503 Service Unavailable"));
/// ```
pub fn is_rate_limit_message(error_msg: &str) -> bool {
    error_msg.contains("429") || error_msg.to_lowercase().contains("quota")
}
