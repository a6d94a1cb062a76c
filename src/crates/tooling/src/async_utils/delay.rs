//! Delay abstraction for retry backoff
//!
//! Retry loops never call a timer directly. They await a [`Delay`], so the
//! host decides how a pause is scheduled: the default [`TokioDelay`] parks the
//! current task on tokio's timer without blocking the worker thread, while
//! tests can swap in a recorder that returns immediately.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Something that can suspend the current task for a duration.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Delay backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay that returns immediately and remembers every requested pause.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    requested: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in call order
    pub fn requested(&self) -> Vec<Duration> {
        match self.requested.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        match self.requested.lock() {
            Ok(mut guard) => guard.push(duration),
            Err(poisoned) => poisoned.into_inner().push(duration),
        }
    }
}
