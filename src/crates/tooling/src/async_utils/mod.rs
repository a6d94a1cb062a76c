//! Async utilities for common async patterns
//!
//! This module provides utilities for working with async operations:
//! - A scheduler-agnostic `Delay` used to wait between attempts
//! - A bounded retry state machine with a fixed backoff
//! - Timeout wrappers
//!
//! # Example
//!
//! ```rust,ignore
//! use tooling::async_utils::delay::TokioDelay;
//! use tooling::async_utils::retry::{retry_bounded, FixedBackoff};
//! use std::time::Duration;
//!
//! let policy = FixedBackoff::new(1, Duration::from_secs(45));
//! let result = retry_bounded(&policy, &TokioDelay, |e: &String| e.contains("429"), || async {
//!     call_model().await
//! })
//! .await;
//! ```

pub mod delay;
pub mod retry;
pub mod timeout;
