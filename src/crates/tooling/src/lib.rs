//! Tooling utilities and helpers for orion
//!
//! This crate provides the ambient functionality shared by the `llm` and
//! `orion` crates.
//!
//! # Modules
//!
//! - `async_utils` - Delay abstraction, bounded retry state machine and timeouts
//! - `config` - Environment variable loading helpers
//! - `logging` - Subscriber setup, timing helpers and log sanitizing

pub mod async_utils;
pub mod config;
pub mod logging;

use thiserror::Error;

/// Errors that can occur in the tooling crate
#[derive(Debug, Error)]
pub enum ToolingError {
    /// General error with message
    #[error("Tooling error: {0}")]
    General(String),
}

/// Result type for tooling operations
pub type Result<T> = std::result::Result<T, ToolingError>;
