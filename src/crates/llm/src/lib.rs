//! Hosted language model access for orion.
//!
//! - [`ModelClient`] is the seam between the dispatch engine and any model.
//! - [`remote::GeminiClient`] implements it over Gemini's REST API.
//! - [`RetryingModel`] wraps a client with the single quota-aware retry.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use llm::config::{RemoteLlmConfig, GEMINI_API_BASE};
//! use llm::remote::GeminiClient;
//! use llm::{GenerateRequest, RetryingModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::from_env("GEMINI_API_KEY", GEMINI_API_BASE, "gemini-2.5-flash")?;
//!     let model = RetryingModel::new(Arc::new(GeminiClient::new(config)?));
//!
//!     match model.generate(&GenerateRequest::new("¿Qué es Rust?")).await {
//!         Ok(text) => println!("{}", text),
//!         Err(failure) => eprintln!("{}", failure),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod remote;
pub mod retry;

pub use client::{GenerateRequest, HistoryTurn, ModelClient, Role, UnavailableModel};
pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use retry::{GenerateFailure, RetryingModel, DEFAULT_BACKOFF, MAX_MODEL_ATTEMPTS};
