//! # Orion - Intent Dispatch Engine
//!
//! Turns a free-text chat message into one answer: a canned reply, a tool
//! lookup, a rendered chart or a model completion.
//!
//! ## Features
//!
//! - **Intent Classification** - Ordered keyword rules from a swappable language pack
//! - **Capability Providers** - Weather, web search, translation and a safe calculator
//! - **Chart Synthesis** - Bar, line and pie charts from CSV, rendered to PNG
//! - **Quota-Aware Model Calls** - One delayed retry on rate limiting, then a clear failure
//! - **Layered Config** - User-level, project-level, explicit file and environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orion::{DispatchEngine, OrionConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = OrionConfig::default();
//! let engine = DispatchEngine::from_config(&config)?;
//!
//! let reply = engine.handle("calcular: 5 * 8 + 3").await;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Data flows one way: message → [`IntentClassifier`] → provider, chart
//! pipeline or model → [`ResponseEnvelope`]. Every failure along the way is
//! folded into the envelope text, so callers only ever receive an envelope.

pub mod artifacts;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod intent;
pub mod providers;

mod error;

pub use artifacts::{latest_csv, ArtifactStore};
pub use chart::{ChartArtifact, ChartError, ChartKind, ChartPlan, ChartSpec, ChartSynthesizer};
pub use config::{load_config, ConfigLoader, OrionConfig};
pub use dispatch::{DispatchEngine, DispatchEngineBuilder, DispatchRequest, ResponseEnvelope};
pub use intent::{Intent, IntentClassifier, IntentKind, LanguagePack};
pub use providers::{ToolError, ToolResult};

pub use error::{ErrorClass, OrionError, Result};
