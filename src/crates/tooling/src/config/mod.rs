//! Environment-driven configuration helpers
//!
//! Typed accessors over `std::env` used by the configuration loaders of the
//! other crates, plus `${VAR}` placeholder expansion for values read from
//! TOML files.
//!
//! # Example
//!
//! ```rust,ignore
//! use tooling::config::{get_env_non_empty, get_env_parse};
//!
//! let model = get_env_non_empty("ORION_MODEL")?;
//! let backoff: Option<u64> = get_env_parse("ORION_BACKOFF_SECS")?;
//! ```

mod env;

pub use env::{expand_env_placeholders, get_env, get_env_bool, get_env_non_empty, get_env_parse};
