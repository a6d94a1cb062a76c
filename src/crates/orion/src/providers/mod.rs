//! Capability providers
//!
//! Each provider makes at most one outbound call under a short deadline and
//! returns a [`ToolResult`]. They hold no state besides a shared HTTP client
//! and their configuration, so one [`Providers`] value serves every request.

pub mod calculate;
pub mod search;
pub mod translate;
pub mod weather;

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tooling::async_utils::timeout::{with_timeout, TimeoutError};
use tooling::logging::timed;

use crate::config::ProvidersConfig;
use crate::error::{ErrorClass, OrionError, Result};

pub use calculate::{calculate, format_number};
pub use search::SearchProvider;
pub use translate::TranslateProvider;
pub use weather::{WeatherProvider, WeatherReport};

/// Result of one provider call
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Why a provider call failed
///
/// Display output is the bare underlying reason so it can be appended to a
/// reply prefix verbatim.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Input refused before any evaluation
    #[error("{0}")]
    InputRejected(String),

    /// Input accepted but could not be evaluated
    #[error("{0}")]
    Evaluation(String),

    /// Transport or HTTP status failure
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The deadline elapsed
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream answered with something unusable
    #[error("{0}")]
    InvalidResponse(String),
}

impl ToolError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ToolError::InputRejected(_) => ErrorClass::InputRejected,
            ToolError::Evaluation(_) => ErrorClass::DataError,
            ToolError::Http(_) | ToolError::Timeout(_) | ToolError::InvalidResponse(_) => {
                ErrorClass::UpstreamUnavailable
            }
        }
    }
}

impl From<TimeoutError<ToolError>> for ToolError {
    fn from(err: TimeoutError<ToolError>) -> Self {
        match err {
            TimeoutError::OperationFailed(e) => e,
            TimeoutError::Timeout(d) => ToolError::Timeout(d),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidResponse(err.to_string())
    }
}

/// Run an outbound call under `deadline` and log its duration
pub(crate) async fn guarded<T, F>(name: &str, deadline: Duration, call: F) -> ToolResult<T>
where
    F: Future<Output = ToolResult<T>>,
{
    timed(name, with_timeout(deadline, call))
        .await
        .map_err(ToolError::from)
}

/// All network-backed providers sharing one HTTP client
#[derive(Clone)]
pub struct Providers {
    pub weather: WeatherProvider,
    pub search: SearchProvider,
    pub translate: TranslateProvider,
}

impl Providers {
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("orion/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OrionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            weather: WeatherProvider::new(client.clone(), config.weather.clone(), timeout),
            search: SearchProvider::new(client.clone(), config.search.clone(), timeout),
            translate: TranslateProvider::new(client, config.translate.clone(), timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        assert_eq!(
            ToolError::InputRejected("x".into()).class(),
            ErrorClass::InputRejected
        );
        assert_eq!(ToolError::Evaluation("x".into()).class(), ErrorClass::DataError);
        assert_eq!(
            ToolError::Timeout(Duration::from_secs(3)).class(),
            ErrorClass::UpstreamUnavailable
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_guarded_times_out() {
        let result: ToolResult<()> = guarded("slow", Duration::from_secs(3), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ToolError::Timeout(d)) if d == Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_guarded_passes_inner_error_through() {
        let result: ToolResult<()> = guarded("bad", Duration::from_secs(3), async {
            Err(ToolError::InvalidResponse("not json".into()))
        })
        .await;

        assert_eq!(result.unwrap_err().to_string(), "not json");
    }
}
