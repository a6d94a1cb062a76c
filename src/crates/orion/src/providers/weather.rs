//! Current weather from Open-Meteo

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{guarded, ToolError, ToolResult};
use crate::config::WeatherConfig;

/// Current conditions for the configured location
///
/// A field the upstream did not return is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Clone)]
pub struct WeatherProvider {
    client: Client,
    config: WeatherConfig,
    timeout: Duration,
}

impl WeatherProvider {
    pub fn new(client: Client, config: WeatherConfig, timeout: Duration) -> Self {
        Self {
            client,
            config,
            timeout,
        }
    }

    pub fn city(&self) -> &str {
        &self.config.city
    }

    pub async fn current(&self) -> ToolResult<WeatherReport> {
        guarded("weather.current", self.timeout, async {
            let body: Value = self
                .client
                .get(&self.config.base_url)
                .query(&[
                    ("latitude", self.config.latitude.to_string()),
                    ("longitude", self.config.longitude.to_string()),
                    ("current_weather", "true".to_string()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            Ok::<_, ToolError>(parse_report(&self.config.city, &body))
        })
        .await
    }
}

fn parse_report(city: &str, body: &Value) -> WeatherReport {
    let current = body.get("current_weather");
    let field = |name: &str| current.and_then(|c| c.get(name)).and_then(Value::as_f64);

    WeatherReport {
        city: city.to_string(),
        temperature: field("temperature"),
        wind_speed: field("windspeed"),
    }
}
