//! Text translation through Google's public translate endpoint

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::{guarded, ToolError, ToolResult};
use crate::config::TranslateConfig;

#[derive(Clone)]
pub struct TranslateProvider {
    client: Client,
    config: TranslateConfig,
    timeout: Duration,
}

impl TranslateProvider {
    pub fn new(client: Client, config: TranslateConfig, timeout: Duration) -> Self {
        Self {
            client,
            config,
            timeout,
        }
    }

    pub fn default_target(&self) -> &str {
        &self.config.default_target
    }

    /// Translate `text` into `target`, detecting the source language
    ///
    /// A blank `target` uses the configured default.
    pub async fn translate(&self, text: &str, target: &str) -> ToolResult<String> {
        let target = if target.trim().is_empty() {
            self.config.default_target.as_str()
        } else {
            target.trim()
        };

        guarded("translate.single", self.timeout, async {
            let body: Value = self
                .client
                .get(&self.config.base_url)
                .query(&[
                    ("client", "gtx"),
                    ("sl", "auto"),
                    ("tl", target),
                    ("dt", "t"),
                    ("q", text),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            parse_translation(&body)
        })
        .await
    }
}

/// Concatenate the translated segments of a `translate_a/single` response
///
/// The body is `[[["translated", "original", ...], ...], ...]`.
fn parse_translation(body: &Value) -> ToolResult<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::InvalidResponse("missing translation segments".into()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        return Err(ToolError::InvalidResponse("empty translation".into()));
    }
    Ok(text)
}
