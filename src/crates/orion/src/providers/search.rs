//! Web search through the DuckDuckGo instant answer API

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{guarded, ToolError, ToolResult};
use crate::config::SearchConfig;

const MAX_RELATED: usize = 3;

#[derive(Clone)]
pub struct SearchProvider {
    client: Client,
    config: SearchConfig,
    timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Abstract", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Default, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: Option<String>,
}

impl SearchProvider {
    pub fn new(client: Client, config: SearchConfig, timeout: Duration) -> Self {
        Self {
            client,
            config,
            timeout,
        }
    }

    /// Best short answer for `query`, or `None` when nothing relevant exists
    pub async fn search(&self, query: &str) -> ToolResult<Option<String>> {
        guarded("search.instant_answer", self.timeout, async {
            // The API answers with a javascript content type, so parse the body by hand
            let body = self
                .client
                .get(&self.config.base_url)
                .query(&[
                    ("q", query),
                    ("format", "json"),
                    ("no_html", "1"),
                    ("skip_disambig", "1"),
                ])
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;

            let answer: InstantAnswer = serde_json::from_str(&body)?;
            Ok::<_, ToolError>(summarize(answer))
        })
        .await
    }
}

/// The abstract if present, else up to three related topic texts
fn summarize(answer: InstantAnswer) -> Option<String> {
    let abstract_text = answer.abstract_text.trim();
    if !abstract_text.is_empty() {
        return Some(abstract_text.to_string());
    }

    let related: Vec<String> = answer
        .related_topics
        .into_iter()
        .filter_map(|t| t.text)
        .filter(|t| !t.trim().is_empty())
        .take(MAX_RELATED)
        .collect();

    (!related.is_empty()).then(|| related.join("\n"))
}
