//! Encyclopedia lookup tool backed by the MediaWiki API

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::impl_tool_factory;
use crate::tools::{Tool, ToolCall, ToolResult};

/// How many articles a lookup returns
const TOP_K_RESULTS: usize = 2;

/// Maximum characters of extract text per article
const EXTRACT_CHAR_MAX: usize = 500;

const API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Tool for querying Wikipedia
pub struct WikiLookupTool {
    client: reqwest::Client,
}

impl WikiLookupTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(concat!("delve/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for WikiLookupTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WikiLookupTool {
    fn name(&self) -> &str {
        "wiki_lookup"
    }

    fn description(&self) -> &str {
        "Query Wikipedia for concise, reliable background information on a topic."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The topic to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let query: String = call.get_parameter("query")?;

        debug!(query = %query, "Querying Wikipedia");
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("exintro", "1"),
                ("generator", "search"),
                ("gsrsearch", query.as_str()),
                ("gsrlimit", &TOP_K_RESULTS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                name: "wiki_lookup".to_string(),
                message: format!("Wikipedia request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                name: "wiki_lookup".to_string(),
                message: format!("Wikipedia returned status: {}", response.status()),
            }
            .into());
        }

        let body: WikiQueryResponse =
            response
                .json()
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    name: "wiki_lookup".to_string(),
                    message: format!("Failed to parse Wikipedia response: {}", e),
                })?;

        let content = format_pages(&query, body);
        Ok(ToolResult::success(call.id, content))
    }
}

fn format_pages(query: &str, body: WikiQueryResponse) -> String {
    let mut pages: Vec<WikiPage> = body
        .query
        .map(|q| q.pages.into_values().collect())
        .unwrap_or_default();

    if pages.is_empty() {
        return format!("No Wikipedia entries found for: {}", query);
    }

    // The generator returns pages keyed by id in arbitrary order
    pages.sort_by_key(|p| p.index.unwrap_or(i64::MAX));

    pages
        .into_iter()
        .take(TOP_K_RESULTS)
        .map(|page| {
            let extract = truncate_chars(page.extract.as_deref().unwrap_or(""), EXTRACT_CHAR_MAX);
            format!("Page: {}\nSummary: {}", page.title, extract)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Debug, Deserialize)]
struct WikiQueryResponse {
    query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiQuery {
    pages: HashMap<String, WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    title: String,
    extract: Option<String>,
    index: Option<i64>,
}

impl_tool_factory!(
    WikiLookupToolFactory,
    WikiLookupTool,
    "wiki_lookup",
    "Query Wikipedia for concise, reliable information"
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_pages_orders_and_truncates() {
        let long_extract = "x".repeat(800);
        let body: WikiQueryResponse = serde_json::from_value(json!({
            "query": {
                "pages": {
                    "2": {"title": "Second", "extract": long_extract, "index": 2},
                    "1": {"title": "First", "extract": "short", "index": 1}
                }
            }
        }))
        .unwrap();

        let content = format_pages("anything", body);
        let first_pos = content.find("Page: First").unwrap();
        let second_pos = content.find("Page: Second").unwrap();
        assert!(first_pos < second_pos);

        // 800-char extract trimmed to the cap
        let second_summary = &content[second_pos..];
        assert_eq!(second_summary.matches('x').count(), EXTRACT_CHAR_MAX);
    }

    #[test]
    fn test_format_pages_empty_query_result() {
        let body: WikiQueryResponse = serde_json::from_value(json!({})).unwrap();
        let content = format_pages("ghost topic", body);
        assert!(content.starts_with("No Wikipedia entries found"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "héllo wörld".repeat(100);
        let truncated = truncate_chars(&text, 500);
        assert_eq!(truncated.chars().count(), 500);
    }
}
