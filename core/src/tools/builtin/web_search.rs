//! Web search tool backed by DuckDuckGo

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::impl_tool_factory;
use crate::tools::{Tool, ToolCall, ToolResult};

/// Fixed cap on returned search results
const MAX_RESULTS: usize = 5;

/// Shared HTTP client for connection pooling
static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .build()
            .unwrap_or_default()
    })
}

/// Tool for searching the web
pub struct WebSearchTool;

impl WebSearchTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date information using DuckDuckGo. \
         Returns search results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let query: String = call.get_parameter("query")?;

        let search_url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(&query)
        );

        debug!(query = %query, "Sending search request to DuckDuckGo");
        let response = shared_client()
            .get(&search_url)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                name: "web_search".to_string(),
                message: format!("Search request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                name: "web_search".to_string(),
                message: format!("Search failed with status: {}", response.status()),
            }
            .into());
        }

        let html = response
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                name: "web_search".to_string(),
                message: format!("Failed to read response: {}", e),
            })?;

        let results = parse_duckduckgo_results(&html, MAX_RESULTS);

        if results.is_empty() {
            return Ok(ToolResult::success(
                call.id,
                format!("No results found for: {}", query),
            ));
        }

        let mut output = format!("Search results for '{}':\n\n", query);
        for (i, result) in results.iter().enumerate() {
            output.push_str(&format!(
                "{}. {}\n   {}\n   {}\n\n",
                i + 1,
                result.title,
                result.url,
                result.snippet
            ));
        }

        Ok(ToolResult::success(call.id, output))
    }
}

#[derive(Debug)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

fn parse_duckduckgo_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    // DuckDuckGo HTML results live in elements with class "result"
    let result_selector = Selector::parse(".result").unwrap();
    let title_selector = Selector::parse(".result__a").unwrap();
    let snippet_selector = Selector::parse(".result__snippet").unwrap();

    for result_el in document.select(&result_selector).take(limit) {
        let title = result_el
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
            .trim()
            .to_string();

        let url = result_el
            .select(&title_selector)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(unwrap_redirect_url)
            .unwrap_or_default();

        let snippet = result_el
            .select(&snippet_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
            .trim()
            .to_string();

        if !title.is_empty() && !url.is_empty() {
            results.push(SearchResult {
                title,
                url,
                snippet,
            });
        }
    }

    results
}

/// DuckDuckGo wraps result URLs in a redirect with a `uddg` parameter
fn unwrap_redirect_url(href: &str) -> String {
    if href.contains("uddg=") {
        href.split("uddg=")
            .nth(1)
            .and_then(|s| urlencoding::decode(s.split('&').next().unwrap_or(s)).ok())
            .map(|s| s.into_owned())
            .unwrap_or_else(|| href.to_string())
    } else {
        href.to_string()
    }
}

impl_tool_factory!(
    WebSearchToolFactory,
    WebSearchTool,
    "web_search",
    "Search the web for up-to-date information using DuckDuckGo"
);
