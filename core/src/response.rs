//! Structured research response schema and strict output parsing

use serde::{Deserialize, Serialize};

use crate::error::{ResponseError, Result};

/// The fixed shape every research run must produce
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchResponse {
    /// The main topic of the research
    pub topic: String,

    /// A concise summary of the research findings
    pub summary: String,

    /// List of source URLs or references
    pub sources: Vec<String>,

    /// List of tools used in the research
    pub tools_used: Vec<String>,

    /// ISO-8601 timestamp, defaulted at construction when the model omits it
    #[serde(default = "default_timestamp")]
    pub timestamp: String,
}

fn default_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

impl ResearchResponse {
    /// Parse a model's raw text output against the response schema.
    ///
    /// The model is instructed to emit a single JSON object, but in practice
    /// the object may arrive wrapped in prose or a fenced code block. The
    /// candidate object is located first, then deserialized strictly: a
    /// missing required field or a type mismatch is a recoverable
    /// [`ResponseError`], never a panic.
    pub fn parse(raw: &str) -> Result<Self> {
        let candidate = extract_json_object(raw).ok_or(ResponseError::NoJsonFound)?;

        serde_json::from_str(candidate)
            .map_err(|e| {
                ResponseError::SchemaMismatch {
                    message: e.to_string(),
                }
                .into()
            })
    }

    /// Output-format instructions embedded in the system prompt, derived
    /// from the schema fields
    pub fn format_instructions() -> String {
        r#"Respond with a single JSON object matching this exact schema:
{
  "topic": "<the main topic of the research>",
  "summary": "<a concise summary of the research findings>",
  "sources": ["<source URL or reference>", ...],
  "tools_used": ["<name of each tool you invoked>", ...],
  "timestamp": "<ISO-8601 timestamp, optional>"
}
All fields except "timestamp" are required. Do not wrap the JSON in any
other structure or add commentary outside it."#
            .to_string()
    }
}

/// Locate the JSON object inside raw model output.
///
/// Tries, in order: the whole trimmed text, the body of a ```json fenced
/// block, and the span from the first '{' to the last '}'.
fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    if let Some(fence_start) = trimmed.find("```") {
        let after_fence = &trimmed[fence_start + 3..];
        // Skip an optional language tag on the fence line
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(fence_end) = body.find("```") {
            let inner = body[..fence_end].trim();
            if inner.starts_with('{') && inner.ends_with('}') {
                return Some(inner);
            }
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end > start {
        Some(&trimmed[start..=end])
    } else {
        None
    }
}
