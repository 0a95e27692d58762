//! Persistence tool: append research output to a text file

use async_trait::async_trait;
use std::io::Write;
use tracing::{error, info};

use crate::error::Result;
use crate::impl_tool_factory;
use crate::tools::{Tool, ToolCall, ToolResult};

const DEFAULT_FILENAME: &str = "research_output.txt";

/// Tool that appends a timestamped block of research data to a text file.
///
/// I/O failures never propagate past this tool: a failed save must not
/// abort an otherwise-successful research run, so errors are reported
/// back to the model as a descriptive string.
pub struct SaveFileTool;

impl SaveFileTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SaveFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SaveFileTool {
    fn name(&self) -> &str {
        "save_text_to_file"
    }

    fn description(&self) -> &str {
        "Saves structured research data to a text file with a timestamp."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "string",
                    "description": "The research data to save"
                },
                "filename": {
                    "type": "string",
                    "description": "Target file (default: research_output.txt)"
                }
            },
            "required": ["data"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let data: String = call.get_parameter("data")?;
        let filename: String = call.get_parameter_or("filename", DEFAULT_FILENAME.to_string());

        match append_block(&filename, &data) {
            Ok(()) => {
                info!(filename = %filename, "Data saved");
                Ok(ToolResult::success(
                    call.id,
                    format!("Data successfully saved to {}", filename),
                ))
            }
            Err(e) => {
                error!(filename = %filename, error = %e, "Failed to save data");
                Ok(ToolResult::error(
                    call.id,
                    format!("Error saving to file: {}", e),
                ))
            }
        }
    }
}

fn append_block(filename: &str, data: &str) -> std::io::Result<()> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let formatted = format!("--- Research Output ---\nTimestamp: {}\n\n{}\n\n", timestamp, data);

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)?;
    file.write_all(formatted.as_bytes())
}

impl_tool_factory!(
    SaveFileToolFactory,
    SaveFileTool,
    "save_text_to_file",
    "Saves structured research data to a text file with timestamp"
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_appends_one_well_formed_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path_str = path.to_str().unwrap();

        let tool = SaveFileTool::new();
        let result = tool
            .execute(ToolCall::new(
                "save_text_to_file",
                json!({"data": "test", "filename": path_str}),
            ))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.content.starts_with("Data successfully saved"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("--- Research Output ---\nTimestamp: "));
        assert!(written.contains("\n\ntest\n\n"));
        assert_eq!(written.matches("--- Research Output ---").count(), 1);
    }

    #[tokio::test]
    async fn test_two_saves_append_two_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path_str = path.to_str().unwrap().to_string();

        let tool = SaveFileTool::new();
        for data in ["first", "second"] {
            tool.execute(ToolCall::new(
                "save_text_to_file",
                json!({"data": data, "filename": path_str}),
            ))
            .await
            .unwrap();
        }

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.matches("--- Research Output ---").count(), 2);
        assert!(written.contains("first"));
        assert!(written.contains("second"));
    }

    #[tokio::test]
    async fn test_unwritable_path_returns_error_string() {
        let dir = tempfile::tempdir().unwrap();
        // A directory path cannot be opened for appending
        let path_str = dir.path().to_str().unwrap().to_string();

        let tool = SaveFileTool::new();
        let result = tool
            .execute(ToolCall::new(
                "save_text_to_file",
                json!({"data": "test", "filename": path_str}),
            ))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.content.starts_with("Error saving to file"));
    }
}
