//! Persistence tool: append research records to a JSON file

use async_trait::async_trait;
use std::io::Write;
use tracing::{error, info};

use crate::error::Result;
use crate::impl_tool_factory;
use crate::tools::{Tool, ToolCall, ToolResult};

const DEFAULT_FILENAME: &str = "research_output.json";

/// Tool that appends one indented JSON record per invocation.
///
/// The output file is a concatenated stream of JSON values, not an
/// array. Like the text save tool, I/O failures are reported as a
/// returned string rather than propagated.
pub struct ExportJsonTool;

impl ExportJsonTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExportJsonTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ExportJsonTool {
    fn name(&self) -> &str {
        "export_to_json"
    }

    fn description(&self) -> &str {
        "Exports structured research data to a JSON file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "object",
                    "description": "The research record to export"
                },
                "filename": {
                    "type": "string",
                    "description": "Target file (default: research_output.json)"
                }
            },
            "required": ["data"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let data: serde_json::Map<String, serde_json::Value> = call.get_parameter("data")?;
        let filename: String = call.get_parameter_or("filename", DEFAULT_FILENAME.to_string());

        match append_record(&filename, &serde_json::Value::Object(data)) {
            Ok(()) => {
                info!(filename = %filename, "Data exported");
                Ok(ToolResult::success(
                    call.id,
                    format!("Data successfully exported to {}", filename),
                ))
            }
            Err(e) => {
                error!(filename = %filename, error = %e, "Failed to export data");
                Ok(ToolResult::error(
                    call.id,
                    format!("Error exporting to JSON: {}", e),
                ))
            }
        }
    }
}

fn append_record(filename: &str, data: &serde_json::Value) -> std::io::Result<()> {
    let serialized = serde_json::to_string_pretty(data)?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)?;
    file.write_all(serialized.as_bytes())?;
    file.write_all(b"\n")
}

impl_tool_factory!(
    ExportJsonToolFactory,
    ExportJsonTool,
    "export_to_json",
    "Exports structured research data to a JSON file"
);
