//! Base tool traits and structures

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result, ToolError};

/// Trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters
    async fn execute(&self, call: ToolCall) -> Result<ToolResult>;
}

/// A call to a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Parameters to pass to the tool
    pub parameters: serde_json::Value,
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is a result for
    pub tool_call_id: String,

    /// Whether the execution was successful
    pub success: bool,

    /// Result content
    pub content: String,

    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new<S: Into<String>>(name: S, parameters: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parameters,
        }
    }

    /// Get a parameter value by key
    pub fn get_parameter<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .parameters
            .get(key)
            .ok_or_else(|| ToolError::InvalidParameters {
                message: format!("Missing parameter: {}", key),
            })?;

        serde_json::from_value(value.clone()).map_err(|_| {
            ToolError::InvalidParameters {
                message: format!("Invalid parameter type for: {}", key),
            }
            .into()
        })
    }

    /// Get a parameter value by key with a default
    pub fn get_parameter_or<T>(&self, key: &str, default: T) -> T
    where
        T: for<'de> Deserialize<'de> + Clone,
    {
        self.get_parameter(key).unwrap_or(default)
    }
}

impl ToolResult {
    /// Create a successful result
    pub fn success<S: Into<String>>(tool_call_id: S, content: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            content: content.into(),
            duration_ms: None,
        }
    }

    /// Create an error result
    pub fn error<S: Into<String>>(tool_call_id: S, content: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            content: content.into(),
            duration_ms: None,
        }
    }

    /// Set execution duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Tool executor that manages tool execution
pub struct ToolExecutor {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolExecutor {
    /// Create a new tool executor
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Execute a tool call.
    ///
    /// An unknown tool name or invalid parameters produce an error
    /// `ToolResult` that is fed back to the model so the run can recover.
    /// Any other failure (a search backend going away, for example) is a
    /// fault and propagates to the processor boundary.
    pub async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let tool = match self.get_tool(&call.name) {
            Some(tool) => tool,
            None => {
                return Ok(ToolResult::error(
                    call.id,
                    format!("Unknown tool: {}", call.name),
                ));
            }
        };

        let start_time = std::time::Instant::now();
        let call_id = call.id.clone();
        let result = tool.execute(call).await;
        let duration = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(mut result) => {
                result.duration_ms = Some(duration);
                Ok(result)
            }
            Err(Error::Tool(ToolError::InvalidParameters { message })) => Ok(ToolResult::error(
                call_id,
                format!("Invalid parameters: {}", message),
            )
            .with_duration(duration)),
            Err(e) => Err(e),
        }
    }

    /// Get tool definitions for LLM function calling
    pub fn get_tool_definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        let mut definitions: Vec<crate::llm::ToolDefinition> = self
            .tools
            .values()
            .map(|tool| crate::llm::ToolDefinition {
                tool_type: "function".to_string(),
                function: crate::llm::FunctionDefinition {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters_schema(),
                },
            })
            .collect();
        definitions.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        definitions
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its input"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            })
        }

        async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
            let text: String = call.get_parameter("text")?;
            Ok(ToolResult::success(call.id, text))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails hard"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _call: ToolCall) -> Result<ToolResult> {
            Err(ToolError::ExecutionFailed {
                name: "failing".to_string(),
                message: "backend unavailable".to_string(),
            }
            .into())
        }
    }

    fn executor() -> ToolExecutor {
        let mut executor = ToolExecutor::new();
        executor.register_tool(Box::new(EchoTool));
        executor.register_tool(Box::new(FailingTool));
        executor
    }

    #[tokio::test]
    async fn test_execute_success_records_duration() {
        let result = executor()
            .execute(ToolCall::new("echo", json!({"text": "hi"})))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.content, "hi");
        assert!(result.duration_ms.is_some());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back_not_propagated() {
        let result = executor()
            .execute(ToolCall::new("missing", json!({})))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.content.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_fed_back() {
        let result = executor()
            .execute(ToolCall::new("echo", json!({"text": 42})))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.content.contains("Invalid parameters"));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let outcome = executor().execute(ToolCall::new("failing", json!({}))).await;
        assert!(outcome.is_err());
    }

    #[test]
    fn test_definitions_cover_registered_tools() {
        let definitions = executor().get_tool_definitions();
        let names: Vec<&str> = definitions
            .iter()
            .map(|d| d.function.name.as_str())
            .collect();
        assert_eq!(names, vec!["echo", "failing"]);
    }
}
