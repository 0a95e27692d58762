//! ResearchAgent implementation

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::agent::prompt::build_system_prompt;
use crate::agent::AgentConfig;
use crate::config::{Protocol, ResolvedLlmConfig};
use crate::error::Result;
use crate::llm::{
    AnthropicClient, ChatOptions, ContentBlock, LlmClient, LlmMessage, OpenAiClient,
};
use crate::tools::{ToolCall, ToolExecutor, ToolRegistry};

/// Result of one agent run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecution {
    /// Whether the run produced a final answer
    pub success: bool,

    /// Final answer text, or a description of why the run stopped
    pub final_output: String,

    /// Number of reasoning/tool-call rounds executed
    pub steps_executed: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl AgentExecution {
    fn success(final_output: String, steps_executed: usize, duration_ms: u64) -> Self {
        Self {
            success: true,
            final_output,
            steps_executed,
            duration_ms,
        }
    }

    fn failure(final_output: String, steps_executed: usize, duration_ms: u64) -> Self {
        Self {
            success: false,
            final_output,
            steps_executed,
            duration_ms,
        }
    }
}

/// An iteration-bounded research agent: one LLM client, a fixed tool set,
/// and a conversation history that doubles as the tool-call scratchpad.
pub struct ResearchAgent {
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    tool_executor: ToolExecutor,
    conversation_history: Vec<LlmMessage>,
}

impl ResearchAgent {
    /// Create a new agent from resolved LLM configuration.
    ///
    /// Construction has no degraded mode: a missing API key or invalid
    /// configuration is logged and propagated.
    pub fn new(agent_config: AgentConfig, llm_config: &ResolvedLlmConfig) -> Result<Self> {
        llm_config.validate().inspect_err(|e| {
            error!(error = %e, "Invalid LLM configuration");
        })?;

        let llm_client: Arc<dyn LlmClient> = match llm_config.protocol {
            Protocol::Anthropic => Arc::new(AnthropicClient::new(llm_config)?),
            Protocol::OpenAICompat => Arc::new(OpenAiClient::new(llm_config)?),
        };

        let tool_executor = ToolRegistry::default().create_executor(&agent_config.tools);

        Ok(Self {
            config: agent_config,
            llm_client,
            tool_executor,
            conversation_history: Vec::new(),
        })
    }

    /// Create an agent with an explicit client and executor
    pub fn with_client(
        agent_config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        tool_executor: ToolExecutor,
    ) -> Self {
        Self {
            config: agent_config,
            llm_client,
            tool_executor,
            conversation_history: Vec::new(),
        }
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn system_prompt(&self) -> String {
        match &self.config.system_prompt {
            Some(custom) => custom.clone(),
            None => build_system_prompt(&self.tool_executor.list_tools()),
        }
    }

    /// Run the agent on a single research query.
    ///
    /// One LLM call per step. Tool results are appended to the history and
    /// the next step lets the model process them; a step without tool calls
    /// is the final answer. The step cap bounds rounds, not wall-clock time.
    pub async fn run(&mut self, query: &str) -> Result<AgentExecution> {
        let start_time = Instant::now();

        self.conversation_history.clear();
        self.conversation_history
            .push(LlmMessage::system(self.system_prompt()));
        self.conversation_history.push(LlmMessage::user(query));

        let tool_definitions = self.tool_executor.get_tool_definitions();
        info!(
            model = self.llm_client.model_name(),
            provider = self.llm_client.provider_name(),
            "Starting research run"
        );

        for step in 1..=self.config.max_steps {
            debug!(step, "Requesting model completion");
            let response = self
                .llm_client
                .chat_completion(
                    self.conversation_history.clone(),
                    Some(tool_definitions.clone()),
                    Some(ChatOptions::default()),
                )
                .await
                .inspect_err(|e| error!(step, error = %e, "LLM request failed"))?;

            if let Some(usage) = &response.usage {
                debug!(
                    step,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Token usage"
                );
            }

            self.conversation_history.push(response.message.clone());

            if response.message.has_tool_use() {
                for tool_use in response.message.get_tool_uses() {
                    if let ContentBlock::ToolUse { id, name, input } = tool_use {
                        info!(step, tool = %name, "Executing tool");
                        let call = ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                            parameters: input.clone(),
                        };

                        let result = self.tool_executor.execute(call).await?;
                        debug!(
                            step,
                            tool = %name,
                            success = result.success,
                            duration_ms = result.duration_ms,
                            "Tool finished"
                        );

                        self.conversation_history.push(LlmMessage::tool_result(
                            id.clone(),
                            !result.success,
                            result.content,
                        ));
                    }
                }
                continue;
            }

            let text = response.message.get_text().unwrap_or_default();
            let duration_ms = start_time.elapsed().as_millis() as u64;
            info!(steps = step, duration_ms, "Agent produced a final answer");
            return Ok(AgentExecution::success(text, step, duration_ms));
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        warn!(
            max_steps = self.config.max_steps,
            "Agent stopped without a final answer"
        );
        Ok(AgentExecution::failure(
            format!(
                "Agent stopped without a final answer after {} steps",
                self.config.max_steps
            ),
            self.config.max_steps,
            duration_ms,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::llm::{
        FinishReason, LlmResponse, MessageContent, MessageRole, ToolDefinition,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Mock client that replays a fixed script of responses
    struct ScriptedClient {
        responses: Mutex<Vec<LlmResponse>>,
        calls: Mutex<usize>,
    }

    impl ScriptedClient {
        fn new(mut responses: Vec<LlmResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn chat_completion(
            &self,
            _messages: Vec<LlmMessage>,
            _tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            *self.calls.lock().unwrap() += 1;
            let mut responses = self.responses.lock().unwrap();
            match responses.pop() {
                Some(response) => Ok(response),
                // Keep replaying tool calls forever
                None => Ok(tool_call_response()),
            }
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }

    fn text_response(text: &str) -> LlmResponse {
        LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content: MessageContent::Text(text.to_string()),
            },
            usage: None,
            model: "mock-model".to_string(),
            finish_reason: Some(FinishReason::Stop),
        }
    }

    fn tool_call_response() -> LlmResponse {
        LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content: MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: "tu_1".to_string(),
                    name: "no_such_tool".to_string(),
                    input: json!({}),
                }]),
            },
            usage: None,
            model: "mock-model".to_string(),
            finish_reason: Some(FinishReason::ToolCalls),
        }
    }

    fn agent_with(client: Arc<ScriptedClient>) -> ResearchAgent {
        ResearchAgent::with_client(AgentConfig::default(), client, ToolExecutor::new())
    }

    #[tokio::test]
    async fn test_direct_answer_finishes_in_one_step() {
        let client = Arc::new(ScriptedClient::new(vec![text_response("final answer")]));
        let mut agent = agent_with(client.clone());

        let execution = agent.run("history of the Eiffel Tower").await.unwrap();
        assert!(execution.success);
        assert_eq!(execution.final_output, "final answer");
        assert_eq!(execution.steps_executed, 1);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_iteration_cap_terminates_tool_call_loop() {
        // Every response is a tool call; the run must stop at max_steps
        let client = Arc::new(ScriptedClient::new(vec![]));
        let mut agent = agent_with(client.clone());

        let execution = agent.run("anything").await.unwrap();
        assert!(!execution.success);
        assert_eq!(execution.steps_executed, 5);
        assert_eq!(client.call_count(), 5);
        assert!(execution.final_output.contains("after 5 steps"));
    }

    #[tokio::test]
    async fn test_tool_round_then_final_answer() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_call_response(),
            text_response("done"),
        ]));
        let mut agent = agent_with(client.clone());

        let execution = agent.run("anything").await.unwrap();
        assert!(execution.success);
        assert_eq!(execution.steps_executed, 2);
        // History: system, user, assistant tool call, tool result, final
        assert_eq!(agent.conversation_history.len(), 5);
        assert_eq!(agent.conversation_history[3].role, MessageRole::Tool);
    }

    #[test]
    fn test_custom_system_prompt_overrides_default() {
        let client = Arc::new(ScriptedClient::new(vec![]));
        let mut config = AgentConfig::default();
        config.system_prompt = Some("You are a terse assistant.".to_string());
        let agent = ResearchAgent::with_client(config, client, ToolExecutor::new());

        assert_eq!(agent.system_prompt(), "You are a terse assistant.");
    }
}
