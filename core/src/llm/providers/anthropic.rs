//! Anthropic Claude client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageContent,
    MessageRole, ToolDefinition, Usage,
};

/// Anthropic Claude client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    config: ResolvedLlmConfig,
}

impl AnthropicClient {
    /// Create a new Anthropic client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for Anthropic".to_string(),
            }
            .into());
        }

        Ok(Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            config: config.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools, options);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status,
                message: error_text,
            }
            .into());
        }

        let anthropic_response: AnthropicResponse =
            response.json().await.map_err(|e| LlmError::Network {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(self.convert_response(anthropic_response))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }
}

impl AnthropicClient {
    fn build_request(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> AnthropicRequest {
        let options = options.unwrap_or_default();

        // Anthropic takes the system prompt as a top-level field; tool
        // results ride in user-role messages.
        let mut system_message = None;
        let mut conversation = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => {
                    if let Some(text) = message.get_text() {
                        system_message = Some(text);
                    }
                }
                MessageRole::User | MessageRole::Tool => {
                    conversation.push(AnthropicMessage {
                        role: "user",
                        content: content_blocks(message.content),
                    });
                }
                MessageRole::Assistant => {
                    conversation.push(AnthropicMessage {
                        role: "assistant",
                        content: content_blocks(message.content),
                    });
                }
            }
        }

        let max_tokens = options
            .max_tokens
            .or(self.config.params.max_tokens)
            .unwrap_or(2000);
        let temperature = options
            .temperature
            .or(self.config.params.temperature)
            .unwrap_or(0.7);

        AnthropicRequest {
            model: self.model.clone(),
            max_tokens,
            temperature,
            top_p: options.top_p.or(self.config.params.top_p),
            system: system_message,
            messages: conversation,
            tools: tools.map(|t| {
                t.into_iter()
                    .map(|tool| AnthropicTool {
                        name: tool.function.name,
                        description: tool.function.description,
                        input_schema: tool.function.parameters,
                    })
                    .collect()
            }),
            stop_sequences: options.stop.or(self.config.params.stop_sequences.clone()),
        }
    }

    fn convert_response(&self, response: AnthropicResponse) -> LlmResponse {
        let content = match response.content.len() {
            1 => match response.content.into_iter().next() {
                Some(ContentBlock::Text { text }) => MessageContent::Text(text),
                Some(block) => MessageContent::Blocks(vec![block]),
                None => MessageContent::Text(String::new()),
            },
            _ => MessageContent::Blocks(response.content),
        };

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens + u.output_tokens,
        });

        let finish_reason = response.stop_reason.map(|reason| match reason.as_str() {
            "end_turn" => FinishReason::Stop,
            "max_tokens" => FinishReason::Length,
            "tool_use" => FinishReason::ToolCalls,
            _ => FinishReason::Other(reason),
        });

        LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content,
            },
            usage,
            model: response.model,
            finish_reason,
        }
    }
}

/// Flatten message content into the block list Anthropic expects
fn content_blocks(content: MessageContent) -> Vec<ContentBlock> {
    match content {
        MessageContent::Text(text) => vec![ContentBlock::Text { text }],
        MessageContent::Blocks(blocks) => blocks,
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
