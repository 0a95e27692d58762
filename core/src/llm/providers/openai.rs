//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageContent,
    MessageRole, ToolDefinition, Usage,
};

/// Client for OpenAI and OpenAI-compatible chat completion endpoints
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    config: ResolvedLlmConfig,
}

impl OpenAiClient {
    /// Create a new client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for OpenAI".to_string(),
            }
            .into());
        }

        Ok(Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            config: config.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools, options)?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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

        let openai_response: OpenAiResponse =
            response.json().await.map_err(|e| LlmError::Network {
                message: format!("Failed to parse response: {}", e),
            })?;

        self.convert_response(openai_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

impl OpenAiClient {
    fn build_request(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<OpenAiRequest> {
        let options = options.unwrap_or_default();
        let mut converted = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => converted.push(OpenAiMessage {
                    role: "system",
                    content: message.get_text(),
                    tool_calls: None,
                    tool_call_id: None,
                }),
                MessageRole::User => converted.push(OpenAiMessage {
                    role: "user",
                    content: message.get_text(),
                    tool_calls: None,
                    tool_call_id: None,
                }),
                MessageRole::Assistant => {
                    let text = message.get_text();
                    let tool_calls: Vec<OpenAiToolCall> = message
                        .get_tool_uses()
                        .into_iter()
                        .filter_map(|block| match block {
                            ContentBlock::ToolUse { id, name, input } => Some(OpenAiToolCall {
                                id: id.clone(),
                                call_type: "function".to_string(),
                                function: OpenAiFunctionCall {
                                    name: name.clone(),
                                    arguments: input.to_string(),
                                },
                            }),
                            _ => None,
                        })
                        .collect();

                    converted.push(OpenAiMessage {
                        role: "assistant",
                        content: text,
                        tool_calls: if tool_calls.is_empty() {
                            None
                        } else {
                            Some(tool_calls)
                        },
                        tool_call_id: None,
                    });
                }
                MessageRole::Tool => {
                    // One tool message per result block
                    let mut pushed_any = false;
                    if let MessageContent::Blocks(blocks) = &message.content {
                        for block in blocks {
                            if let ContentBlock::ToolResult {
                                tool_use_id,
                                content,
                                ..
                            } = block
                            {
                                converted.push(OpenAiMessage {
                                    role: "tool",
                                    content: Some(content.clone()),
                                    tool_calls: None,
                                    tool_call_id: Some(tool_use_id.clone()),
                                });
                                pushed_any = true;
                            }
                        }
                    }
                    if !pushed_any {
                        return Err(LlmError::InvalidRequest {
                            message: "Tool message must contain a tool result".to_string(),
                        }
                        .into());
                    }
                }
            }
        }

        Ok(OpenAiRequest {
            model: self.model.clone(),
            messages: converted,
            tools,
            max_tokens: options.max_tokens.or(self.config.params.max_tokens),
            temperature: options.temperature.or(self.config.params.temperature),
            top_p: options.top_p.or(self.config.params.top_p),
            stop: options.stop.or(self.config.params.stop_sequences.clone()),
        })
    }

    fn convert_response(&self, response: OpenAiResponse) -> Result<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidRequest {
                message: "Response contained no choices".to_string(),
            })?;

        let mut blocks = Vec::new();
        if let Some(text) = &choice.message.content {
            if !text.is_empty() {
                blocks.push(ContentBlock::Text { text: text.clone() });
            }
        }
        for call in choice.message.tool_calls.unwrap_or_default() {
            // Malformed arguments are preserved as a raw string; the tool
            // layer rejects them and the error is fed back to the model.
            let input = serde_json::from_str(&call.function.arguments)
                .unwrap_or(serde_json::Value::String(call.function.arguments));
            blocks.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            });
        }

        let content = match (blocks.len(), blocks.first()) {
            (1, Some(ContentBlock::Text { .. })) => match blocks.into_iter().next() {
                Some(ContentBlock::Text { text }) => MessageContent::Text(text),
                _ => unreachable!(),
            },
            (0, _) => MessageContent::Text(String::new()),
            _ => MessageContent::Blocks(blocks),
        };

        let finish_reason = choice.finish_reason.map(|reason| match reason.as_str() {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "tool_calls" => FinishReason::ToolCalls,
            _ => FinishReason::Other(reason),
        });

        Ok(LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content,
            },
            usage: response.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: response.model,
            finish_reason,
        })
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Protocol;
    use serde_json::json;

    fn test_client() -> OpenAiClient {
        let config = ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "https://api.openai.com/v1".to_string(),
            "test-key".to_string(),
            "gpt-4o".to_string(),
        );
        OpenAiClient::new(&config).unwrap()
    }

    #[test]
    fn test_tool_calls_round_trip_into_blocks() {
        let client = test_client();
        let raw = json!({
            "model": "gpt-4o",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "wiki_lookup",
                            "arguments": "{\"query\": \"Eiffel Tower\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
        });
        let parsed: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let response = client.convert_response(parsed).unwrap();

        let tool_uses = response.message.get_tool_uses();
        assert_eq!(tool_uses.len(), 1);
        match tool_uses[0] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "wiki_lookup");
                assert_eq!(input["query"], "Eiffel Tower");
            }
            _ => panic!("expected tool use block"),
        }
    }

    #[test]
    fn test_malformed_arguments_kept_as_string() {
        let client = test_client();
        let raw = json!({
            "model": "gpt-4o",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "not json"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": null
        });
        let parsed: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let response = client.convert_response(parsed).unwrap();

        match response.message.get_tool_uses()[0] {
            ContentBlock::ToolUse { input, .. } => {
                assert_eq!(input, &serde_json::Value::String("not json".to_string()));
            }
            _ => panic!("expected tool use block"),
        }
    }

    #[test]
    fn test_empty_choices_is_an_error() {
        let client = test_client();
        let parsed: OpenAiResponse =
            serde_json::from_value(json!({"model": "gpt-4o", "choices": [], "usage": null}))
                .unwrap();
        assert!(client.convert_response(parsed).is_err());
    }
}
