//! Minimal configuration types for Delve core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Supported LLM protocols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// Anthropic Claude API
    #[serde(rename = "anthropic")]
    Anthropic,
    /// OpenAI-compatible API (includes OpenAI, many proxies, local models)
    #[serde(rename = "openai")]
    OpenAICompat,
}

impl Protocol {
    /// Get the protocol name as a string
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::Anthropic => "anthropic",
            Protocol::OpenAICompat => "openai",
        }
    }

    /// Get the default base URL for this protocol
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Protocol::Anthropic => "https://api.anthropic.com",
            Protocol::OpenAICompat => "https://api.openai.com/v1",
        }
    }

    /// Get the default model identifier for this protocol
    pub fn default_model(&self) -> &'static str {
        match self {
            Protocol::Anthropic => "claude-3-5-sonnet-20241022",
            Protocol::OpenAICompat => "gpt-4o",
        }
    }

    /// Parse a protocol from its string name
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Protocol::Anthropic),
            "openai" | "openai_compat" => Ok(Protocol::OpenAICompat),
            other => Err(ConfigError::UnknownProtocol {
                name: other.to_string(),
            }
            .into()),
        }
    }
}

/// Model parameters for LLM requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
    /// Stop sequences
    pub stop_sequences: Option<Vec<String>>,
}

/// A fully resolved LLM configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// The protocol to use
    pub protocol: Protocol,
    /// Base URL for the API
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name/identifier
    pub model: String,
    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(protocol: Protocol, base_url: String, api_key: String, model: String) -> Self {
        Self {
            protocol,
            base_url,
            api_key,
            model,
            params: ModelParams::default(),
        }
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey {
                provider: self.protocol.as_str().to_string(),
            }
            .into());
        }

        if self.model.is_empty() {
            return Err(ConfigError::MissingField {
                field: "model".to_string(),
            }
            .into());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: self.base_url.clone(),
            }
            .into());
        }

        if let Some(temp) = self.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::InvalidValue {
                    field: "temperature".to_string(),
                    value: temp.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse() {
        assert_eq!(Protocol::parse("anthropic").unwrap(), Protocol::Anthropic);
        assert_eq!(Protocol::parse("OpenAI").unwrap(), Protocol::OpenAICompat);
        assert!(Protocol::parse("gemini").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_api_key() {
        let config = ResolvedLlmConfig::new(
            Protocol::Anthropic,
            "https://api.anthropic.com".to_string(),
            String::new(),
            "claude-3-5-sonnet-20241022".to_string(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "api.openai.com".to_string(),
            "key".to_string(),
            "gpt-4o".to_string(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut config = ResolvedLlmConfig::new(
            Protocol::Anthropic,
            "https://api.anthropic.com".to_string(),
            "key".to_string(),
            "claude-3-5-sonnet-20241022".to_string(),
        );
        config.params.temperature = Some(3.0);
        assert!(config.validate().is_err());
    }
}
