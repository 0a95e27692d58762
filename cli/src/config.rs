//! CLI configuration loader
//!
//! Resolves LLM configuration from flag overrides and environment
//! variables (no config files):
//! 1. Flag overrides (--protocol, --api-key, --base-url, --model)
//! 2. Environment: ANTHROPIC_API_KEY / OPENAI_API_KEY, *_BASE_URL,
//!    *_MODEL, DELVE_PROTOCOL
//! 3. Protocol defaults
//!
//! `.env` loading (dotenvy) happens in main before this runs, so values
//! from a local `.env` file appear here as plain environment variables.

use anyhow::{anyhow, Result};
use delve_core::{ModelParams, Protocol, ResolvedLlmConfig};

/// Snapshot of the environment variables the loader consults.
///
/// Captured once so resolution is a pure function of its inputs.
#[derive(Debug, Clone, Default)]
struct EnvSnapshot {
    protocol: Option<String>,
    anthropic_key: Option<String>,
    openai_key: Option<String>,
    anthropic_base_url: Option<String>,
    openai_base_url: Option<String>,
    anthropic_model: Option<String>,
    openai_model: Option<String>,
}

impl EnvSnapshot {
    fn capture() -> Self {
        Self {
            protocol: std::env::var("DELVE_PROTOCOL").ok(),
            anthropic_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            openai_key: std::env::var("OPENAI_API_KEY").ok(),
            anthropic_base_url: std::env::var("ANTHROPIC_BASE_URL").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            anthropic_model: std::env::var("ANTHROPIC_MODEL").ok(),
            openai_model: std::env::var("OPENAI_MODEL").ok(),
        }
    }
}

/// CLI configuration loader
pub struct CliConfigLoader {
    protocol_override: Option<String>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            protocol_override: None,
            api_key_override: None,
            base_url_override: None,
            model_override: None,
        }
    }

    /// Set protocol override
    pub fn with_protocol_override(mut self, protocol: String) -> Self {
        self.protocol_override = Some(protocol);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Load and resolve configuration from flags and environment
    pub fn load(&self) -> Result<ResolvedLlmConfig> {
        self.resolve(EnvSnapshot::capture())
    }

    fn resolve(&self, env: EnvSnapshot) -> Result<ResolvedLlmConfig> {
        let protocol = self.resolve_protocol(&env)?;

        let key_from_env = match protocol {
            Protocol::Anthropic => env.anthropic_key.clone(),
            Protocol::OpenAICompat => env.openai_key.clone(),
        };
        let api_key = self
            .api_key_override
            .clone()
            .or(key_from_env)
            .ok_or_else(|| {
                anyhow!(
                    "No API key found for protocol '{}'. Set {} or pass --api-key",
                    protocol.as_str(),
                    match protocol {
                        Protocol::Anthropic => "ANTHROPIC_API_KEY",
                        Protocol::OpenAICompat => "OPENAI_API_KEY",
                    }
                )
            })?;

        let base_url = self
            .base_url_override
            .clone()
            .or(match protocol {
                Protocol::Anthropic => env.anthropic_base_url,
                Protocol::OpenAICompat => env.openai_base_url,
            })
            .unwrap_or_else(|| protocol.default_base_url().to_string());

        let model = self
            .model_override
            .clone()
            .or(match protocol {
                Protocol::Anthropic => env.anthropic_model,
                Protocol::OpenAICompat => env.openai_model,
            })
            .unwrap_or_else(|| protocol.default_model().to_string());

        let params = ModelParams {
            max_tokens: Some(2000),
            temperature: Some(0.7),
            ..ModelParams::default()
        };

        let resolved =
            ResolvedLlmConfig::new(protocol, base_url, api_key, model).with_params(params);

        resolved
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(resolved)
    }

    /// Pick the protocol: explicit preference first, then key detection.
    /// Anthropic wins when both API keys are present.
    fn resolve_protocol(&self, env: &EnvSnapshot) -> Result<Protocol> {
        let preference = self.protocol_override.as_ref().or(env.protocol.as_ref());

        if let Some(name) = preference {
            return Protocol::parse(name)
                .map_err(|e| anyhow!("Invalid protocol '{}': {}", name, e));
        }

        if env.anthropic_key.is_some() || self.api_key_override.is_some() {
            Ok(Protocol::Anthropic)
        } else if env.openai_key.is_some() {
            Ok(Protocol::OpenAICompat)
        } else {
            Err(anyhow!(
                "No configuration found. Set ANTHROPIC_API_KEY or OPENAI_API_KEY, \
                 or pass --api-key (with --protocol)"
            ))
        }
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_anthropic_key() -> EnvSnapshot {
        EnvSnapshot {
            anthropic_key: Some("sk-ant-test".to_string()),
            ..EnvSnapshot::default()
        }
    }

    #[test]
    fn test_anthropic_preferred_when_both_keys_present() {
        let env = EnvSnapshot {
            anthropic_key: Some("sk-ant-test".to_string()),
            openai_key: Some("sk-test".to_string()),
            ..EnvSnapshot::default()
        };

        let config = CliConfigLoader::new().resolve(env).unwrap();
        assert_eq!(config.protocol, Protocol::Anthropic);
        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_openai_key_alone_selects_openai() {
        let env = EnvSnapshot {
            openai_key: Some("sk-test".to_string()),
            ..EnvSnapshot::default()
        };

        let config = CliConfigLoader::new().resolve(env).unwrap();
        assert_eq!(config.protocol, Protocol::OpenAICompat);
        assert_eq!(config.model, "gpt-4o");
    }

    #[test]
    fn test_explicit_protocol_requires_matching_key() {
        let loader = CliConfigLoader::new().with_protocol_override("openai".to_string());
        // Only an Anthropic key in the environment
        assert!(loader.resolve(env_with_anthropic_key()).is_err());
    }

    #[test]
    fn test_flag_overrides_beat_environment() {
        let env = EnvSnapshot {
            anthropic_key: Some("sk-ant-env".to_string()),
            anthropic_model: Some("claude-3-opus-20240229".to_string()),
            ..EnvSnapshot::default()
        };

        let config = CliConfigLoader::new()
            .with_api_key_override("sk-ant-flag".to_string())
            .with_model_override("claude-3-5-haiku-20241022".to_string())
            .resolve(env)
            .unwrap();

        assert_eq!(config.api_key, "sk-ant-flag");
        assert_eq!(config.model, "claude-3-5-haiku-20241022");
    }

    #[test]
    fn test_env_model_beats_default() {
        let env = EnvSnapshot {
            anthropic_key: Some("sk-ant-test".to_string()),
            anthropic_model: Some("claude-3-opus-20240229".to_string()),
            ..EnvSnapshot::default()
        };

        let config = CliConfigLoader::new().resolve(env).unwrap();
        assert_eq!(config.model, "claude-3-opus-20240229");
    }

    #[test]
    fn test_no_keys_is_an_error() {
        assert!(CliConfigLoader::new().resolve(EnvSnapshot::default()).is_err());
    }

    #[test]
    fn test_default_params_applied() {
        let config = CliConfigLoader::new()
            .resolve(env_with_anthropic_key())
            .unwrap();
        assert_eq!(config.params.max_tokens, Some(2000));
        assert_eq!(config.params.temperature, Some(0.7));
    }
}
