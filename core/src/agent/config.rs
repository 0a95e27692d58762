//! Agent configuration structures

use serde::{Deserialize, Serialize};

/// Hard cap on reasoning/tool-call rounds per query
pub const DEFAULT_MAX_STEPS: usize = 5;

/// Configuration for a research agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of reasoning/tool-call rounds
    pub max_steps: usize,

    /// List of tools available to this agent
    pub tools: Vec<String>,

    /// Custom system prompt for the agent (optional)
    /// If not provided, the default research prompt is used
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            tools: vec![
                "web_search".to_string(),
                "wiki_lookup".to_string(),
                "save_text_to_file".to_string(),
                "export_to_json".to_string(),
            ],
            system_prompt: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.max_steps, 5);
        assert_eq!(config.tools.len(), 4);
        assert!(config.system_prompt.is_none());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = AgentConfig::default();
        config.system_prompt = Some("Custom prompt".to_string());

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AgentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.system_prompt, Some("Custom prompt".to_string()));
        assert_eq!(deserialized.max_steps, config.max_steps);
    }
}
