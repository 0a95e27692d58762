//! Tool registry for managing available tools

use std::collections::HashMap;

use crate::tools::{Tool, ToolExecutor};

/// Registry for managing tool creation and registration
pub struct ToolRegistry {
    factories: HashMap<String, Box<dyn ToolFactory>>,
}

/// Factory trait for creating tools
pub trait ToolFactory: Send + Sync {
    /// Create a new instance of the tool
    fn create(&self) -> Box<dyn Tool>;

    /// Get the name of the tool this factory creates
    fn tool_name(&self) -> &str;

    /// Get the description of the tool this factory creates
    fn tool_description(&self) -> &str;
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a tool factory
    pub fn register_factory(&mut self, factory: Box<dyn ToolFactory>) {
        self.factories
            .insert(factory.tool_name().to_string(), factory);
    }

    /// Create a tool by name
    pub fn create_tool(&self, name: &str) -> Option<Box<dyn Tool>> {
        self.factories.get(name).map(|factory| factory.create())
    }

    /// List all available tool names
    pub fn list_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get tool information
    pub fn get_tool_info(&self, name: &str) -> Option<(&str, &str)> {
        self.factories
            .get(name)
            .map(|factory| (factory.tool_name(), factory.tool_description()))
    }

    /// Create a tool executor with the specified tools
    pub fn create_executor(&self, tool_names: &[String]) -> ToolExecutor {
        let mut executor = ToolExecutor::new();

        for name in tool_names {
            if let Some(tool) = self.create_tool(name) {
                executor.register_tool(tool);
            }
        }

        executor
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        let mut registry = Self::new();

        // The fixed research tool set
        registry.register_factory(Box::new(crate::tools::builtin::WebSearchToolFactory));
        registry.register_factory(Box::new(crate::tools::builtin::WikiLookupToolFactory));
        registry.register_factory(Box::new(crate::tools::builtin::SaveFileToolFactory));
        registry.register_factory(Box::new(crate::tools::builtin::ExportJsonToolFactory));

        registry
    }
}

/// Macro to help implement tool factories
#[macro_export]
macro_rules! impl_tool_factory {
    ($factory:ident, $tool:ident, $name:expr, $description:expr) => {
        pub struct $factory;

        impl $crate::tools::ToolFactory for $factory {
            fn create(&self) -> Box<dyn $crate::tools::Tool> {
                Box::new($tool::new())
            }

            fn tool_name(&self) -> &str {
                $name
            }

            fn tool_description(&self) -> &str {
                $description
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_the_research_tools() {
        let registry = ToolRegistry::default();
        assert_eq!(
            registry.list_tools(),
            vec![
                "export_to_json",
                "save_text_to_file",
                "web_search",
                "wiki_lookup"
            ]
        );
    }

    #[test]
    fn test_created_tools_have_schemas_and_descriptions() {
        let registry = ToolRegistry::default();

        for tool_name in registry.list_tools() {
            let tool = registry.create_tool(tool_name).unwrap();
            assert_eq!(tool.name(), tool_name);
            assert!(!tool.description().is_empty());
            assert!(tool.parameters_schema().is_object());
        }
    }

    #[test]
    fn test_create_executor_skips_unknown_names() {
        let registry = ToolRegistry::default();
        let executor = registry.create_executor(&[
            "web_search".to_string(),
            "nonexistent".to_string(),
        ]);
        assert_eq!(executor.list_tools(), vec!["web_search"]);
    }
}
