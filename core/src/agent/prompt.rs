//! System prompt assembly for the research agent

use crate::response::ResearchResponse;

/// Build the default system prompt: role instructions, the output-format
/// contract derived from the response schema, and the available tools.
pub fn build_system_prompt(tool_names: &[&str]) -> String {
    format!(
        "You are an expert research assistant designed to generate high-quality \
         research outputs.\n\
         Use the provided tools to gather accurate information and format the \
         response according to the specified schema.\n\
         Ensure all sources are credible and properly cited.\n\n\
         {}\n\n\
         Available tools: {}",
        ResearchResponse::format_instructions(),
        tool_names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_format_instructions_and_tools() {
        let prompt = build_system_prompt(&["web_search", "wiki_lookup"]);
        assert!(prompt.contains("expert research assistant"));
        assert!(prompt.contains("\"topic\""));
        assert!(prompt.contains("Available tools: web_search, wiki_lookup"));
    }
}
