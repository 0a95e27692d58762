//! Research command: prompt, run the query, print the outcome

use std::io::{self, Write};

use anyhow::Result;
use tracing::{info, warn};

use delve_core::{process_query, AgentConfig, QueryOutcome};

use crate::config::CliConfigLoader;

/// Run one research query end to end.
///
/// With no positional query the user is prompted on stdin. An empty or
/// whitespace-only query never reaches the processor.
pub async fn research_command(
    query: Option<String>,
    config_loader: CliConfigLoader,
    max_steps: Option<usize>,
) -> Result<()> {
    let query = match query {
        Some(query) => query,
        None => prompt_for_query()?,
    };

    let query = query.trim().to_string();
    if query.is_empty() {
        warn!("Empty query provided");
        println!("Please provide a valid research query.");
        return Ok(());
    }

    let llm_config = config_loader.load()?;

    let mut agent_config = AgentConfig::default();
    if let Some(max_steps) = max_steps {
        agent_config.max_steps = max_steps;
    }

    let outcome = tokio::select! {
        outcome = process_query(&query, &llm_config, agent_config) => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("Program terminated by user");
            println!("\nProgram terminated.");
            return Ok(());
        }
    };

    print_outcome(&outcome);
    Ok(())
}

fn prompt_for_query() -> Result<String> {
    print!("What can I help you research? ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

fn print_outcome(outcome: &QueryOutcome) {
    match outcome {
        QueryOutcome::Success(response) => {
            println!("\nResearch Results:");
            println!("Topic: {}", response.topic);
            println!("Summary: {}", response.summary);
            println!("Sources:");
            for source in &response.sources {
                println!("- {}", source);
            }
            println!("Tools Used: {}", response.tools_used.join(", "));
            println!("Timestamp: {}", response.timestamp);
        }
        QueryOutcome::Failure {
            error,
            raw_response,
        } => {
            println!("Error: {}", error);
            if let Some(raw) = raw_response {
                println!("Raw Response: {}", raw);
            }
        }
    }
}
