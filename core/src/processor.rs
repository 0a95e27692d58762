//! Query processor: drives one research query end to end

use tracing::{error, info};

use crate::agent::{AgentConfig, ResearchAgent};
use crate::config::ResolvedLlmConfig;
use crate::error::AgentError;
use crate::response::ResearchResponse;

/// Outcome of processing one research query.
///
/// Every failure is terminal for the query; there is no retry path. The
/// raw model output is carried along when it exists so the caller can
/// surface it for diagnosis.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// The model output parsed cleanly against the response schema
    Success(ResearchResponse),

    /// Assembly, invocation, or parsing failed
    Failure {
        error: String,
        raw_response: Option<String>,
    },
}

/// Process a research query and return a structured outcome.
///
/// A fresh agent is assembled per call (no reuse), run on its own tokio
/// task so the caller's scheduler stays responsive, and awaited to
/// completion. The final text is parsed against the response schema.
pub async fn process_query(
    query: &str,
    llm_config: &ResolvedLlmConfig,
    agent_config: AgentConfig,
) -> QueryOutcome {
    info!(query = %query, "Processing query");

    let agent = match ResearchAgent::new(agent_config, llm_config) {
        Ok(agent) => agent,
        Err(e) => {
            error!(query = %query, error = %e, "Error creating agent");
            return QueryOutcome::Failure {
                error: e.to_string(),
                raw_response: None,
            };
        }
    };

    run_agent(query.to_string(), agent).await
}

async fn run_agent(query: String, mut agent: ResearchAgent) -> QueryOutcome {
    let handle = tokio::spawn(async move { agent.run(&query).await });

    let execution = match handle.await {
        Ok(Ok(execution)) => execution,
        Ok(Err(e)) => {
            error!(error = %e, "Error processing query");
            return QueryOutcome::Failure {
                error: e.to_string(),
                raw_response: None,
            };
        }
        Err(e) => {
            let error = AgentError::TaskJoin {
                message: e.to_string(),
            };
            error!(error = %error, "Agent task did not complete");
            return QueryOutcome::Failure {
                error: error.to_string(),
                raw_response: None,
            };
        }
    };

    if !execution.success {
        return QueryOutcome::Failure {
            error: execution.final_output.clone(),
            raw_response: None,
        };
    }

    match ResearchResponse::parse(&execution.final_output) {
        Ok(response) => {
            info!(
                topic = %response.topic,
                steps = execution.steps_executed,
                "Successfully processed query"
            );
            QueryOutcome::Success(response)
        }
        Err(e) => {
            error!(error = %e, "Failed to parse model output");
            QueryOutcome::Failure {
                error: e.to_string(),
                raw_response: Some(execution.final_output),
            }
        }
    }
}
