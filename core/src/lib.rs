//! Delve core: an iteration-bounded LLM research agent.
//!
//! The crate wires a provider-agnostic LLM client layer, a small set of
//! research tools (web search, wiki lookup, file persistence), and an
//! agent loop that drives them, into a single entry point:
//! [`process_query`].

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod processor;
pub mod response;
pub mod tools;

pub use agent::{AgentConfig, AgentExecution, ResearchAgent, DEFAULT_MAX_STEPS};
pub use config::{ModelParams, Protocol, ResolvedLlmConfig};
pub use error::{Error, Result};
pub use processor::{process_query, QueryOutcome};
pub use response::ResearchResponse;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
