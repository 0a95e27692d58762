//! Research agent: configuration, prompt assembly, and the run loop

mod config;
mod core;
pub mod prompt;

pub use config::{AgentConfig, DEFAULT_MAX_STEPS};
pub use core::{AgentExecution, ResearchAgent};
