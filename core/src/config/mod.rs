//! Configuration types accepted by core

mod types;

pub use types::{ModelParams, Protocol, ResolvedLlmConfig};
