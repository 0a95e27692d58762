//! Tool system: trait, executor, registry, and the built-in research tools

pub mod base;
pub mod builtin;
pub mod registry;

pub use base::{Tool, ToolCall, ToolExecutor, ToolResult};
pub use registry::{ToolFactory, ToolRegistry};
