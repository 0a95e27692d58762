//! CLI command implementations

pub mod research;
pub mod tools;

pub use research::research_command;
pub use tools::tools_command;
