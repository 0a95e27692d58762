//! Error types and handling for Delve core

use thiserror::Error;

/// Result type alias for Delve operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Delve core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Response parsing errors
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("No API key found for provider '{provider}'")]
    MissingApiKey { provider: String },

    #[error("Unknown protocol: {name}")]
    UnknownProtocol { name: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

/// Agent execution errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Maximum steps exceeded: {max_steps}")]
    MaxStepsExceeded { max_steps: usize },

    #[error("Query execution failed: {message}")]
    QueryFailed { message: String },

    #[error("Agent task was cancelled or panicked: {message}")]
    TaskJoin { message: String },
}

/// Structured response parsing errors
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("No JSON object found in model output")]
    NoJsonFound,

    #[error("Model output did not match the response schema: {message}")]
    SchemaMismatch { message: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
