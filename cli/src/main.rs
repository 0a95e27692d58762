//! # delve CLI
//!
//! Command-line interface for delve, an LLM-powered research assistant.
//!
//! ## Usage
//!
//! - `delve` - Prompt for a research query interactively
//! - `delve "research query"` - Run a single query
//! - `delve tools` - Show available tools
//!
//! Results print to stdout; diagnostics go to stderr and are appended to
//! `research_agent.log` in the working directory.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{research_command, tools_command};
use config::CliConfigLoader;

/// delve - an LLM-powered research assistant
#[derive(Parser)]
#[command(name = "delve")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An LLM-powered research assistant with web search and wiki lookup")]
#[command(long_about = None)]
struct Cli {
    /// Protocol to use (anthropic, openai)
    #[arg(long)]
    protocol: Option<String>,

    /// API key override
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Maximum number of reasoning/tool-call rounds per query
    #[arg(long)]
    max_steps: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// The research query (prompted for interactively if omitted)
    query: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available tools
    Tools,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(protocol) = &cli.protocol {
        loader = loader.with_protocol_override(protocol.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    loader
}

/// Initialize tracing: human-readable output on stderr plus an
/// append-only `research_agent.log` in the working directory.
fn init_tracing(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("research_agent.log")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config_loader = build_config_loader(&cli);

    let result = match (cli.query, cli.command) {
        (Some(_), Some(_)) => {
            tracing::error!("Cannot specify both a query and a subcommand");
            std::process::exit(1);
        }
        (None, Some(Commands::Tools)) => tools_command().await,
        (query, None) => research_command(query, config_loader, cli.max_steps).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Unexpected error in main");
        println!("An unexpected error occurred: {}", e);
    }

    Ok(())
}
