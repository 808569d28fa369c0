//! Command-line front-end.

pub mod commands;
pub mod display;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

pub use commands::{CommandContext, ViewError};
pub use types::{Cli, Commands};

use crate::adapters::http::HttpResourceClient;
use crate::domain::models::Config;
use crate::services::{ApiQueries, QueryCache};
use display::{action_failure, CommandOutput};

/// Build the client, cache and query catalog from configuration.
pub fn build_context(config: &Config, json: bool) -> Result<CommandContext> {
    let client = HttpResourceClient::new(&config.api)?;
    tracing::debug!(base_url = %client.base_url(), "using backend");
    let queries = ApiQueries::new(Arc::new(client), QueryCache::from_config(&config.cache));
    Ok(CommandContext::new(queries, json))
}

/// Dispatch a parsed command.
pub async fn run(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Agents(args) => commands::agents::execute(args, ctx).await,
        Commands::Tools(args) => commands::tools::execute(args, ctx).await,
        Commands::Discovery(args) => commands::discovery::execute(args, ctx).await,
    }
}

#[derive(Debug, Serialize)]
struct ErrorOutput {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ErrorOutput {
    fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ViewError>() {
            Some(view) => Self {
                success: false,
                error: format!("Error {}", view.action),
                detail: Some(view.message.clone()),
            },
            None => Self {
                success: false,
                error: format!("{err:#}"),
                detail: None,
            },
        }
    }
}

impl CommandOutput for ErrorOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![action_failure(&self.error)];
        if let Some(detail) = &self.detail {
            lines.push(format!("  {detail}"));
            lines.push(format!("  {}", "Run the command again to retry.".dimmed()));
        }
        lines.join("\n")
    }
}

/// Render an error in the requested format and exit non-zero.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    tracing::debug!(error = ?err, "command failed");
    let out = ErrorOutput::from_error(err);
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&out.to_json()).unwrap_or_default()
        );
    } else {
        eprintln!("{}", out.to_human());
    }
    std::process::exit(1)
}
