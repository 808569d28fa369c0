//! Discovery CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use super::{require_data, CommandContext, ViewError};
use crate::cli::display::{action_success, create_spinner, output, CommandOutput, DetailView};
use crate::domain::models::{validate_github_url, DiscoveryStatus};
use crate::services::{MutationState, DISCOVERY_ERROR_FALLBACK};

#[derive(Args, Debug)]
pub struct DiscoveryArgs {
    #[command(subcommand)]
    pub command: DiscoveryCommands,
}

#[derive(Subcommand, Debug)]
pub enum DiscoveryCommands {
    /// Show discovery counters
    Status,
    /// Discover agents in a GitHub repository
    Run {
        /// Repository URL, e.g. https://github.com/owner/repo
        github_repo_url: String,
    },
}

#[derive(Debug, Serialize)]
pub struct DiscoveryStatusOutput {
    #[serde(flatten)]
    pub status: DiscoveryStatus,
}

impl CommandOutput for DiscoveryStatusOutput {
    fn to_human(&self) -> String {
        DetailView::new("Discovery Status")
            .field("Total agents", self.status.total_agents.to_string())
            .field("Discovered agents", self.status.discovered_agents.to_string())
            .render()
    }
}

#[derive(Debug, Serialize)]
pub struct DiscoveryRunOutput {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DiscoveryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_agents: Option<usize>,
}

impl CommandOutput for DiscoveryRunOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![action_success(&self.message)];
        if let Some(n) = self.discovered {
            lines.push(format!("  Agents in this repository: {n}"));
        }
        if let Some(status) = self.status {
            lines.push(String::new());
            lines.push(DiscoveryStatusOutput { status }.to_human());
        }
        lines.join("\n")
    }
}

pub async fn execute(args: DiscoveryArgs, ctx: &CommandContext) -> Result<()> {
    let queries = &ctx.queries;

    match args.command {
        DiscoveryCommands::Status => {
            let mut status = queries.discovery_status();
            let status = require_data(status.load().await, "loading discovery status")?;
            output(&DiscoveryStatusOutput { status: *status }, ctx.json);
        }

        DiscoveryCommands::Run { github_repo_url } => {
            let mut mutation = queries.discovery();
            mutation.set_input(github_repo_url);
            // Rejected locally; no request is made.
            if let Err(error) = validate_github_url(mutation.input()) {
                return Err(ViewError::new("running discovery", error).into());
            }

            // The views that depend on discovery; both refresh once it lands.
            let mut status = queries.discovery_status();
            let mut agents = queries.agents();
            tokio::join!(status.load(), agents.load());

            let spinner = (!ctx.json).then(|| {
                create_spinner(format!("Discovering agents in {}", mutation.input()))
            });
            let result = mutation.submit().await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            let response = match result {
                Ok(response) => response,
                Err(error) => {
                    let message = match mutation.state() {
                        MutationState::Error { message, .. } => message,
                        _ => DISCOVERY_ERROR_FALLBACK.to_string(),
                    };
                    return Err(ViewError::with_message("running discovery", message, error).into());
                }
            };

            status.sync().await;
            agents.sync().await;
            let (status_state, agents_state) = tokio::join!(status.settle(), agents.settle());

            let message = mutation
                .state()
                .message()
                .map_or_else(|| response.message.clone().unwrap_or_default(), str::to_string);
            let out = DiscoveryRunOutput {
                success: response.success,
                message,
                discovered: response.discovered_count(),
                status: status_state.data.as_deref().copied(),
                total_agents: agents_state.data.as_ref().map(|list| list.total),
            };
            output(&out, ctx.json);
        }
    }

    Ok(())
}
