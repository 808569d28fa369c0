//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::agents::AgentArgs;
use super::commands::discovery::DiscoveryArgs;
use super::commands::tools::ToolArgs;

#[derive(Parser, Debug)]
#[command(name = "doubletrust")]
#[command(about = "DoubleTrust - discover, inspect and manage AI agents and their tools", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Backend base URL, overriding configuration
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Configuration file to use instead of .doubletrust/config.yaml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse discovered agents
    Agents(AgentArgs),

    /// Browse and run MCP tools
    Tools(ToolArgs),

    /// Discover agents from GitHub repositories
    Discovery(DiscoveryArgs),
}
