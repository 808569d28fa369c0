//! Tool CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;

use super::{require_data, CommandContext, ViewError};
use crate::cli::display::{
    action_failure, action_success, count_label, format_parameters, list_table, output,
    truncate, CommandOutput, DetailView,
};
use crate::domain::models::{
    Tool, ToolExecuteRequest, ToolExecuteResponse, ToolList, ToolStatistics, ToolsByServer,
};

#[derive(Args, Debug)]
pub struct ToolArgs {
    #[command(subcommand)]
    pub command: ToolCommands,
}

#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// List registered tools
    List {
        /// Layout of the list
        #[arg(long, value_enum, default_value_t = ToolView::ByServer)]
        view: ToolView,
    },
    /// Show tool details
    Show {
        /// Tool ID
        tool_id: i64,
    },
    /// Show tool statistics
    Stats,
    /// Execute a tool on behalf of an agent
    Exec {
        /// Tool ID
        tool_id: i64,
        /// Agent the call is made for
        #[arg(short, long)]
        agent: String,
        /// Parameter as key=value; the value is parsed as JSON when it can be
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolView {
    /// One group per MCP server
    ByServer,
    /// A single flat list
    Grid,
}

#[derive(Debug, Serialize)]
pub struct ServerGroup {
    pub server: String,
    pub count: usize,
    pub tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
pub struct ToolListOutput {
    pub view: ToolView,
    pub total_tools: usize,
    pub total_servers: usize,
    /// Populated in the grid view.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Populated in the by-server view.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ServerGroup>,
}

impl ToolListOutput {
    /// Grouped view: one group per server, in server order.
    pub fn by_server(tools: &ToolList, by_server: &ToolsByServer) -> Self {
        Self {
            view: ToolView::ByServer,
            total_tools: tools.tools.len(),
            total_servers: by_server.len(),
            tools: Vec::new(),
            groups: by_server
                .iter()
                .map(|(server, tools)| ServerGroup {
                    server: server.clone(),
                    count: tools.len(),
                    tools: tools.clone(),
                })
                .collect(),
        }
    }

    /// Flat view. The server count comes from the grouping when it loaded,
    /// otherwise from the tools' own server URLs.
    pub fn grid(tools: &ToolList, by_server: Option<&ToolsByServer>) -> Self {
        let total_servers = by_server.map_or_else(
            || {
                tools
                    .tools
                    .iter()
                    .filter_map(|t| t.server_url.as_deref())
                    .collect::<BTreeSet<_>>()
                    .len()
            },
            ToolsByServer::len,
        );
        Self {
            view: ToolView::Grid,
            total_tools: tools.tools.len(),
            total_servers,
            tools: tools.tools.clone(),
            groups: Vec::new(),
        }
    }

    fn tool_table(tools: &[Tool]) -> comfy_table::Table {
        let mut table = list_table(&["id", "name", "description", "parameters"]);
        for tool in tools {
            table.add_row(vec![
                tool.id.to_string(),
                tool.name.clone(),
                truncate(&tool.description, 60),
                truncate(&format_parameters(&tool.parameters), 60),
            ]);
        }
        table
    }
}

impl CommandOutput for ToolListOutput {
    fn to_human(&self) -> String {
        if self.total_tools == 0 {
            return format!(
                "{}\n{}",
                "No tools found".bold(),
                "No tools available at the moment.".dimmed()
            );
        }

        let header = format!(
            "{} from {}",
            count_label(self.total_tools, "tool", "tools"),
            count_label(self.total_servers, "server", "servers")
        )
        .bold()
        .to_string();

        let mut lines = vec![header];
        match self.view {
            ToolView::Grid => lines.push(Self::tool_table(&self.tools).to_string()),
            ToolView::ByServer => {
                for group in &self.groups {
                    lines.push(String::new());
                    lines.push(format!(
                        "{} {}",
                        group.server.bold().underline(),
                        format!("({})", count_label(group.count, "tool", "tools")).dimmed()
                    ));
                    lines.push(Self::tool_table(&group.tools).to_string());
                }
            }
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct ToolDetailOutput {
    #[serde(flatten)]
    pub tool: Tool,
}

impl CommandOutput for ToolDetailOutput {
    fn to_human(&self) -> String {
        let tool = &self.tool;
        let mut view = DetailView::new(&format!("Tool: {}", tool.name))
            .field("ID", tool.id.to_string())
            .field_opt("Server", tool.server_url.as_deref());
        if !tool.description.is_empty() {
            view = view.field("Description", tool.description.as_str());
        }

        view = view.section("Parameters");
        view = if tool.parameters.is_empty() {
            view.text("No parameters")
        } else {
            let pretty = serde_json::to_string_pretty(&tool.parameters).unwrap_or_default();
            view.text(&pretty)
        };
        view.render()
    }
}

#[derive(Debug, Serialize)]
pub struct ToolStatsOutput {
    #[serde(flatten)]
    pub stats: ToolStatistics,
}

impl CommandOutput for ToolStatsOutput {
    fn to_human(&self) -> String {
        let stats = &self.stats;
        let mut view = DetailView::new("Tool Statistics")
            .field("Total tools", stats.total_tools.to_string())
            .field("Servers", stats.total_servers.to_string());
        if !stats.tools_by_server.is_empty() {
            view = view.section("By server");
            for (server, count) in &stats.tools_by_server {
                view = view.field(server, count.to_string());
            }
        }
        view.render()
    }
}

#[derive(Debug, Serialize)]
pub struct ToolExecOutput {
    #[serde(flatten)]
    pub response: ToolExecuteResponse,
}

impl CommandOutput for ToolExecOutput {
    fn to_human(&self) -> String {
        let r = &self.response;
        if r.success {
            let mut lines = vec![action_success(&format!(
                "{} executed on {}",
                r.tool_name, r.server_url
            ))];
            if let Some(result) = &r.result {
                lines.push(serde_json::to_string_pretty(result).unwrap_or_default());
            }
            lines.join("\n")
        } else {
            action_failure(&format!(
                "{} failed: {}",
                r.tool_name,
                r.error.as_deref().unwrap_or("unknown error")
            ))
        }
    }
}

/// Parse `key=value` pairs into a parameter object.
///
/// Values that parse as JSON keep their type; anything else is a string.
pub fn parse_params(pairs: &[String]) -> Result<serde_json::Map<String, serde_json::Value>> {
    let mut params = serde_json::Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Invalid parameter '{pair}': expected KEY=VALUE"))?;
        if key.is_empty() {
            anyhow::bail!("Invalid parameter '{pair}': empty key");
        }
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        params.insert(key.to_string(), value);
    }
    Ok(params)
}

pub async fn execute(args: ToolArgs, ctx: &CommandContext) -> Result<()> {
    let queries = &ctx.queries;

    match args.command {
        ToolCommands::List { view } => {
            let mut tools = queries.tools();
            let mut by_server = queries.tools_by_server();
            let (tools_state, by_server_state) = tokio::join!(tools.load(), by_server.load());
            let tools = require_data(tools_state, "loading tools")?;

            let out = match view {
                ToolView::ByServer => {
                    let grouped = require_data(by_server_state, "loading tools")?;
                    ToolListOutput::by_server(&tools, &grouped)
                }
                ToolView::Grid => ToolListOutput::grid(&tools, by_server_state.data.as_deref()),
            };
            output(&out, ctx.json);
        }

        ToolCommands::Show { tool_id } => {
            let mut tool = queries.tool(tool_id);
            let tool = require_data(tool.load().await, "loading tool")?;
            let out = ToolDetailOutput {
                tool: tool.as_ref().clone(),
            };
            output(&out, ctx.json);
        }

        ToolCommands::Stats => {
            let mut stats = queries.tool_statistics();
            let stats = require_data(stats.load().await, "loading tool statistics")?;
            let out = ToolStatsOutput {
                stats: stats.as_ref().clone(),
            };
            output(&out, ctx.json);
        }

        ToolCommands::Exec {
            tool_id,
            agent,
            params,
        } => {
            let request = ToolExecuteRequest {
                agent_id: agent,
                parameters: parse_params(&params)?,
            };
            tracing::info!(tool_id, agent_id = %request.agent_id, "executing tool");
            let response = queries
                .execute_tool(tool_id, &request)
                .await
                .map_err(|e| ViewError::new("executing tool", e))?;

            let failed = !response.success;
            output(&ToolExecOutput { response }, ctx.json);
            if failed {
                anyhow::bail!("Tool {tool_id} reported failure");
            }
        }
    }

    Ok(())
}
