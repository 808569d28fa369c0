//! Agent CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;

use super::{require_data, CommandContext};
use crate::cli::display::{
    colorize_framework, colorize_risk, colorize_risk_opt, created_date, list_table,
    output, render_list, truncate, CommandOutput, DetailView,
};
use crate::domain::models::{Agent, AgentList, AgentStatistics, AgentTools, RiskLevel, Tool};

const EMPTY_TITLE: &str = "No agents found";
const EMPTY_HINT: &str = "Start by discovering agents from GitHub repositories";

#[derive(Args, Debug)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommands,
}

#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// List discovered agents
    List,
    /// Show agent details
    Show {
        /// Agent ID
        agent_id: String,
    },
    /// Show the tools assigned to an agent
    Tools {
        /// Agent ID
        agent_id: String,
    },
    /// Show agent statistics
    Stats,
}

#[derive(Debug, Serialize)]
pub struct AgentRow {
    pub id: String,
    pub role: String,
    pub framework: Option<String>,
    pub risk: Option<RiskLevel>,
    pub model: Option<String>,
    pub created: String,
    pub prompt_preview: String,
}

impl From<&Agent> for AgentRow {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id.clone(),
            role: agent.role.clone(),
            framework: agent.framework.clone(),
            risk: agent.risk,
            model: agent.model.clone(),
            created: created_date(agent),
            prompt_preview: truncate(&agent.system_prompt, 150),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentListOutput {
    pub agents: Vec<AgentRow>,
    pub total: usize,
}

impl From<&AgentList> for AgentListOutput {
    fn from(list: &AgentList) -> Self {
        Self {
            agents: list.agents.iter().map(AgentRow::from).collect(),
            total: list.total,
        }
    }
}

impl CommandOutput for AgentListOutput {
    fn to_human(&self) -> String {
        if self.agents.is_empty() {
            return format!("{}\n{}", EMPTY_TITLE.bold(), EMPTY_HINT.dimmed());
        }

        let mut table = list_table(&["id", "role", "framework", "risk", "model", "created"]);
        for agent in &self.agents {
            table.add_row(vec![
                agent.id.clone(),
                agent.role.clone(),
                agent
                    .framework
                    .as_deref()
                    .map_or_else(|| "-".to_string(), |f| colorize_framework(f).to_string()),
                colorize_risk_opt(agent.risk),
                agent.model.clone().unwrap_or_else(|| "-".to_string()),
                agent.created.clone(),
            ]);
        }
        render_list("agent", "agents", &table, self.total)
    }
}

#[derive(Debug, Serialize)]
pub struct AgentDetailOutput {
    #[serde(flatten)]
    pub agent: Agent,
}

impl CommandOutput for AgentDetailOutput {
    fn to_human(&self) -> String {
        let agent = &self.agent;
        let mut view = DetailView::new(&format!("Agent: {}", agent.role))
            .field("ID", agent.id.as_str())
            .field("Role", agent.role.as_str())
            .field_opt(
                "Framework",
                agent
                    .framework
                    .as_deref()
                    .map(|f| colorize_framework(f).to_string()),
            )
            .field_opt("Model", agent.model.as_deref())
            .field_opt("Temperature", agent.temperature.map(|t| t.to_string()))
            .field_opt("Risk", agent.risk.map(|r| colorize_risk(r).to_string()))
            .field_opt("Risk reason", agent.risk_reason.as_deref())
            .field_opt("File", agent.file_path.as_deref())
            .field("Created", created_date(agent));

        view = view.section("System Prompt").text(&agent.system_prompt);
        view.render()
    }
}

/// The "manage tools" view for one agent.
#[derive(Debug, Serialize)]
pub struct AgentToolsOutput {
    pub agent_id: String,
    pub role: Option<String>,
    pub tools: Vec<Tool>,
}

impl AgentToolsOutput {
    pub fn new(agent: Option<&Agent>, tools: &AgentTools) -> Self {
        Self {
            agent_id: tools.agent_id.clone(),
            role: agent.map(|a| a.role.clone()),
            tools: tools.tools.clone(),
        }
    }
}

impl CommandOutput for AgentToolsOutput {
    fn to_human(&self) -> String {
        let mut view = DetailView::new("Manage Tools")
            .field("ID", self.agent_id.as_str())
            .field_opt("Role", self.role.as_deref())
            .section(&format!("Tools ({})", self.tools.len()));

        if self.tools.is_empty() {
            view = view.text("No tools available.");
        }
        for tool in &self.tools {
            let line = if tool.description.is_empty() {
                tool.name.clone()
            } else {
                format!("{} - {}", tool.name.bold(), tool.description)
            };
            view = view.item(&line);
        }
        view.render()
    }
}

#[derive(Debug, Serialize)]
pub struct AgentStatsOutput {
    #[serde(flatten)]
    pub stats: AgentStatistics,
}

impl CommandOutput for AgentStatsOutput {
    fn to_human(&self) -> String {
        let stats = &self.stats;
        let mut view = DetailView::new("Agent Statistics")
            .field("Total agents", stats.total_agents.to_string())
            .field("Discovered", stats.discovered_agents.to_string());

        if !stats.agents_by_role.is_empty() {
            view = view.section("By role");
            for (role, count) in &stats.agents_by_role {
                view = view.field(role, count.to_string());
            }
        }
        if !stats.extra.is_empty() {
            view = view.section("Other");
            for (key, value) in &stats.extra {
                view = view.field(key, value.to_string());
            }
        }
        view.render()
    }
}

pub async fn execute(args: AgentArgs, ctx: &CommandContext) -> Result<()> {
    let queries = &ctx.queries;

    match args.command {
        AgentCommands::List => {
            let mut agents = queries.agents();
            let list = require_data(agents.load().await, "loading agents")?;
            output(&AgentListOutput::from(list.as_ref()), ctx.json);
        }

        AgentCommands::Show { agent_id } => {
            let mut agent = queries.agent(&agent_id);
            let agent = require_data(agent.load().await, "loading agent")?;
            let out = AgentDetailOutput {
                agent: agent.as_ref().clone(),
            };
            output(&out, ctx.json);
        }

        AgentCommands::Tools { agent_id } => {
            let mut agent = queries.agent(&agent_id);
            let agent_state = agent.load().await;

            // Only fetched once the view is actually open.
            let mut tools = queries.agent_tools(&agent_id);
            tools.set_enabled(true);
            let tools = require_data(tools.load().await, "loading agent tools")?;

            let out = AgentToolsOutput::new(agent_state.data.as_deref(), &tools);
            output(&out, ctx.json);
        }

        AgentCommands::Stats => {
            let mut stats = queries.agent_statistics();
            let stats = require_data(stats.load().await, "loading agent statistics")?;
            let out = AgentStatsOutput {
                stats: stats.as_ref().clone(),
            };
            output(&out, ctx.json);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent(id: &str, risk: Option<&str>) -> Agent {
        serde_json::from_value(json!({
            "id": id,
            "role": "researcher",
            "system_prompt": "You research things.",
            "framework": "Langchain",
            "risk": risk,
            "created_at": "2024-01-02T03:04:05Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_agent_list_renders_empty_state() {
        colored::control::set_override(false);
        let list = AgentList {
            agents: vec![],
            total: 0,
        };
        let human = AgentListOutput::from(&list).to_human();
        assert_eq!(
            human,
            "No agents found\nStart by discovering agents from GitHub repositories"
        );
        assert!(!human.contains("Error"));
    }

    #[test]
    fn test_agent_list_counts_and_rows() {
        colored::control::set_override(false);
        let list = AgentList {
            agents: vec![agent("a1", Some("high")), agent("a2", None)],
            total: 2,
        };
        let out = AgentListOutput::from(&list);
        let human = out.to_human();
        assert!(human.starts_with("2 agents found"));
        assert!(human.contains("a1"));
        assert!(human.contains("high"));
        assert_eq!(out.agents[0].created, "2024-01-02");

        let json = out.to_json();
        assert_eq!(json["total"], 2);
        assert_eq!(json["agents"][0]["risk"], "high");
    }

    #[test]
    fn test_agent_list_header_uses_server_total() {
        colored::control::set_override(false);
        let list = AgentList {
            agents: vec![agent("a1", None)],
            total: 12,
        };
        let out = AgentListOutput::from(&list);
        assert!(out.to_human().starts_with("12 agents found"));
        assert_eq!(out.to_json()["total"], 12);
    }

    #[test]
    fn test_agent_tools_view_empty() {
        colored::control::set_override(false);
        let a = agent("a1", None);
        let tools = AgentTools {
            agent_id: "a1".into(),
            tools: vec![],
        };
        let human = AgentToolsOutput::new(Some(&a), &tools).to_human();
        assert!(human.contains("Role:"));
        assert!(human.contains("No tools available."));
    }

    #[test]
    fn test_agent_stats_shows_extra_fields() {
        colored::control::set_override(false);
        let stats: AgentStatistics = serde_json::from_value(json!({
            "total_agents": 4,
            "discovered_agents": 4,
            "agents_by_role": {"researcher": 3, "writer": 1},
            "high_risk_agents": 1
        }))
        .unwrap();
        let human = AgentStatsOutput { stats }.to_human();
        assert!(human.contains("researcher:"));
        assert!(human.contains("high_risk_agents:"));
    }
}
