//! Resource client port.

use async_trait::async_trait;

use crate::domain::errors::ClientResult;
use crate::domain::models::{
    Agent, AgentList, AgentStatistics, AgentTools, DiscoveryResponse, DiscoveryStatus, Tool,
    ToolExecuteRequest, ToolExecuteResponse, ToolList, ToolStatistics, ToolsByServer,
};

/// Boundary to the DoubleTrust backend.
///
/// One method per remote operation. Implementations do not retry and do
/// not cache; they surface exactly what the remote call returned or the
/// error it raised.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    // Agents

    /// List all discovered agents.
    async fn list_agents(&self) -> ClientResult<AgentList>;

    /// Get one agent by id.
    async fn get_agent(&self, agent_id: &str) -> ClientResult<Agent>;

    /// Get the tools assigned to an agent.
    async fn get_agent_tools(&self, agent_id: &str) -> ClientResult<AgentTools>;

    /// Aggregate agent statistics.
    async fn agent_statistics(&self) -> ClientResult<AgentStatistics>;

    // Tools

    /// List all registered tools.
    async fn list_tools(&self) -> ClientResult<ToolList>;

    /// Get one tool by id.
    async fn get_tool(&self, tool_id: i64) -> ClientResult<Tool>;

    /// Tools grouped by the server they were registered from.
    async fn tools_by_server(&self) -> ClientResult<ToolsByServer>;

    /// Invoke a tool on behalf of an agent.
    async fn execute_tool(
        &self,
        tool_id: i64,
        request: &ToolExecuteRequest,
    ) -> ClientResult<ToolExecuteResponse>;

    /// Aggregate tool statistics.
    async fn tool_statistics(&self) -> ClientResult<ToolStatistics>;

    // Discovery

    /// Ask the backend to scan a GitHub repository for agents.
    async fn discover_agents(&self, github_repo_url: &str) -> ClientResult<DiscoveryResponse>;

    /// Current discovery counters.
    async fn discovery_status(&self) -> ClientResult<DiscoveryStatus>;
}
