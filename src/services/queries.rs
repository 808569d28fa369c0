//! Catalog of every query the views use, bound to one client and one cache.

use std::sync::Arc;

use crate::domain::errors::ClientResult;
use crate::domain::models::{
    Agent, AgentList, AgentStatistics, AgentTools, DiscoveryStatus, Tool, ToolExecuteRequest,
    ToolExecuteResponse, ToolList, ToolStatistics, ToolsByServer,
};
use crate::domain::ports::ResourceClient;

use super::discovery_mutation::DiscoveryMutation;
use super::query::Query;
use super::query_cache::{fetcher, QueryCache};
use super::query_key::{keys, QueryKey};

/// Builds [`Query`] bindings with the right key and fetcher for each
/// resource.
#[derive(Clone)]
pub struct ApiQueries {
    client: Arc<dyn ResourceClient>,
    cache: QueryCache,
}

impl ApiQueries {
    pub fn new(client: Arc<dyn ResourceClient>, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn client(&self) -> Arc<dyn ResourceClient> {
        Arc::clone(&self.client)
    }

    pub fn agents(&self) -> Query<AgentList> {
        let client = self.client();
        Query::new(
            self.cache.clone(),
            QueryKey::new(keys::AGENTS),
            fetcher(move || {
                let client = Arc::clone(&client);
                async move { client.list_agents().await }
            }),
        )
    }

    pub fn agent(&self, agent_id: &str) -> Query<Agent> {
        let client = self.client();
        let id = agent_id.to_string();
        Query::new(
            self.cache.clone(),
            QueryKey::with_param(keys::AGENT, agent_id),
            fetcher(move || {
                let client = Arc::clone(&client);
                let id = id.clone();
                async move { client.get_agent(&id).await }
            }),
        )
    }

    /// Tools assigned to one agent.
    ///
    /// Starts disabled: the list is only fetched once the agent's tool
    /// panel is opened with [`Query::set_enabled`].
    pub fn agent_tools(&self, agent_id: &str) -> Query<AgentTools> {
        let client = self.client();
        let id = agent_id.to_string();
        Query::new(
            self.cache.clone(),
            QueryKey::with_param(keys::AGENT_TOOLS, agent_id),
            fetcher(move || {
                let client = Arc::clone(&client);
                let id = id.clone();
                async move { client.get_agent_tools(&id).await }
            }),
        )
        .with_enabled(false)
    }

    pub fn agent_statistics(&self) -> Query<AgentStatistics> {
        let client = self.client();
        Query::new(
            self.cache.clone(),
            QueryKey::new(keys::AGENT_STATISTICS),
            fetcher(move || {
                let client = Arc::clone(&client);
                async move { client.agent_statistics().await }
            }),
        )
    }

    pub fn tools(&self) -> Query<ToolList> {
        let client = self.client();
        Query::new(
            self.cache.clone(),
            QueryKey::new(keys::TOOLS),
            fetcher(move || {
                let client = Arc::clone(&client);
                async move { client.list_tools().await }
            }),
        )
    }

    pub fn tool(&self, tool_id: i64) -> Query<Tool> {
        let client = self.client();
        Query::new(
            self.cache.clone(),
            QueryKey::with_param(keys::TOOL, tool_id.to_string()),
            fetcher(move || {
                let client = Arc::clone(&client);
                async move { client.get_tool(tool_id).await }
            }),
        )
    }

    pub fn tools_by_server(&self) -> Query<ToolsByServer> {
        let client = self.client();
        Query::new(
            self.cache.clone(),
            QueryKey::new(keys::TOOLS_BY_SERVER),
            fetcher(move || {
                let client = Arc::clone(&client);
                async move { client.tools_by_server().await }
            }),
        )
    }

    pub fn tool_statistics(&self) -> Query<ToolStatistics> {
        let client = self.client();
        Query::new(
            self.cache.clone(),
            QueryKey::new(keys::TOOL_STATISTICS),
            fetcher(move || {
                let client = Arc::clone(&client);
                async move { client.tool_statistics().await }
            }),
        )
    }

    pub fn discovery_status(&self) -> Query<DiscoveryStatus> {
        let client = self.client();
        Query::new(
            self.cache.clone(),
            QueryKey::new(keys::DISCOVERY_STATUS),
            fetcher(move || {
                let client = Arc::clone(&client);
                async move { client.discovery_status().await }
            }),
        )
    }

    /// A fresh discovery form bound to this cache.
    pub fn discovery(&self) -> DiscoveryMutation {
        DiscoveryMutation::new(self.client(), self.cache.clone())
    }

    /// Run a tool. Results are not cached and nothing is invalidated.
    pub async fn execute_tool(
        &self,
        tool_id: i64,
        request: &ToolExecuteRequest,
    ) -> ClientResult<ToolExecuteResponse> {
        self.client.execute_tool(tool_id, request).await
    }
}
