//! HTTP client for the DoubleTrust backend API.
//!
//! Each method is a single boundary call: no retries, no caching. Transport
//! failures, non-success statuses and undecodable bodies map onto the
//! [`ClientError`] variants so the query layer can decide what to retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::errors::{ClientError, ClientResult};
use crate::domain::models::{
    Agent, AgentList, AgentStatistics, AgentTools, ApiConfig, DiscoveryRequest, DiscoveryResponse,
    DiscoveryStatus, Tool, ToolExecuteRequest, ToolExecuteResponse, ToolList, ToolStatistics,
    ToolsByServer,
};
use crate::domain::ports::ResourceClient;

use super::error_body;

/// `reqwest`-backed [`ResourceClient`].
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    /// The underlying HTTP client.
    http: Client,
    /// Root of the backend, e.g. `http://localhost:8000`.
    base_url: Url,
}

impl HttpResourceClient {
    /// Create a client from API configuration.
    ///
    /// Fails if the base URL does not parse or cannot carry a path.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::Validation(format!("Invalid API base URL {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "API base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("doubletrust/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// The backend root this client talks to.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, encoding each one.
    ///
    /// A trailing empty segment produces a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::Validation(format!(
                    "API base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        self.send::<(), T>(Method::GET, segments, None).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<T> {
        self.send(Method::POST, segments, Some(body)).await
    }

    async fn send<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ClientResult<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "sending request");

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::debug!(%method, %url, error = %e, "request failed");
            ClientError::Transport(format!("{method} {url} failed: {e}"))
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("{method} {url} body read failed: {e}")))?;

        if !status.is_success() {
            tracing::debug!(%method, %url, %status, "request returned error status");
            return Err(error_body::from_status(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| ClientError::Decode(format!("{method} {url} parse failed: {e}")))
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn list_agents(&self) -> ClientResult<AgentList> {
        self.get_json(&["api", "agents", ""]).await
    }

    async fn get_agent(&self, agent_id: &str) -> ClientResult<Agent> {
        self.get_json(&["api", "agents", agent_id]).await
    }

    async fn get_agent_tools(&self, agent_id: &str) -> ClientResult<AgentTools> {
        self.get_json(&["api", "agents", agent_id, "tools"]).await
    }

    async fn agent_statistics(&self) -> ClientResult<AgentStatistics> {
        self.get_json(&["api", "agents", "statistics", "overview"])
            .await
    }

    async fn list_tools(&self) -> ClientResult<ToolList> {
        self.get_json(&["api", "tools", ""]).await
    }

    async fn get_tool(&self, tool_id: i64) -> ClientResult<Tool> {
        self.get_json(&["api", "tools", &tool_id.to_string()]).await
    }

    async fn tools_by_server(&self) -> ClientResult<ToolsByServer> {
        self.get_json(&["api", "tools", "by-server"]).await
    }

    async fn execute_tool(
        &self,
        tool_id: i64,
        request: &ToolExecuteRequest,
    ) -> ClientResult<ToolExecuteResponse> {
        self.post_json(&["api", "tools", &tool_id.to_string(), "execute"], request)
            .await
    }

    async fn tool_statistics(&self) -> ClientResult<ToolStatistics> {
        self.get_json(&["api", "tools", "statistics", "overview"])
            .await
    }

    async fn discover_agents(&self, github_repo_url: &str) -> ClientResult<DiscoveryResponse> {
        let body = DiscoveryRequest {
            github_repo_url: github_repo_url.to_string(),
        };
        self.post_json(&["api", "discovery", "agents"], &body).await
    }

    async fn discovery_status(&self) -> ClientResult<DiscoveryStatus> {
        self.get_json(&["api", "discovery", "status"]).await
    }
}
