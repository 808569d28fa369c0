pub mod agent;
pub mod config;
pub mod discovery;
pub mod tool;

pub use agent::{Agent, AgentList, AgentStatistics, AgentTools, RiskLevel};
pub use config::{ApiConfig, CacheConfig, Config, LogFormat, LoggingConfig, RotationPolicy};
pub use discovery::{
    validate_github_url, DiscoveryRequest, DiscoveryResponse, DiscoveryStatus, GITHUB_URL_PATTERN,
    INVALID_GITHUB_URL_MESSAGE,
};
pub use tool::{
    Tool, ToolExecuteRequest, ToolExecuteResponse, ToolList, ToolStatistics, ToolsByServer,
};
