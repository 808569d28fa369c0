//! DoubleTrust - client for the agent discovery service
//!
//! Talks to the DoubleTrust backend over HTTP and keeps every fetched
//! resource in a shared query cache, so views that need the same data share
//! one request and refresh together after a discovery run.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): Wire models, errors and the client port
//! - **Adapters** (`adapters`): The `reqwest` implementation of the port
//! - **Service Layer** (`services`): Query cache, view bindings, discovery mutation
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use doubletrust::adapters::http::HttpResourceClient;
//! use doubletrust::domain::models::ApiConfig;
//! use doubletrust::services::{ApiQueries, QueryCache};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpResourceClient::new(&ApiConfig::default())?;
//!     let queries = ApiQueries::new(Arc::new(client), QueryCache::default());
//!
//!     let mut agents = queries.agents();
//!     let state = agents.load().await;
//!     println!("{} agents", state.data.map_or(0, |list| list.agents.len()));
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::http::HttpResourceClient;
pub use domain::errors::{ClientError, ClientResult};
pub use domain::models::{
    Agent, AgentList, Config, DiscoveryResponse, DiscoveryStatus, Tool, ToolsByServer,
};
pub use domain::ports::ResourceClient;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ApiQueries, DiscoveryMutation, Query, QueryCache, QueryKey};
