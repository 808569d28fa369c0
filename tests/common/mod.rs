//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers for the mock-server tests.

use doubletrust::adapters::http::HttpResourceClient;
use doubletrust::domain::models::ApiConfig;
use serde_json::{json, Value};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Client pointed at a mock server
#[allow(dead_code)]
pub fn client_for(base_url: &str) -> HttpResourceClient {
    HttpResourceClient::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    })
    .expect("Failed to create client")
}

/// Wire form of one agent
#[allow(dead_code)]
pub fn agent_json(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "file_path": format!("agents/{role}.py"),
        "role": role,
        "system_prompt": format!("You are a {role}."),
        "model": "gpt-4o",
        "temperature": 0.2,
        "framework": "Langchain",
        "risk": "low",
        "risk_reason": null,
        "created_at": "2024-05-01T12:00:00"
    })
}

/// Body of `GET /api/agents/` with `n` agents
#[allow(dead_code)]
pub fn agent_list_body(n: usize) -> String {
    let agents: Vec<Value> = (0..n)
        .map(|i| agent_json(&format!("agent-{i}"), "researcher"))
        .collect();
    json!({ "agents": agents, "total": n }).to_string()
}

/// Wire form of one tool
#[allow(dead_code)]
pub fn tool_json(id: i64, name: &str, server: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} tool"),
        "parameters": {"query": {"type": "string"}},
        "server_url": server
    })
}
