use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A callable capability exposed by an MCP server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parameter schema; opaque to the client beyond display
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    /// Server the tool was registered from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

/// Response of `GET /api/tools/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolList {
    pub tools: Vec<Tool>,
    pub total: usize,
}

/// Response of `GET /api/tools/by-server`: server identifier to its tools.
pub type ToolsByServer = BTreeMap<String, Vec<Tool>>;

/// Request body for `POST /api/tools/{id}/execute`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecuteRequest {
    pub agent_id: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// Result of a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecuteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tool_name: String,
    pub server_url: String,
}

/// Aggregate tool statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolStatistics {
    #[serde(default)]
    pub total_tools: u64,
    #[serde(default)]
    pub total_servers: u64,
    #[serde(default)]
    pub tools_by_server: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_deserialization_with_parameters() {
        let json = r#"{
            "id": 3,
            "name": "search",
            "description": "Web search",
            "parameters": {"query": {"type": "string"}},
            "server_url": "http://srv1"
        }"#;
        let tool: Tool = serde_json::from_str(json).unwrap();
        assert_eq!(tool.id, 3);
        assert_eq!(tool.parameters["query"]["type"], "string");
        assert_eq!(tool.server_url.as_deref(), Some("http://srv1"));
    }

    #[test]
    fn test_tool_defaults_missing_fields() {
        let tool: Tool = serde_json::from_str(r#"{"id": 1, "name": "noop"}"#).unwrap();
        assert!(tool.description.is_empty());
        assert!(tool.parameters.is_empty());
        assert!(tool.server_url.is_none());
    }

    #[test]
    fn test_tools_by_server_groups_are_sorted() {
        let json = r#"{
            "http://srv2": [{"id": 2, "name": "b"}, {"id": 3, "name": "c"}],
            "http://srv1": [{"id": 1, "name": "a"}]
        }"#;
        let grouped: ToolsByServer = serde_json::from_str(json).unwrap();
        let servers: Vec<_> = grouped.keys().cloned().collect();
        assert_eq!(servers, vec!["http://srv1", "http://srv2"]);
        assert_eq!(grouped["http://srv2"][1].name, "c");
    }

    #[test]
    fn test_execute_response_with_error() {
        let json = r#"{
            "success": false,
            "error": "server unreachable",
            "tool_name": "search",
            "server_url": "http://srv1"
        }"#;
        let resp: ToolExecuteResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert!(resp.result.is_none());
        assert_eq!(resp.error.as_deref(), Some("server unreachable"));
    }
}
