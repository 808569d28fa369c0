//! Date, count, and truncation formatters for CLI output.

use crate::domain::models::Agent;

/// Calendar date an agent was created, or the raw server value if it does
/// not parse.
pub fn created_date(agent: &Agent) -> String {
    agent
        .created_at_utc()
        .map_or_else(|| agent.created_at.clone(), |dt| dt.format("%Y-%m-%d").to_string())
}

/// Truncate to `max_chars` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars).collect();
        format!("{kept}...")
    }
}

/// Format a count with label: "1 tool", "3 tools".
pub fn count_label(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// One-line summary of a tool's parameter schema.
pub fn format_parameters(parameters: &serde_json::Map<String, serde_json::Value>) -> String {
    if parameters.is_empty() {
        return "No parameters".to_string();
    }
    parameters
        .iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => format!("{key}: {s}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
