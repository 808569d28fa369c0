use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::tool::Tool;

/// Risk classification assigned to a discovered agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(anyhow::anyhow!("Invalid risk level: {s}")),
        }
    }
}

/// An AI agent discovered in a GitHub repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier
    pub id: String,

    /// Path of the source file the agent was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Role the agent plays (e.g. "researcher")
    pub role: String,

    /// The agent's system prompt
    pub system_prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Agent framework the definition was written for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskLevel>,

    /// Free-text explanation of the risk classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reason: Option<String>,

    /// Creation timestamp as sent by the server
    pub created_at: String,
}

impl Agent {
    /// Parse `created_at` as a UTC timestamp.
    ///
    /// The server emits either RFC 3339 or a naive ISO 8601 timestamp
    /// without an offset; the latter is read as UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = self.created_at.parse::<DateTime<Utc>>() {
            return Some(dt);
        }
        self.created_at
            .parse::<NaiveDateTime>()
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Response of `GET /api/agents/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentList {
    pub agents: Vec<Agent>,
    pub total: usize,
}

/// Response of `GET /api/agents/{id}/tools`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTools {
    pub agent_id: String,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

/// Aggregate agent statistics.
///
/// Fields beyond the known counters are kept in `extra` and shown as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStatistics {
    #[serde(default)]
    pub total_agents: u64,
    #[serde(default)]
    pub discovered_agents: u64,
    #[serde(default)]
    pub agents_by_role: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
