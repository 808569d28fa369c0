//! Cache keys and key filters.

use std::fmt;
use std::sync::Arc;

/// Resource names used as the first component of every [`QueryKey`].
pub mod keys {
    pub const AGENTS: &str = "agents";
    pub const AGENT: &str = "agent";
    pub const AGENT_TOOLS: &str = "agent-tools";
    pub const AGENT_STATISTICS: &str = "agent-statistics";
    pub const TOOLS: &str = "tools";
    pub const TOOL: &str = "tool";
    pub const TOOLS_BY_SERVER: &str = "tools-by-server";
    pub const TOOL_STATISTICS: &str = "tool-statistics";
    pub const DISCOVERY_STATUS: &str = "discovery-status";
}

/// Identifier of a cache entry: a resource name plus optional parameters.
///
/// `agents` and `agent-tools/<agent id>` are both keys; the second is
/// parameterised by the agent it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    resource: String,
    params: Vec<String>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: Vec::new(),
        }
    }

    /// Key for a resource parameterised by one value.
    pub fn with_param(resource: impl Into<String>, param: impl Into<String>) -> Self {
        Self::new(resource).param(param)
    }

    /// Append a parameter.
    #[must_use]
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)?;
        for param in &self.params {
            write!(f, "/{param}")?;
        }
        Ok(())
    }
}

impl From<&str> for QueryKey {
    fn from(resource: &str) -> Self {
        Self::new(resource)
    }
}

type KeyPredicate = Arc<dyn Fn(&QueryKey) -> bool + Send + Sync>;

/// Selects the entries an invalidation applies to.
#[derive(Clone)]
pub enum KeyFilter {
    /// Exactly this key.
    Exact(QueryKey),
    /// Every key of this resource, whatever its parameters.
    Resource(String),
    /// Every key the predicate accepts.
    Predicate(KeyPredicate),
}

impl KeyFilter {
    pub fn resource(resource: impl Into<String>) -> Self {
        Self::Resource(resource.into())
    }

    pub fn predicate(f: impl Fn(&QueryKey) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::Exact(exact) => exact == key,
            Self::Resource(resource) => key.resource == *resource,
            Self::Predicate(predicate) => predicate(key),
        }
    }
}

impl fmt::Debug for KeyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(key) => f.debug_tuple("Exact").field(key).finish(),
            Self::Resource(resource) => f.debug_tuple("Resource").field(resource).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<QueryKey> for KeyFilter {
    fn from(key: QueryKey) -> Self {
        Self::Exact(key)
    }
}

impl From<&QueryKey> for KeyFilter {
    fn from(key: &QueryKey) -> Self {
        Self::Exact(key.clone())
    }
}

impl From<&str> for KeyFilter {
    fn from(resource: &str) -> Self {
        Self::Resource(resource.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(QueryKey::new(keys::AGENTS).to_string(), "agents");
        assert_eq!(
            QueryKey::with_param(keys::AGENT_TOOLS, "a1").to_string(),
            "agent-tools/a1"
        );
    }

    #[test]
    fn test_resource_filter_matches_all_params() {
        let filter = KeyFilter::from(keys::AGENT_TOOLS);
        assert!(filter.matches(&QueryKey::with_param(keys::AGENT_TOOLS, "a1")));
        assert!(filter.matches(&QueryKey::with_param(keys::AGENT_TOOLS, "a2")));
        assert!(!filter.matches(&QueryKey::new(keys::AGENTS)));
    }

    #[test]
    fn test_exact_filter() {
        let key = QueryKey::with_param(keys::AGENT, "a1");
        let filter = KeyFilter::from(&key);
        assert!(filter.matches(&key));
        assert!(!filter.matches(&QueryKey::with_param(keys::AGENT, "a2")));
    }

    #[test]
    fn test_predicate_filter() {
        let filter = KeyFilter::predicate(|key| key.resource().starts_with("tool"));
        assert!(filter.matches(&QueryKey::new(keys::TOOLS)));
        assert!(filter.matches(&QueryKey::new(keys::TOOLS_BY_SERVER)));
        assert!(!filter.matches(&QueryKey::new(keys::DISCOVERY_STATUS)));
        assert_eq!(format!("{filter:?}"), "Predicate(..)");
    }
}
