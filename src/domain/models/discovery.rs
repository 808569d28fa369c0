//! Discovery request/response models and GitHub URL validation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::domain::errors::{ClientError, ClientResult};

/// Accepted shape of a repository URL: `https://github.com/<owner>/<repo>`
/// with an optional trailing slash.
pub const GITHUB_URL_PATTERN: &str = r"^https://github\.com/[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+/?$";

/// Inline message shown for a malformed repository URL.
pub const INVALID_GITHUB_URL_MESSAGE: &str = "Please enter a valid GitHub repository URL";

static GITHUB_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GITHUB_URL_PATTERN).expect("GitHub URL pattern compiles"));

/// Check that `url` names a GitHub repository.
///
/// Empty input is rejected too; callers that want "empty means not yet
/// typed" semantics check for emptiness first.
pub fn validate_github_url(url: &str) -> ClientResult<()> {
    if GITHUB_URL.is_match(url) {
        Ok(())
    } else {
        Err(ClientError::Validation(INVALID_GITHUB_URL_MESSAGE.to_string()))
    }
}

/// Snapshot of the backend's discovery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryStatus {
    pub total_agents: u64,
    pub discovered_agents: u64,
}

/// Request body for `POST /api/discovery/agents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    pub github_repo_url: String,
}

/// Success payload of a discovery run.
///
/// Every field is optional on the wire; the shape is owned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

const fn default_success() -> bool {
    true
}

impl DiscoveryResponse {
    /// Number of agents reported in `data.agents`, if present.
    pub fn discovered_count(&self) -> Option<usize> {
        self.data
            .as_ref()?
            .get("agents")?
            .as_array()
            .map(Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_repository_urls() {
        for url in [
            "https://github.com/acme/widgets",
            "https://github.com/acme/widgets/",
            "https://github.com/my_org/repo.name-2",
        ] {
            assert!(validate_github_url(url).is_ok(), "{url} should be valid");
        }
    }

    #[test]
    fn test_rejects_malformed_urls() {
        for url in [
            "",
            "not-a-url",
            "github.com/acme/widgets",
            "http://github.com/acme/widgets",
            "https://github.com/acme",
            "https://github.com/acme/",
            "https://github.com//widgets",
            "https://github.com/acme/widgets/tree/main",
            "https://gitlab.com/acme/widgets",
            "https://github.com/acme/wid gets",
        ] {
            let err = validate_github_url(url).unwrap_err();
            assert_eq!(err, ClientError::Validation(INVALID_GITHUB_URL_MESSAGE.into()));
        }
    }

    #[test]
    fn test_discovery_response_count() {
        let resp: DiscoveryResponse = serde_json::from_str(
            r#"{"success": true, "message": "Successfully discovered 2 agents",
                "data": {"agents": [{"id": "a"}, {"id": "b"}]}}"#,
        )
        .unwrap();
        assert_eq!(resp.discovered_count(), Some(2));
        assert_eq!(resp.message.as_deref(), Some("Successfully discovered 2 agents"));
    }

    #[test]
    fn test_discovery_response_tolerates_empty_body() {
        let resp: DiscoveryResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.success);
        assert!(resp.message.is_none());
        assert_eq!(resp.discovered_count(), None);
    }

    proptest! {
        #[test]
        fn prop_owner_repo_urls_are_valid(
            owner in "[A-Za-z0-9_.-]{1,20}",
            repo in "[A-Za-z0-9_.-]{1,20}",
            slash in proptest::bool::ANY,
        ) {
            let url = format!(
                "https://github.com/{owner}/{repo}{}",
                if slash { "/" } else { "" }
            );
            prop_assert!(validate_github_url(&url).is_ok());
        }

        #[test]
        fn prop_missing_scheme_is_invalid(
            owner in "[A-Za-z0-9_.-]{1,20}",
            repo in "[A-Za-z0-9_.-]{1,20}",
        ) {
            let url = format!("github.com/{owner}/{repo}");
            prop_assert!(validate_github_url(&url).is_err());
        }

        #[test]
        fn prop_single_segment_is_invalid(owner in "[A-Za-z0-9_.-]{1,20}") {
            let url = format!("https://github.com/{owner}");
            prop_assert!(validate_github_url(&url).is_err());
        }
    }
}
