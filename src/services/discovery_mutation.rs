//! The discovery submission: validate a repository URL, trigger discovery,
//! and refresh what depends on it.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::errors::{ClientError, ClientResult};
use crate::domain::models::{validate_github_url, DiscoveryResponse, INVALID_GITHUB_URL_MESSAGE};
use crate::domain::ports::ResourceClient;

use super::query_cache::QueryCache;
use super::query_key::{keys, KeyFilter};

/// Shown when the server's success response carries no message.
pub const DISCOVERY_SUCCESS_FALLBACK: &str = "Agents discovered successfully";

/// Shown when a failure carries no usable message.
pub const DISCOVERY_ERROR_FALLBACK: &str = "An error occurred during discovery";

/// Lifecycle of one discovery submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success {
        message: String,
        response: DiscoveryResponse,
    },
    Error {
        message: String,
        error: ClientError,
    },
}

impl MutationState {
    /// The user-facing banner text, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } | Self::Error { message, .. } => Some(message),
            Self::Idle | Self::Pending => None,
        }
    }
}

/// Discovery form state plus the mutation behind it.
///
/// State transitions are published on a watch channel so a renderer can
/// follow `Pending` without polling.
pub struct DiscoveryMutation {
    client: Arc<dyn ResourceClient>,
    cache: QueryCache,
    input: String,
    state: watch::Sender<MutationState>,
}

impl DiscoveryMutation {
    pub fn new(client: Arc<dyn ResourceClient>, cache: QueryCache) -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Self {
            client,
            cache,
            input: String::new(),
            state,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, url: impl Into<String>) {
        self.input = url.into();
    }

    /// Inline validation message for the current input.
    ///
    /// An empty input shows nothing.
    pub fn input_error(&self) -> Option<&'static str> {
        if self.input.is_empty() || validate_github_url(&self.input).is_ok() {
            None
        } else {
            Some(INVALID_GITHUB_URL_MESSAGE)
        }
    }

    /// Submission needs a valid URL and no request in flight.
    pub fn can_submit(&self) -> bool {
        !self.is_pending() && validate_github_url(&self.input).is_ok()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), MutationState::Pending)
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    /// Drop any banner and return to idle.
    pub fn reset(&mut self) {
        self.state.send_replace(MutationState::Idle);
    }

    /// Submit the current input.
    ///
    /// An invalid URL is rejected without a request and without changing
    /// state. On success the agent list and discovery status are
    /// invalidated and the input is cleared. On failure, including a 2xx
    /// response with `success: false`, the input is kept for correction and
    /// the cache is left alone.
    pub async fn submit(&mut self) -> ClientResult<DiscoveryResponse> {
        if self.is_pending() {
            return Err(ClientError::Validation(
                "A discovery is already in progress".to_string(),
            ));
        }
        validate_github_url(&self.input)?;

        let url = self.input.clone();
        self.state.send_replace(MutationState::Pending);
        info!(url = %url, "submitting discovery");

        let outcome = match self.client.discover_agents(&url).await {
            Ok(response) if !response.success => Err(ClientError::Business(
                response.message.unwrap_or_default(),
            )),
            other => other,
        };

        match outcome {
            Ok(response) => {
                self.cache.invalidate(KeyFilter::resource(keys::AGENTS)).await;
                self.cache
                    .invalidate(KeyFilter::resource(keys::DISCOVERY_STATUS))
                    .await;
                self.input.clear();

                let message = response
                    .message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DISCOVERY_SUCCESS_FALLBACK.to_string());
                info!(url = %url, discovered = ?response.discovered_count(), "discovery succeeded");
                self.state.send_replace(MutationState::Success {
                    message,
                    response: response.clone(),
                });
                Ok(response)
            }
            Err(error) => {
                let message = error.user_message();
                let message = if message.trim().is_empty() {
                    DISCOVERY_ERROR_FALLBACK.to_string()
                } else {
                    message
                };
                warn!(url = %url, error = %error, "discovery failed");
                self.state.send_replace(MutationState::Error {
                    message,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }
}
