//! CLI command implementations.

pub mod agents;
pub mod discovery;
pub mod tools;

use std::sync::Arc;

use thiserror::Error;

use crate::domain::errors::ClientError;
use crate::services::{ApiQueries, QueryState};

/// Shared state handed to every command.
#[derive(Clone)]
pub struct CommandContext {
    pub queries: ApiQueries,
    pub json: bool,
}

impl CommandContext {
    pub const fn new(queries: ApiQueries, json: bool) -> Self {
        Self { queries, json }
    }
}

/// A view could not be rendered because its data failed to load.
///
/// Carries the view's own wording so the error state reads
/// "Error loading agents" rather than a bare transport message.
#[derive(Debug, Error)]
#[error("Error {action}: {message}")]
pub struct ViewError {
    /// What the view was doing, e.g. "loading agents".
    pub action: String,
    /// Explanation shown to the user.
    pub message: String,
    #[source]
    pub source: ClientError,
}

impl ViewError {
    pub fn new(action: impl Into<String>, source: ClientError) -> Self {
        Self {
            action: action.into(),
            message: source.user_message(),
            source,
        }
    }

    pub fn with_message(
        action: impl Into<String>,
        message: impl Into<String>,
        source: ClientError,
    ) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
            source,
        }
    }
}

/// Extract loaded data from a settled query, or the view's error state.
///
/// Data wins over an error: a failed refresh still shows what was cached.
pub fn require_data<T>(state: QueryState<T>, action: &str) -> Result<Arc<T>, ViewError> {
    match (state.data, state.error) {
        (Some(data), _) => Ok(data),
        (None, Some(error)) => Err(ViewError::new(action, error)),
        (None, None) => Err(ViewError::new(
            action,
            ClientError::Transport("no response received".to_string()),
        )),
    }
}
