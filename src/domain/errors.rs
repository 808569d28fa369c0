//! Domain errors for the DoubleTrust client.

use thiserror::Error;

/// Errors surfaced by resource fetches and the discovery mutation.
///
/// The enum is `Clone` so a single failed fetch can be handed to every
/// requester that joined it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Network-level failure: connect, timeout, or broken body stream.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    ///
    /// `message` carries the server's own explanation when it sent one.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A success response whose body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// A 2xx response whose body reports the operation as unsuccessful.
    #[error("{0}")]
    Business(String),

    /// A cache key was read back as a different type than it was stored as.
    #[error("Cache type mismatch for key {0}")]
    TypeMismatch(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Returns true if the failure is likely to clear on its own.
    ///
    /// Transport failures and 5xx responses are transient. Client errors,
    /// decode failures and local failures are not.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Decode(_) | Self::Validation(_) | Self::Business(_) | Self::TypeMismatch(_) => {
                false
            }
        }
    }

    /// Returns true if a failed fetch should be attempted again.
    ///
    /// Every response the server produced is retried, including 4xx and
    /// bodies that failed to decode. Errors raised locally are not.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Http { .. } | Self::Decode(_) => true,
            Self::Validation(_) | Self::Business(_) | Self::TypeMismatch(_) => false,
        }
    }

    /// The message to show a user for this error.
    ///
    /// Business errors are shown verbatim; everything else falls back to
    /// the formatted error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } | Self::Validation(message) | Self::Business(message) => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
