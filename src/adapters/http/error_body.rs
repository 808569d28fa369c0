//! Extraction of the server's explanation from an error response.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::errors::ClientError;

/// FastAPI-style error envelope: `{"detail": ...}`.
///
/// `detail` is a string for raised HTTP errors and a list of objects for
/// request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: serde_json::Value,
}

/// Build a [`ClientError::Http`] from a failed response's status and body.
///
/// Prefers the envelope's `detail`, then the raw body, then the status'
/// canonical reason.
pub fn from_status(status: StatusCode, body: &str) -> ClientError {
    ClientError::Http {
        status: status.as_u16(),
        message: server_message(status, body),
    }
}

fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        match envelope.detail {
            serde_json::Value::String(detail) if !detail.is_empty() => return detail,
            serde_json::Value::Array(items) if !items.is_empty() => {
                return items
                    .iter()
                    .map(|item| {
                        item.get("msg")
                            .and_then(serde_json::Value::as_str)
                            .map_or_else(|| item.to_string(), str::to_string)
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
            }
            serde_json::Value::Null => {}
            other => return other.to_string(),
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail() {
        let err = from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Invalid GitHub repository URL"}"#,
        );
        assert_eq!(
            err,
            ClientError::Http {
                status: 400,
                message: "Invalid GitHub repository URL".into()
            }
        );
    }

    #[test]
    fn test_validation_detail_list() {
        let body = r#"{"detail": [
            {"loc": ["body", "github_repo_url"], "msg": "invalid or missing URL scheme", "type": "value_error.url.scheme"},
            {"loc": ["body"], "msg": "field required", "type": "value_error.missing"}
        ]}"#;
        let err = from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            err.user_message(),
            "invalid or missing URL scheme; field required"
        );
    }

    #[test]
    fn test_plain_text_body() {
        let err = from_status(StatusCode::BAD_GATEWAY, "upstream exploded\n");
        assert_eq!(err.user_message(), "upstream exploded");
    }

    #[test]
    fn test_empty_body_uses_reason() {
        let err = from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.user_message(), "Not Found");
    }
}
