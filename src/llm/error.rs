//! Structured failures of the tag-merge oracle.

use thiserror::Error;

/// What went wrong talking to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMergeErrorKind {
    /// The API key was missing or rejected.
    AuthFailure,
    /// The endpoint could not be reached or timed out at the transport level.
    ConnectionFailure,
    /// Anything else: unexpected status, malformed answer.
    Unknown,
}

impl std::fmt::Display for TagMergeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TagMergeErrorKind::AuthFailure => "authentication failure",
            TagMergeErrorKind::ConnectionFailure => "connection failure",
            TagMergeErrorKind::Unknown => "unexpected failure",
        };
        f.write_str(s)
    }
}

/// Tag-merge oracle error, keeping the underlying cause.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct TagMergeError {
    pub kind: TagMergeErrorKind,
    pub message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TagMergeError {
    pub fn new(kind: TagMergeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: TagMergeErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Classifies an HTTP status returned by the endpoint.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let kind = match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                TagMergeErrorKind::AuthFailure
            }
            _ => TagMergeErrorKind::Unknown,
        };
        Self::new(kind, format!("LLM API returned {}: {}", status, body))
    }
}

impl From<reqwest::Error> for TagMergeError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_connect() || err.is_timeout() {
            TagMergeErrorKind::ConnectionFailure
        } else if matches!(
            err.status(),
            Some(reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN)
        ) {
            TagMergeErrorKind::AuthFailure
        } else {
            TagMergeErrorKind::Unknown
        };
        let message = match kind {
            TagMergeErrorKind::ConnectionFailure => "error connecting to the LLM API",
            TagMergeErrorKind::AuthFailure => "invalid LLM API key",
            TagMergeErrorKind::Unknown => "LLM request failed",
        };
        Self::with_source(kind, message, err)
    }
}

impl From<serde_json::Error> for TagMergeError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(TagMergeErrorKind::Unknown, "malformed LLM answer", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_classification() {
        let err = TagMergeError::from_status(reqwest::StatusCode::UNAUTHORIZED, "bad key");
        assert_eq!(err.kind, TagMergeErrorKind::AuthFailure);

        let err = TagMergeError::from_status(reqwest::StatusCode::FORBIDDEN, "");
        assert_eq!(err.kind, TagMergeErrorKind::AuthFailure);

        let err = TagMergeError::from_status(reqwest::StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.kind, TagMergeErrorKind::Unknown);
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_json_error_keeps_source() {
        let json_err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err = TagMergeError::from(json_err);
        assert_eq!(err.kind, TagMergeErrorKind::Unknown);
        assert!(err.source().is_some());
    }
}
