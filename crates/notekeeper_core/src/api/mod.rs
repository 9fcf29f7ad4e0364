//! Remote notes API port.
//!
//! # Responsibility
//! - Define the contract the stores use to reach the notes backend.
//! - Classify transport and HTTP failures into [`ApiError`].
//!
//! # Invariants
//! - Implementations attach the bearer token to every note/profile call.
//! - `ApiError::Network` means the server never produced a response.
//! - `ApiError::Unauthorized` is reserved for HTTP 401.

use crate::model::credential::BearerToken;
use crate::model::note::{Note, NoteId};
use crate::model::user::UserProfile;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod http;

pub use http::HttpNoteApi;

pub type ApiResult<T> = Result<T, ApiError>;

/// Remote call failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure; no response was received.
    Network(String),
    /// HTTP 401.
    Unauthorized { detail: Option<String> },
    /// Any other non-success status.
    Rejected { status: u16, detail: Option<String> },
    /// Success status with a body that does not match the contract.
    Decode(String),
}

impl ApiError {
    /// Server-provided detail message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail } | Self::Rejected { detail, .. } => detail.as_deref(),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Short stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Rejected { .. } => "rejected",
            Self::Decode(_) => "decode",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(reason) => write!(f, "network failure: {reason}"),
            Self::Unauthorized { detail } => match detail {
                Some(detail) => write!(f, "unauthorized: {detail}"),
                None => write!(f, "unauthorized"),
            },
            Self::Rejected { status, detail } => match detail {
                Some(detail) => write!(f, "rejected with status {status}: {detail}"),
                None => write!(f, "rejected with status {status}"),
            },
            Self::Decode(reason) => write!(f, "unexpected response body: {reason}"),
        }
    }
}

impl Error for ApiError {}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Contract of the notes backend.
#[async_trait]
pub trait NoteApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<()>;
    async fn login(&self, email: &str, password: &str) -> ApiResult<BearerToken>;
    async fn list_notes(&self, token: &BearerToken) -> ApiResult<Vec<Note>>;
    async fn create_note(&self, token: &BearerToken, content: &str) -> ApiResult<()>;
    async fn delete_note(&self, token: &BearerToken, id: &NoteId) -> ApiResult<()>;
    async fn current_user(&self, token: &BearerToken) -> ApiResult<UserProfile>;
    async fn health(&self) -> ApiResult<()>;
}

/// Pulls a human-readable message out of an error body.
///
/// A string `detail` is returned as-is. A list of validation objects has
/// their `msg` fields joined with `"; "`. Anything else yields `None`.
pub(crate) fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_detail, ApiError};
    use serde_json::json;

    #[test]
    fn string_detail_is_used_verbatim() {
        let body = json!({"detail": "Email already registered"});
        assert_eq!(
            extract_detail(&body).as_deref(),
            Some("Email already registered")
        );
    }

    #[test]
    fn validation_list_detail_is_joined() {
        let body = json!({"detail": [
            {"loc": ["body", "content"], "msg": "Content exceeds 50 words (current: 51)"},
            {"loc": ["body", "email"], "msg": "value is not a valid email address"}
        ]});
        assert_eq!(
            extract_detail(&body).as_deref(),
            Some("Content exceeds 50 words (current: 51); value is not a valid email address")
        );
    }

    #[test]
    fn missing_blank_or_odd_detail_is_none() {
        assert_eq!(extract_detail(&json!({})), None);
        assert_eq!(extract_detail(&json!({"detail": "  "})), None);
        assert_eq!(extract_detail(&json!({"detail": 42})), None);
        assert_eq!(extract_detail(&json!({"detail": []})), None);
        assert_eq!(extract_detail(&json!("plain")), None);
    }

    #[test]
    fn detail_accessor_covers_only_http_variants() {
        let rejected = ApiError::Rejected {
            status: 404,
            detail: Some("Note not found".to_string()),
        };
        assert_eq!(rejected.detail(), Some("Note not found"));
        assert_eq!(ApiError::Network("refused".to_string()).detail(), None);
        assert!(ApiError::Unauthorized { detail: None }.is_unauthorized());
        assert_eq!(rejected.code(), "rejected");
    }
}
