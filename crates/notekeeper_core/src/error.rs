//! User-facing operation errors.
//!
//! # Responsibility
//! - Classify failures into the four kinds the presentation layer renders.
//! - Own the static fallback sentences used when the server gives no detail.
//!
//! # Invariants
//! - Validation and mutation messages are surfaced verbatim.
//! - Auth and network failures fall back to a static sentence.

use crate::api::ApiError;
use crate::validation::SubmitRejection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const AUTH_FAILED_FALLBACK: &str = "Authentication failed";
pub const AUTH_NETWORK_MESSAGE: &str =
    "Network error. Make sure the backend is running and reachable.";
pub const CREATE_FAILED_FALLBACK: &str = "Failed to create note";

/// Failure category shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local, pre-network rejection (word limit).
    ValidationRejected,
    /// Server rejected the credentials or registration.
    AuthFailed,
    /// The server never answered.
    NetworkUnreachable,
    /// Server rejected a note mutation.
    MutationFailed,
}

/// Last-seen error for the active screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
    /// The server answered 401 to an authenticated call.
    unauthorized: bool,
}

impl OperationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            unauthorized: false,
        }
    }

    /// Whether the stored credential was rejected and the session must end.
    pub fn is_unauthorized(&self) -> bool {
        self.unauthorized
    }

    pub(crate) fn validation(rejection: SubmitRejection) -> Self {
        Self::new(ErrorKind::ValidationRejected, rejection.to_string())
    }

    /// Maps a failed login/register call.
    pub(crate) fn from_auth(err: &ApiError) -> Self {
        match err {
            ApiError::Network(_) => Self::new(ErrorKind::NetworkUnreachable, AUTH_NETWORK_MESSAGE),
            other => Self::new(
                ErrorKind::AuthFailed,
                other.detail().unwrap_or(AUTH_FAILED_FALLBACK),
            ),
        }
    }

    /// Maps a failed create call.
    pub(crate) fn from_create(err: &ApiError) -> Self {
        match err {
            ApiError::Network(_) => {
                Self::new(ErrorKind::NetworkUnreachable, CREATE_FAILED_FALLBACK)
            }
            other => Self {
                unauthorized: other.is_unauthorized(),
                ..Self::new(
                    ErrorKind::MutationFailed,
                    other.detail().unwrap_or(CREATE_FAILED_FALLBACK),
                )
            },
        }
    }
}

impl Display for OperationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for OperationError {}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, OperationError, AUTH_FAILED_FALLBACK, CREATE_FAILED_FALLBACK};
    use crate::api::ApiError;

    #[test]
    fn auth_error_prefers_server_detail() {
        let err = ApiError::Rejected {
            status: 400,
            detail: Some("Email already registered".to_string()),
        };
        let mapped = OperationError::from_auth(&err);
        assert_eq!(mapped.kind, ErrorKind::AuthFailed);
        assert_eq!(mapped.message, "Email already registered");
    }

    #[test]
    fn auth_error_without_detail_uses_fallback() {
        let err = ApiError::Unauthorized { detail: None };
        assert_eq!(OperationError::from_auth(&err).message, AUTH_FAILED_FALLBACK);
        let err = ApiError::Decode("not json".to_string());
        assert_eq!(OperationError::from_auth(&err).message, AUTH_FAILED_FALLBACK);
    }

    #[test]
    fn network_errors_are_distinct() {
        let err = ApiError::Network("connection refused".to_string());
        let auth = OperationError::from_auth(&err);
        assert_eq!(auth.kind, ErrorKind::NetworkUnreachable);
        assert!(auth.message.starts_with("Network error"));
        let create = OperationError::from_create(&err);
        assert_eq!(create.kind, ErrorKind::NetworkUnreachable);
        assert_eq!(create.message, CREATE_FAILED_FALLBACK);
    }

    #[test]
    fn create_rejection_surfaces_detail_verbatim() {
        let err = ApiError::Rejected {
            status: 400,
            detail: Some("Maximum number of notes (10) reached".to_string()),
        };
        let mapped = OperationError::from_create(&err);
        assert_eq!(mapped.kind, ErrorKind::MutationFailed);
        assert_eq!(mapped.message, "Maximum number of notes (10) reached");
        assert!(!mapped.is_unauthorized());
    }

    #[test]
    fn create_rejected_by_401_requests_reauth() {
        let err = ApiError::Unauthorized {
            detail: Some("Could not validate credentials".to_string()),
        };
        let mapped = OperationError::from_create(&err);
        assert!(mapped.is_unauthorized());
        assert_eq!(mapped.message, "Could not validate credentials");
        assert!(!OperationError::from_auth(&err).is_unauthorized());
    }
}
