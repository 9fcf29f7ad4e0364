//! Bearer credential model.
//!
//! # Invariants
//! - A `BearerToken` is never empty after trimming.
//! - `Debug` output never contains the token value.

use std::fmt::{Debug, Formatter};

/// Opaque bearer token issued by the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token, returning `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for BearerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(<redacted {} chars>)", self.0.len())
    }
}

/// Credential slot owned by the session store.
///
/// Authentication is derived from this value and never cached separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    token: Option<BearerToken>,
}

impl Credential {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: BearerToken) -> Self {
        Self { token: Some(token) }
    }

    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}
