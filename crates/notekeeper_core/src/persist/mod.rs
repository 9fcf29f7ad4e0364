//! Token persistence port.
//!
//! # Responsibility
//! - Keep the one value that survives across sessions: the bearer token.
//! - Let tests and embedders swap the storage backend.
//!
//! # Invariants
//! - The token is stored under the fixed key [`TOKEN_KEY`].
//! - Written only on login success; cleared only on logout or invalidation.

use crate::model::credential::BearerToken;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

/// Fixed key of the persisted token entry.
pub const TOKEN_KEY: &str = "token";

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    /// Stored entry exists but cannot be read back.
    Corrupt(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "token storage I/O failed: {err}"),
            Self::Corrupt(reason) => write!(f, "stored token is unreadable: {reason}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Corrupt(_) => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Get/set/clear access to the persisted bearer token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> PersistResult<Option<BearerToken>>;
    fn save(&self, token: &BearerToken) -> PersistResult<()>;
    fn clear(&self) -> PersistResult<()>;
}
