//! Session and note-synchronization core for the Note Keeper client.
//! Presentation layers render [`Snapshot`] and call the intents on
//! [`ClientController`]; this crate owns every client-side invariant.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;
pub mod validation;

pub use api::{ApiError, ApiResult, HttpNoteApi, NoteApi, RegisterRequest};
pub use config::{ClientConfig, ConfigError};
pub use controller::{BackendStatus, ClientController, Snapshot};
pub use error::{ErrorKind, OperationError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::credential::{BearerToken, Credential};
pub use model::note::{Note, NoteCollection, NoteId};
pub use model::user::UserProfile;
pub use persist::{FileTokenStore, MemoryTokenStore, PersistError, TokenStore};
pub use service::note_store::{CreateOutcome, DeleteOutcome, NoteStore, RefreshOutcome};
pub use service::session_store::{
    AuthForm, AuthOutcome, AuthPhase, ProfileOutcome, SessionStore, REGISTRATION_NOTICE,
};
pub use validation::{
    can_submit_note, word_count, SubmitCheck, SubmitRejection, MAX_NOTES_PER_ACCOUNT,
    MAX_WORDS_PER_NOTE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
