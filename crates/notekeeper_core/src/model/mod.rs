//! Client-side data model.
//!
//! # Responsibility
//! - Define the wire-compatible shapes returned by the notes API.
//! - Define the credential held by the session store.
//!
//! # Invariants
//! - Note ids and timestamps are server-assigned; the client never invents them.
//! - Notes are immutable once created.

pub mod credential;
pub mod note;
pub mod user;
