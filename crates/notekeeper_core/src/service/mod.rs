//! Client stores.
//!
//! # Responsibility
//! - Own one slice of client state each and mediate every remote call for it.
//! - Keep the UI gate (one request in flight per store) and the stale-write
//!   guard (generation counter) in one place.
//!
//! # Invariants
//! - No mutex guard is held across an `.await`.
//! - A completion is applied only if the store generation is unchanged.

pub mod note_store;
mod request_slot;
pub mod session_store;

pub(crate) use request_slot::{lock, RequestSlot, SlotGuard};
