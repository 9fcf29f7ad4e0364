//! Note store: the authoritative note collection and the draft.
//!
//! # Responsibility
//! - Mediate every list/create/delete call.
//! - Apply quota validation before any create request leaves the client.
//! - Resynchronize from the server after every mutation.
//!
//! # Invariants
//! - The collection is only ever replaced by a full listing; the client never
//!   appends, removes or reorders locally.
//! - Listing failures leave the collection untouched and are logged only.
//! - Deletes need a prior confirmation of an id present in the collection.
//! - `clear` bumps the generation; completions from an older generation are
//!   discarded.

use super::{lock, RequestSlot, SlotGuard};
use crate::api::{ApiError, NoteApi};
use crate::error::OperationError;
use crate::model::credential::BearerToken;
use crate::model::note::{NoteCollection, NoteId};
use crate::validation::{can_submit_note, word_count, SubmitCheck, SubmitRejection};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Result of a listing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    /// Collection left unchanged.
    Failed(ApiError),
    /// The store was cleared while the listing was in flight.
    Stale,
    /// Another note request is in flight.
    Busy,
}

impl RefreshOutcome {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Failed(err) if err.is_unauthorized())
    }
}

/// Result of a create intent that did not raise an [`OperationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Server accepted the note; the draft was cleared.
    Created { refresh: RefreshOutcome },
    /// Submission is disabled (empty draft or full quota); nothing was sent.
    Disabled(SubmitRejection),
    Busy,
    Stale,
}

/// Result of a delete confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The delete call returned; the listing was reloaded either way.
    Completed {
        delete_error: Option<ApiError>,
        refresh: RefreshOutcome,
    },
    /// No delete was awaiting confirmation.
    NothingToConfirm,
    Busy,
    Stale,
}

impl DeleteOutcome {
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Completed {
                delete_error,
                refresh,
            } => {
                delete_error.as_ref().is_some_and(ApiError::is_unauthorized)
                    || refresh.is_unauthorized()
            }
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct NoteState {
    notes: NoteCollection,
    draft: String,
    pending_delete: Option<NoteId>,
    slot: RequestSlot,
    generation: u64,
}

fn note_slot(state: &mut NoteState) -> &mut RequestSlot {
    &mut state.slot
}

/// Owner of the note collection and the draft.
///
/// Callers gate on authentication; the store only attaches the token it is given.
pub struct NoteStore<A: NoteApi> {
    api: Arc<A>,
    state: Mutex<NoteState>,
}

impl<A: NoteApi> NoteStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Mutex::new(NoteState::default()),
        }
    }

    pub fn notes(&self) -> NoteCollection {
        lock(&self.state).notes.clone()
    }

    pub fn note_count(&self) -> usize {
        lock(&self.state).notes.len()
    }

    pub fn draft(&self) -> String {
        lock(&self.state).draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.state).draft = text.into();
    }

    pub fn pending_delete(&self) -> Option<NoteId> {
        lock(&self.state).pending_delete.clone()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).slot.is_busy()
    }

    /// Current draft checked against both quotas.
    pub fn submit_check(&self) -> SubmitCheck {
        let state = lock(&self.state);
        can_submit_note(&state.draft, state.notes.len())
    }

    pub fn draft_word_count(&self) -> usize {
        word_count(&lock(&self.state).draft)
    }

    /// Drops notes, draft and any pending confirmation, abandoning in-flight work.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.notes = NoteCollection::default();
        state.draft.clear();
        state.pending_delete = None;
        state.slot.reset();
        state.generation += 1;
        debug!("event=notes_clear module=notes status=ok");
    }

    /// Replaces the collection with the current server listing.
    pub async fn refresh(&self, token: &BearerToken) -> RefreshOutcome {
        let Some(_guard) = SlotGuard::acquire(&self.state, note_slot) else {
            debug!("event=notes_refresh module=notes status=skipped reason=busy");
            return RefreshOutcome::Busy;
        };
        let generation = lock(&self.state).generation;
        self.reload(token, generation).await
    }

    /// Submits `draft_text` as a new note.
    ///
    /// # Errors
    /// - `ValidationRejected` when the draft is over the word limit; no request
    ///   is sent.
    /// - `MutationFailed` / `NetworkUnreachable` when the server rejects the
    ///   note or cannot be reached; draft and collection stay unchanged.
    pub async fn create(
        &self,
        token: &BearerToken,
        draft_text: &str,
    ) -> Result<CreateOutcome, OperationError> {
        let Some(_guard) = SlotGuard::acquire(&self.state, note_slot) else {
            debug!("event=note_create module=notes status=skipped reason=busy");
            return Ok(CreateOutcome::Busy);
        };
        let (generation, count) = {
            let state = lock(&self.state);
            (state.generation, state.notes.len())
        };

        if let SubmitCheck::Rejected(rejection) = can_submit_note(draft_text, count) {
            info!(
                "event=note_create module=notes status=rejected reason={:?} note_count={}",
                rejection, count
            );
            return if rejection.is_error() {
                Err(OperationError::validation(rejection))
            } else {
                Ok(CreateOutcome::Disabled(rejection))
            };
        }

        let content = draft_text.trim();
        let result = self.api.create_note(token, content).await;

        {
            let mut state = lock(&self.state);
            if state.generation != generation {
                info!("event=note_create module=notes status=skipped reason=stale");
                return Ok(CreateOutcome::Stale);
            }
            if let Err(err) = result {
                warn!(
                    "event=note_create module=notes status=error error_code={}",
                    err.code()
                );
                return Err(OperationError::from_create(&err));
            }
            state.draft.clear();
        }
        info!(
            "event=note_create module=notes status=ok words={}",
            word_count(content)
        );

        let refresh = self.reload(token, generation).await;
        Ok(CreateOutcome::Created { refresh })
    }

    /// First step of a delete: remembers `id` until confirmed or cancelled.
    ///
    /// Returns `false` (and leaves any earlier request in place) when `id` is
    /// not in the current collection.
    pub fn request_delete(&self, id: NoteId) -> bool {
        let mut state = lock(&self.state);
        if !state.notes.contains(&id) {
            return false;
        }
        state.pending_delete = Some(id);
        true
    }

    pub fn cancel_delete(&self) {
        lock(&self.state).pending_delete = None;
    }

    /// Sends the confirmed delete, then reloads the listing whatever the
    /// delete call reported.
    pub async fn confirm_delete(&self, token: &BearerToken) -> DeleteOutcome {
        let Some(_guard) = SlotGuard::acquire(&self.state, note_slot) else {
            debug!("event=note_delete module=notes status=skipped reason=busy");
            return DeleteOutcome::Busy;
        };
        let (generation, id) = {
            let mut state = lock(&self.state);
            match state.pending_delete.take() {
                Some(id) => (state.generation, id),
                None => return DeleteOutcome::NothingToConfirm,
            }
        };

        let delete_error = match self.api.delete_note(token, &id).await {
            Ok(()) => {
                info!("event=note_delete module=notes status=ok note_id={}", id);
                None
            }
            Err(err) => {
                warn!(
                    "event=note_delete module=notes status=error note_id={} error_code={}",
                    id,
                    err.code()
                );
                Some(err)
            }
        };

        if lock(&self.state).generation != generation {
            info!("event=note_delete module=notes status=skipped reason=stale");
            return DeleteOutcome::Stale;
        }
        let refresh = self.reload(token, generation).await;
        DeleteOutcome::Completed {
            delete_error,
            refresh,
        }
    }

    async fn reload(&self, token: &BearerToken, generation: u64) -> RefreshOutcome {
        let result = self.api.list_notes(token).await;

        let mut state = lock(&self.state);
        if state.generation != generation {
            info!("event=notes_refresh module=notes status=skipped reason=stale");
            return RefreshOutcome::Stale;
        }
        match result {
            Ok(notes) => {
                let notes = NoteCollection::from(notes);
                if let Some(id) = &state.pending_delete {
                    if !notes.contains(id) {
                        state.pending_delete = None;
                    }
                }
                let count = notes.len();
                state.notes = notes;
                info!("event=notes_refresh module=notes status=ok note_count={}", count);
                RefreshOutcome::Applied { count }
            }
            Err(err) => {
                warn!(
                    "event=notes_refresh module=notes status=error error_code={} error={}",
                    err.code(),
                    err
                );
                RefreshOutcome::Failed(err)
            }
        }
    }
}
