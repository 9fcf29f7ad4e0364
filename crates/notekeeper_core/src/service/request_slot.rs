//! In-flight request bookkeeping shared by both stores.

use std::sync::{Mutex, MutexGuard};

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// At most one outstanding request, identified by a ticket.
///
/// Tickets let `reset` abandon a request (on logout) without the abandoned
/// request later clearing a newer one.
#[derive(Debug, Default)]
pub(crate) struct RequestSlot {
    active: Option<u64>,
    next_ticket: u64,
}

impl RequestSlot {
    pub(crate) fn try_begin(&mut self) -> Option<u64> {
        if self.active.is_some() {
            return None;
        }
        self.next_ticket += 1;
        self.active = Some(self.next_ticket);
        Some(self.next_ticket)
    }

    pub(crate) fn finish(&mut self, ticket: u64) {
        if self.active == Some(ticket) {
            self.active = None;
        }
    }

    pub(crate) fn reset(&mut self) {
        self.active = None;
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.active.is_some()
    }
}

/// Releases a [`RequestSlot`] ticket when dropped.
pub(crate) struct SlotGuard<'a, S> {
    state: &'a Mutex<S>,
    slot: fn(&mut S) -> &mut RequestSlot,
    ticket: u64,
}

impl<'a, S> SlotGuard<'a, S> {
    /// Claims the slot selected by `slot`, or `None` if it is busy.
    pub(crate) fn acquire(state: &'a Mutex<S>, slot: fn(&mut S) -> &mut RequestSlot) -> Option<Self> {
        let ticket = slot(&mut lock(state)).try_begin()?;
        Some(Self {
            state,
            slot,
            ticket,
        })
    }
}

impl<S> Drop for SlotGuard<'_, S> {
    fn drop(&mut self) {
        (self.slot)(&mut lock(self.state)).finish(self.ticket);
    }
}
