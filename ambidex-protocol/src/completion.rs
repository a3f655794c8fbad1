//! Slot and token bundled into one settle handle.

use crate::error::BoxError;
use crate::slot::ResultSlot;
use crate::token::ResumeToken;
use std::sync::Arc;

/// The success/failure pair handed to a non-blocking handler, expressed
/// as a single cloneable value: settling writes the routine's result
/// slot and, if the write won, fires the resume token.
///
/// Clones share the same slot, so any number of competing callers can
/// hold one; the first to settle decides the outcome and everyone else
/// is a silent no-op. This is exactly the discipline the race
/// combinator leans on.
pub struct Completion<T> {
    slot: Arc<ResultSlot<T>>,
    token: ResumeToken,
}

impl<T> Completion<T> {
    /// Bind a slot and the token that announces its population.
    pub fn new(slot: Arc<ResultSlot<T>>, token: ResumeToken) -> Self {
        Self { slot, token }
    }

    /// Settle with a success value.
    pub fn resolve(&self, value: T) {
        self.settle(Ok(value));
    }

    /// Settle with a failure reason.
    pub fn reject(&self, reason: impl Into<BoxError>) {
        self.settle(Err(reason.into()));
    }

    /// Settle with an outcome. Returns `true` if this settlement won
    /// the slot, `false` if it lost the race and was dropped.
    pub fn settle(&self, result: Result<T, BoxError>) -> bool {
        if self.slot.settle(result) {
            self.token.fire();
            true
        } else {
            false
        }
    }
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            token: self.token.clone(),
        }
    }
}

// -- Tests --
