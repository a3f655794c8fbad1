//! Write-once-wins holder for a suspended routine's outcome.

use crate::error::BoxError;
use std::sync::Mutex;

enum SlotState<T> {
    Empty,
    Settled(Result<T, BoxError>),
    Taken,
}

/// The outcome holder associated with one suspension.
///
/// Two completion paths (success and failure) race to write it; only
/// the first write takes effect, later writes are silently dropped.
/// That first-write-wins rule is the protocol's entire synchronization
/// discipline — there is no other shared mutable state.
pub struct ResultSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> ResultSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Empty),
        }
    }

    /// Write the outcome. Returns `true` if this write took effect,
    /// `false` if a competing write already won.
    pub fn settle(&self, result: Result<T, BoxError>) -> bool {
        let mut state = self.state.lock().expect("lock poisoned");
        match *state {
            SlotState::Empty => {
                *state = SlotState::Settled(result);
                true
            }
            _ => false,
        }
    }

    /// Move the outcome out. Returns `None` if the slot never settled
    /// or was already taken; later writes stay dropped either way.
    pub fn take(&self) -> Option<Result<T, BoxError>> {
        let mut state = self.state.lock().expect("lock poisoned");
        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Settled(result) => Some(result),
            SlotState::Empty => {
                *state = SlotState::Empty;
                None
            }
            SlotState::Taken => None,
        }
    }

    /// Whether a write has already won.
    pub fn is_settled(&self) -> bool {
        !matches!(*self.state.lock().expect("lock poisoned"), SlotState::Empty)
    }
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Tests --
