//! The synchronous evaluator.

use ambidex_protocol::{ProtocolError, Routine, RoutineError, Signal, Step};

/// Drive a routine to completion on the calling thread, assuming it
/// never needs to suspend.
///
/// Every resume passes no token, so a well-behaved routine commits to
/// its blocking path at the decision point and completes in one pass.
/// Any yield other than [`Signal::Start`] is a
/// [`ProtocolError::ExpectedStart`] — the routine body used the
/// suspension mechanism where this driver cannot honor it. The error is
/// injected into the routine's own failure channel before being
/// returned.
///
/// This path allocates no slot, no token, and touches no runtime.
pub fn drive<R: Routine>(mut routine: R) -> Result<R::Output, RoutineError> {
    loop {
        match routine.resume(None) {
            Step::Complete(Ok(value)) => return Ok(value),
            Step::Complete(Err(reason)) => return Err(RoutineError::Failed(reason)),
            Step::Yielded(Signal::Start) => {}
            Step::Yielded(got) => {
                let error = ProtocolError::ExpectedStart { got };
                routine.fail(error.clone());
                return Err(error.into());
            }
        }
    }
}

// -- Tests --
