//! The routine trait: one suspendable execution instance.

use crate::error::{BoxError, ProtocolError};
use crate::signal::Signal;
use crate::token::ResumeToken;

/// One observable step of a routine, as seen by its driver.
#[derive(Debug)]
pub enum Step<T> {
    /// The routine yielded a handshake sentinel and is waiting to be
    /// resumed.
    Yielded(Signal),
    /// The routine ran to completion.
    Complete(Result<T, BoxError>),
}

/// A suspendable execution instance.
///
/// The contract, from the driver's side:
///
/// 1. The first resume yields [`Signal::Start`].
/// 2. Resuming with `None` commits the routine to its blocking path; it
///    completes without yielding again.
/// 3. Resuming with a [`ResumeToken`] commits it to its non-blocking
///    path; it yields [`Signal::Suspend`], and completes on the resume
///    that follows the token firing.
///
/// A routine suspends at most once per invocation, always at the same
/// protocol point. Implementations are explicit state machines; there
/// is no hidden generator underneath.
pub trait Routine: Send {
    /// The value this routine produces on success.
    type Output;

    /// Advance the routine. `token` is the resume indicator: `None`
    /// selects the blocking path at the decision point and acknowledges
    /// yields everywhere else; `Some` hands over the token that selects
    /// the non-blocking path.
    fn resume(&mut self, token: Option<ResumeToken>) -> Step<Self::Output>;

    /// Inject a handshake breach into the routine's own failure channel.
    ///
    /// Drivers call this before reporting a [`ProtocolError`], so the
    /// fault is attributed to the suspension point that broke the
    /// contract. Implementations should tear down and go quiet; the
    /// default does nothing.
    fn fail(&mut self, error: ProtocolError) {
        let _ = error;
    }

    /// Erase this routine behind a box, for heterogeneous collections.
    fn boxed(self) -> BoxRoutine<Self::Output>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<R: Routine + ?Sized> Routine for Box<R> {
    type Output = R::Output;

    fn resume(&mut self, token: Option<ResumeToken>) -> Step<Self::Output> {
        (**self).resume(token)
    }

    fn fail(&mut self, error: ProtocolError) {
        (**self).fail(error);
    }
}

/// An already-invoked routine with its concrete type erased.
pub type BoxRoutine<T> = Box<dyn Routine<Output = T>>;
