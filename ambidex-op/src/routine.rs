//! The routine an operation produces: an explicit state machine over
//! the Start/Suspend handshake.

use crate::operation::{HandlerSet, NonBlocking};
use ambidex_protocol::{
    Completion, ProtocolError, ResultSlot, ResumeToken, Routine, Signal, Step,
};
use std::sync::Arc;

enum State {
    NotStarted,
    /// Start has been yielded; the next resume decides the path.
    Started,
    /// The non-blocking path is in flight; completion comes from the
    /// result slot.
    Suspended,
    Done,
}

/// One suspendable execution instance of an [`Operation`].
///
/// [`Operation`]: crate::operation::Operation
pub struct OperationRoutine<A, T> {
    handlers: Arc<HandlerSet<A, T>>,
    args: Option<A>,
    slot: Option<Arc<ResultSlot<T>>>,
    state: State,
}

impl<A, T> OperationRoutine<A, T> {
    pub(crate) fn new(handlers: Arc<HandlerSet<A, T>>, args: A) -> Self {
        Self {
            handlers,
            args: Some(args),
            slot: None,
            state: State::NotStarted,
        }
    }
}

impl<A, T> OperationRoutine<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    fn start_non_blocking(&mut self, args: A, token: ResumeToken) {
        let slot = Arc::new(ResultSlot::new());
        let completion = Completion::new(Arc::clone(&slot), token);
        self.slot = Some(slot);

        match &self.handlers.non_blocking {
            NonBlocking::Errback(handler) => {
                // A synchronous error from the handler is an immediate
                // failure of the slot; first write still wins.
                if let Err(reason) = handler(args, completion.clone()) {
                    completion.reject(reason);
                }
            }
            NonBlocking::Future(handler) => {
                let future = handler(args);
                tokio::spawn(async move {
                    completion.settle(future.await);
                });
            }
            NonBlocking::Fallback => {
                completion.settle((self.handlers.blocking)(args));
            }
        }
    }
}

impl<A, T> Routine for OperationRoutine<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn resume(&mut self, token: Option<ResumeToken>) -> Step<T> {
        match self.state {
            State::NotStarted => {
                self.state = State::Started;
                Step::Yielded(Signal::Start)
            }
            State::Started => {
                let Some(args) = self.args.take() else {
                    self.state = State::Done;
                    return Step::Complete(Err(Box::new(ProtocolError::OutOfTurn)));
                };
                match token {
                    None => {
                        self.state = State::Done;
                        Step::Complete((self.handlers.blocking)(args))
                    }
                    Some(token) => {
                        self.start_non_blocking(args, token);
                        self.state = State::Suspended;
                        Step::Yielded(Signal::Suspend)
                    }
                }
            }
            State::Suspended => {
                self.state = State::Done;
                match self.slot.take().and_then(|slot| slot.take()) {
                    Some(result) => Step::Complete(result),
                    None => Step::Complete(Err(Box::new(ProtocolError::OutOfTurn))),
                }
            }
            State::Done => Step::Complete(Err(Box::new(ProtocolError::OutOfTurn))),
        }
    }

    fn fail(&mut self, _error: ProtocolError) {
        self.args = None;
        self.slot = None;
        self.state = State::Done;
    }
}

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;

    fn identity() -> Operation<(u32,), u32> {
        Operation::builder()
            .name("identity")
            .blocking(|(n,)| Ok(n))
            .build()
            .unwrap()
    }

    #[test]
    fn handshake_yields_start_then_completes_on_the_blocking_path() {
        let mut routine = identity().invoke((3,));
        assert!(matches!(routine.resume(None), Step::Yielded(Signal::Start)));
        match routine.resume(None) {
            Step::Complete(Ok(value)) => assert_eq!(value, 3),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn token_resume_suspends_exactly_once() {
        let mut routine = identity().invoke((3,));
        assert!(matches!(routine.resume(None), Step::Yielded(Signal::Start)));

        let token = ResumeToken::new(|| {});
        assert!(matches!(
            routine.resume(Some(token)),
            Step::Yielded(Signal::Suspend)
        ));
        // Fallback settles the slot synchronously, so the next resume
        // completes.
        match routine.resume(None) {
            Step::Complete(Ok(value)) => assert_eq!(value, 3),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn resuming_past_completion_is_out_of_turn() {
        let mut routine = identity().invoke((3,));
        routine.resume(None);
        routine.resume(None);

        match routine.resume(None) {
            Step::Complete(Err(reason)) => {
                assert_eq!(
                    reason.downcast_ref::<ProtocolError>(),
                    Some(&ProtocolError::OutOfTurn)
                );
            }
            other => panic!("expected an out-of-turn failure, got {other:?}"),
        }
    }

    #[test]
    fn failed_routine_goes_quiet() {
        let mut routine = identity().invoke((3,));
        routine.resume(None);
        routine.fail(ProtocolError::UnexpectedCompletion);

        assert!(matches!(routine.resume(None), Step::Complete(Err(_))));
    }
}
