//! The asynchronous evaluator.
//!
//! Drives a routine that takes its non-blocking path, supporting
//! handlers that settle before the driving call returns (resume in the
//! same call frame, no stack growth) and handlers that settle later
//! (park, and let the token fire re-enter the step loop).

use ambidex_protocol::{BoxRoutine, ProtocolError, ResumeToken, RoutineError, Signal, Step};
use std::sync::{Arc, Mutex};

/// Where the trampoline currently is relative to its step loop.
enum Phase {
    /// Control is inside `step`; a token fire only marks the flag.
    InStep {
        /// The token fired while the step was still running.
        resumed_inline: bool,
    },
    /// The drive returned with a suspension pending; the next token
    /// fire re-enters `step`.
    Parked,
    /// The routine completed or faulted; late fires are ignored.
    Done,
}

type Settle<T> = Box<dyn FnOnce(Result<T, RoutineError>) + Send>;

struct Trampoline<T> {
    routine: Mutex<BoxRoutine<T>>,
    phase: Mutex<Phase>,
    settle: Mutex<Option<Settle<T>>>,
}

/// Drive `routine` to completion, reporting the outcome through
/// `settle` exactly once.
///
/// Each handshake round resumes the routine with a fresh
/// [`ResumeToken`]. If the token fires while the step is still running
/// (the non-blocking work settled synchronously), the loop resumes the
/// routine immediately in the same call frame; otherwise the trampoline
/// parks and the eventual fire re-enters the step from the top —
/// possibly on another thread.
///
/// Protocol violations are injected into the routine's own failure
/// channel via [`ambidex_protocol::Routine::fail`] before being
/// reported, so diagnostics attribute the fault to the offending
/// suspension point.
pub fn drive<T, F>(routine: BoxRoutine<T>, settle: F)
where
    T: Send + 'static,
    F: FnOnce(Result<T, RoutineError>) + Send + 'static,
{
    let trampoline = Arc::new(Trampoline {
        routine: Mutex::new(routine),
        phase: Mutex::new(Phase::Parked),
        settle: Mutex::new(Some(Box::new(settle))),
    });
    step(&trampoline);
}

fn step<T: Send + 'static>(this: &Arc<Trampoline<T>>) {
    let mut routine = this.routine.lock().expect("lock poisoned");
    loop {
        match routine.resume(None) {
            Step::Complete(Ok(value)) => return finish(this, Ok(value)),
            Step::Complete(Err(reason)) => {
                return finish(this, Err(RoutineError::Failed(reason)));
            }
            Step::Yielded(Signal::Start) => {}
            Step::Yielded(got) => {
                let error = ProtocolError::ExpectedStart { got };
                routine.fail(error.clone());
                return finish(this, Err(error.into()));
            }
        }

        *this.phase.lock().expect("lock poisoned") = Phase::InStep {
            resumed_inline: false,
        };
        let token = {
            let shared = Arc::clone(this);
            ResumeToken::new(move || fire(&shared))
        };

        match routine.resume(Some(token)) {
            Step::Yielded(Signal::Suspend) => {}
            Step::Complete(_) => {
                let error = ProtocolError::UnexpectedCompletion;
                routine.fail(error.clone());
                return finish(this, Err(error.into()));
            }
            Step::Yielded(got) => {
                let error = ProtocolError::ExpectedSuspend { got };
                routine.fail(error.clone());
                return finish(this, Err(error.into()));
            }
        }

        // Past this point a token fire re-enters `step` instead of
        // marking the flag.
        let resumed_inline = {
            let mut phase = this.phase.lock().expect("lock poisoned");
            let inline = matches!(*phase, Phase::InStep { resumed_inline: true });
            *phase = if inline {
                Phase::InStep {
                    resumed_inline: false,
                }
            } else {
                Phase::Parked
            };
            inline
        };

        if !resumed_inline {
            tracing::trace!("ambidex.trampoline.park");
            return;
        }
        tracing::trace!("ambidex.trampoline.resume_inline");
    }
}

fn fire<T: Send + 'static>(this: &Arc<Trampoline<T>>) {
    let reenter = {
        let mut phase = this.phase.lock().expect("lock poisoned");
        match *phase {
            Phase::InStep {
                ref mut resumed_inline,
            } => {
                *resumed_inline = true;
                false
            }
            Phase::Parked => true,
            Phase::Done => false,
        }
    };
    if reenter {
        tracing::trace!("ambidex.trampoline.reenter");
        step(this);
    }
}

fn finish<T>(this: &Arc<Trampoline<T>>, result: Result<T, RoutineError>) {
    *this.phase.lock().expect("lock poisoned") = Phase::Done;
    let settle = this.settle.lock().expect("lock poisoned").take();
    if let Some(settle) = settle {
        settle(result);
    }
}

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;
    use ambidex_protocol::Routine;
    use ambidex_protocol::test_utils::{ScriptStep, ScriptedRoutine};
    use std::sync::mpsc;

    fn outcome_of<T: Send + 'static>(
        routine: ScriptedRoutine<T>,
    ) -> Arc<Mutex<Option<Result<T, RoutineError>>>> {
        let outcome = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&outcome);
        drive(routine.boxed(), move |result| {
            *seen.lock().unwrap() = Some(result);
        });
        outcome
    }

    #[test]
    fn synchronous_settlement_completes_in_one_driving_call() {
        let routine = ScriptedRoutine::new([
            ScriptStep::Yield(Signal::Start),
            ScriptStep::FireAndYield(Signal::Suspend),
            ScriptStep::Finish(Ok(7)),
        ]);

        let outcome = outcome_of(routine);
        assert_eq!(outcome.lock().unwrap().take().unwrap().unwrap(), 7);
    }

    #[test]
    fn long_inline_chains_complete_without_reentry() {
        let mut steps = Vec::new();
        for _ in 0..500 {
            steps.push(ScriptStep::Yield(Signal::Start));
            steps.push(ScriptStep::FireAndYield(Signal::Suspend));
        }
        steps.push(ScriptStep::Finish(Ok("deep")));
        let routine = ScriptedRoutine::new(steps);

        let outcome = outcome_of(routine);
        assert_eq!(outcome.lock().unwrap().take().unwrap().unwrap(), "deep");
    }

    #[test]
    fn parked_trampoline_resumes_when_the_token_fires_later() {
        let routine = ScriptedRoutine::new([
            ScriptStep::Yield(Signal::Start),
            ScriptStep::CaptureAndYield(Signal::Suspend),
            ScriptStep::Finish(Ok(99)),
        ]);
        let captured = routine.captured();

        let outcome = outcome_of(routine);
        assert!(outcome.lock().unwrap().is_none(), "should be parked");

        let token = captured.lock().unwrap().pop().unwrap();
        token.fire();
        assert_eq!(outcome.lock().unwrap().take().unwrap().unwrap(), 99);
    }

    #[test]
    fn token_may_fire_from_another_thread() {
        let routine = ScriptedRoutine::new([
            ScriptStep::Yield(Signal::Start),
            ScriptStep::CaptureAndYield(Signal::Suspend),
            ScriptStep::Finish(Ok(1)),
        ]);
        let captured = routine.captured();

        let (tx, rx) = mpsc::channel();
        drive(routine.boxed(), move |result| {
            tx.send(result).unwrap();
        });

        let token = captured.lock().unwrap().pop().unwrap();
        let handle = std::thread::spawn(move || token.fire());
        handle.join().unwrap();

        assert_eq!(rx.recv().unwrap().unwrap(), 1);
    }

    #[test]
    fn completion_while_a_suspension_is_owed_is_a_protocol_error() {
        let routine = ScriptedRoutine::new([
            ScriptStep::Yield(Signal::Start),
            ScriptStep::Finish(Ok(0)),
        ]);
        let injected = routine.injected();

        let outcome = outcome_of(routine);
        let err = outcome.lock().unwrap().take().unwrap().unwrap_err();
        assert!(matches!(
            err,
            RoutineError::Protocol(ProtocolError::UnexpectedCompletion)
        ));
        assert_eq!(
            injected.lock().unwrap().as_slice(),
            &[ProtocolError::UnexpectedCompletion]
        );
    }

    #[test]
    fn start_in_place_of_suspend_is_a_protocol_error() {
        let routine = ScriptedRoutine::<u8>::new([
            ScriptStep::Yield(Signal::Start),
            ScriptStep::Yield(Signal::Start),
        ]);

        let outcome = outcome_of(routine);
        let err = outcome.lock().unwrap().take().unwrap().unwrap_err();
        assert!(matches!(
            err,
            RoutineError::Protocol(ProtocolError::ExpectedSuspend { got: Signal::Start })
        ));
    }

    #[test]
    fn domain_failure_is_distinguishable_from_a_protocol_error() {
        let routine = ScriptedRoutine::<u8>::new([
            ScriptStep::Yield(Signal::Start),
            ScriptStep::FireAndYield(Signal::Suspend),
            ScriptStep::Finish(Err("handler blew up".into())),
        ]);

        let outcome = outcome_of(routine);
        let err = outcome.lock().unwrap().take().unwrap().unwrap_err();
        assert!(!err.is_protocol());
        assert_eq!(err.to_string(), "handler blew up");
    }
}
