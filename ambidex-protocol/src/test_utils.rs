//! Scripted routines for exercising drivers in tests.
//!
//! A [`ScriptedRoutine`] replays a fixed sequence of handshake steps,
//! which makes it easy to stage both well-behaved routines and every
//! flavor of protocol breach without involving an operation.

use crate::error::{BoxError, ProtocolError};
use crate::routine::{Routine, Step};
use crate::signal::Signal;
use crate::token::ResumeToken;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One step of a scripted routine.
pub enum ScriptStep<T> {
    /// Yield the given signal and do nothing else.
    Yield(Signal),
    /// Fire the received resume token immediately (a synchronous
    /// settlement), then yield the given signal.
    FireAndYield(Signal),
    /// Stash the received resume token for the test to fire later (an
    /// asynchronous settlement), then yield the given signal.
    CaptureAndYield(Signal),
    /// Complete with the given outcome.
    Finish(Result<T, BoxError>),
}

/// A routine that follows a pre-written script instead of running real
/// handlers.
pub struct ScriptedRoutine<T> {
    steps: VecDeque<ScriptStep<T>>,
    captured: Arc<Mutex<Vec<ResumeToken>>>,
    injected: Arc<Mutex<Vec<ProtocolError>>>,
}

impl<T: Send> ScriptedRoutine<T> {
    /// Build a routine from a script.
    pub fn new(steps: impl IntoIterator<Item = ScriptStep<T>>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            captured: Arc::new(Mutex::new(Vec::new())),
            injected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A well-behaved blocking-path routine: yield start, complete.
    pub fn completing(value: T) -> Self {
        Self::new([ScriptStep::Yield(Signal::Start), ScriptStep::Finish(Ok(value))])
    }

    /// Tokens stashed by [`ScriptStep::CaptureAndYield`], in order.
    pub fn captured(&self) -> Arc<Mutex<Vec<ResumeToken>>> {
        Arc::clone(&self.captured)
    }

    /// Protocol errors a driver injected via [`Routine::fail`].
    pub fn injected(&self) -> Arc<Mutex<Vec<ProtocolError>>> {
        Arc::clone(&self.injected)
    }
}

impl<T: Send> Routine for ScriptedRoutine<T> {
    type Output = T;

    fn resume(&mut self, token: Option<ResumeToken>) -> Step<T> {
        match self.steps.pop_front() {
            None => Step::Complete(Err("script exhausted".into())),
            Some(ScriptStep::Yield(signal)) => Step::Yielded(signal),
            Some(ScriptStep::FireAndYield(signal)) => {
                if let Some(token) = token {
                    token.fire();
                }
                Step::Yielded(signal)
            }
            Some(ScriptStep::CaptureAndYield(signal)) => {
                if let Some(token) = token {
                    self.captured.lock().expect("lock poisoned").push(token);
                }
                Step::Yielded(signal)
            }
            Some(ScriptStep::Finish(result)) => Step::Complete(result),
        }
    }

    fn fail(&mut self, error: ProtocolError) {
        self.steps.clear();
        self.injected.lock().expect("lock poisoned").push(error);
    }
}
