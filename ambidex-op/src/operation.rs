//! Operations: immutable routine factories plus the three calling
//! conventions.

use crate::builder::OperationBuilder;
use crate::routine::OperationRoutine;
use ambidex_drive::{blocking, trampoline};
use ambidex_protocol::{BoxError, Completion, Descriptor, RoutineError};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Blocking handler: runs the algorithm to completion on the caller.
pub type BlockingFn<A, T> = Box<dyn Fn(A) -> Result<T, BoxError> + Send + Sync>;

/// Future-returning non-blocking handler.
pub type FutureFn<A, T> = Box<dyn Fn(A) -> BoxFuture<'static, Result<T, BoxError>> + Send + Sync>;

/// Completion-accepting non-blocking handler. Returning `Err`
/// synchronously is an immediate failure of the result slot.
pub type ErrbackFn<A, T> = Box<dyn Fn(A, Completion<T>) -> Result<(), BoxError> + Send + Sync>;

/// The non-blocking side of an operation.
pub(crate) enum NonBlocking<A, T> {
    /// Spawn the returned future; its output settles the slot.
    Future(FutureFn<A, T>),
    /// Hand the completion pair to the handler.
    Errback(ErrbackFn<A, T>),
    /// Neither was configured: run the blocking handler and resolve its
    /// result immediately.
    Fallback,
}

pub(crate) struct HandlerSet<A, T> {
    pub(crate) blocking: BlockingFn<A, T>,
    pub(crate) non_blocking: NonBlocking<A, T>,
}

/// A named, fixed-arity factory producing one suspendable routine per
/// invocation. Immutable once constructed; clones share the handlers.
pub struct Operation<A, T> {
    descriptor: Descriptor,
    handlers: Arc<HandlerSet<A, T>>,
}

impl<A, T> std::fmt::Debug for Operation<A, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl<A, T> Clone for Operation<A, T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            handlers: Arc::clone(&self.handlers),
        }
    }
}

impl<A, T> Operation<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    pub(crate) fn from_parts(
        descriptor: Descriptor,
        blocking: BlockingFn<A, T>,
        non_blocking: NonBlocking<A, T>,
    ) -> Self {
        Self {
            descriptor,
            handlers: Arc::new(HandlerSet {
                blocking,
                non_blocking,
            }),
        }
    }

    /// Start building an operation.
    pub fn builder() -> OperationBuilder<A, T> {
        OperationBuilder::new()
    }

    /// The operation's name and arity.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Produce a routine closing over `args`. The routine has done no
    /// work yet; hand it to an evaluator or a combinator.
    pub fn invoke(&self, args: A) -> OperationRoutine<A, T> {
        OperationRoutine::new(Arc::clone(&self.handlers), args)
    }

    /// Blocking convention: call it and get the value.
    ///
    /// Side-effect-identical to calling the blocking handler directly;
    /// purely synchronous call sites never observe asynchrony, and no
    /// non-blocking resources are allocated.
    pub fn call_sync(&self, args: A) -> Result<T, RoutineError> {
        blocking::drive(self.invoke(args))
    }

    /// Future convention: call it and await the value.
    ///
    /// The routine starts eagerly — driving begins before the returned
    /// future is first polled, the way a promise executor runs at
    /// construction. Operations with a future handler spawn it onto the
    /// ambient tokio runtime, so they must be called inside one.
    pub fn call_async(
        &self,
        args: A,
    ) -> impl Future<Output = Result<T, RoutineError>> + Send + use<A, T> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        trampoline::drive(Box::new(self.invoke(args)), move |result| {
            let _ = tx.send(result);
        });
        async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(RoutineError::Failed(
                    "routine was dropped before settling".into(),
                )),
            }
        }
    }

    /// Errback convention: call it with a completion callback, invoked
    /// exactly once with the outcome.
    pub fn call_errback<F>(&self, args: A, done: F)
    where
        F: FnOnce(Result<T, RoutineError>) + Send + 'static,
    {
        trampoline::drive(Box::new(self.invoke(args)), done);
    }
}

// -- Tests --
