//! Name-keyed dispatch over erased operations.

use crate::erased::{DynErrback, Erased, OperationDyn};
use ambidex_op::Operation;
use ambidex_protocol::{RoutineError, UsageError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Dispatch-layer errors. Routine-level outcomes (protocol violations,
/// domain failures) pass through as [`DispatchError::Routine`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No operation is registered under the given name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The argument vector does not match the descriptor's arity.
    #[error("{operation} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// The operation that was dispatched.
        operation: String,
        /// Arity recorded in the descriptor.
        expected: usize,
        /// Number of arguments supplied.
        got: usize,
    },

    /// JSON conversion of arguments or results failed.
    #[error("argument conversion failed: {0}")]
    Codec(String),

    /// A convention was misused.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// The underlying routine did not produce a value.
    #[error(transparent)]
    Routine(#[from] RoutineError),
}

/// A set of operations, registered under their descriptor names and
/// invoked dynamically with JSON arguments.
///
/// This is the adapter layer for tooling that cannot know argument
/// types at compile time; typed call sites should hold the
/// [`Operation`] itself.
#[derive(Default)]
pub struct OperationSet {
    ops: HashMap<String, Arc<dyn OperationDyn>>,
}

impl OperationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation under its descriptor name. A later
    /// registration with the same name replaces the earlier one.
    pub fn register<A, T>(&mut self, op: Operation<A, T>)
    where
        A: DeserializeOwned + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let name = op.descriptor().name.clone();
        tracing::debug!(operation = %name, arity = op.descriptor().arity, "ambidex.registry.register");
        self.ops.insert(name, Arc::new(Erased::new(op)));
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn OperationDyn>> {
        self.ops.get(name).map(Arc::clone)
    }

    /// Names of every registered operation, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    fn lookup(&self, name: &str) -> Result<&Arc<dyn OperationDyn>, DispatchError> {
        self.ops
            .get(name)
            .ok_or_else(|| DispatchError::UnknownOperation(name.to_string()))
    }

    /// Dispatch under the blocking convention.
    pub fn call_sync(&self, name: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        tracing::debug!(operation = name, "ambidex.registry.call_sync");
        self.lookup(name)?.call_sync(args)
    }

    /// Dispatch under the future convention.
    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        tracing::debug!(operation = name, "ambidex.registry.call");
        self.lookup(name)?.call(args).await
    }

    /// Dispatch under the errback convention.
    ///
    /// A missing callback fails synchronously with
    /// [`UsageError::MissingCallback`] before any lookup or decoding
    /// happens; every later failure is delivered through the callback
    /// instead.
    pub fn call_errback(
        &self,
        name: &str,
        args: Vec<Value>,
        done: Option<DynErrback>,
    ) -> Result<(), DispatchError> {
        let Some(done) = done else {
            return Err(UsageError::MissingCallback.into());
        };
        tracing::debug!(operation = name, "ambidex.registry.call_errback");
        match self.lookup(name) {
            Ok(op) => {
                op.call_errback(args, done);
                Ok(())
            }
            Err(error) => {
                done(Err(error));
                Ok(())
            }
        }
    }
}

// -- Tests --
