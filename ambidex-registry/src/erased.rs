//! Object-safe erasure over typed operations.
//!
//! Arguments arrive as a `Vec<serde_json::Value>` and are checked
//! against the descriptor's arity before being decoded into the
//! operation's argument tuple; results are encoded back to JSON.

use crate::registry::DispatchError;
use ambidex_op::Operation;
use ambidex_protocol::Descriptor;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Completion callback for the dynamic errback convention.
pub type DynErrback = Box<dyn FnOnce(Result<Value, DispatchError>) + Send>;

/// An operation with its argument and result types erased to JSON,
/// dispatchable under any of the three conventions.
#[async_trait]
pub trait OperationDyn: Send + Sync {
    /// The operation's name and arity.
    fn descriptor(&self) -> &Descriptor;

    /// Blocking convention over JSON arguments.
    fn call_sync(&self, args: Vec<Value>) -> Result<Value, DispatchError>;

    /// Future convention over JSON arguments.
    async fn call(&self, args: Vec<Value>) -> Result<Value, DispatchError>;

    /// Errback convention over JSON arguments. `done` is invoked
    /// exactly once.
    fn call_errback(&self, args: Vec<Value>, done: DynErrback);
}

pub(crate) struct Erased<A, T> {
    op: Operation<A, T>,
}

impl<A, T> Erased<A, T>
where
    A: DeserializeOwned + Send + 'static,
    T: Serialize + Send + 'static,
{
    pub(crate) fn new(op: Operation<A, T>) -> Self {
        Self { op }
    }

    fn decode(&self, args: Vec<Value>) -> Result<A, DispatchError> {
        let descriptor = self.op.descriptor();
        if args.len() != descriptor.arity {
            return Err(DispatchError::ArityMismatch {
                operation: descriptor.name.clone(),
                expected: descriptor.arity,
                got: args.len(),
            });
        }
        // A zero-arity tuple deserializes from null, not from [].
        let payload = if args.is_empty() {
            Value::Null
        } else {
            Value::Array(args)
        };
        serde_json::from_value(payload).map_err(|error| DispatchError::Codec(error.to_string()))
    }
}

fn encode<T: Serialize>(value: T) -> Result<Value, DispatchError> {
    serde_json::to_value(value).map_err(|error| DispatchError::Codec(error.to_string()))
}

#[async_trait]
impl<A, T> OperationDyn for Erased<A, T>
where
    A: DeserializeOwned + Send + 'static,
    T: Serialize + Send + 'static,
{
    fn descriptor(&self) -> &Descriptor {
        self.op.descriptor()
    }

    fn call_sync(&self, args: Vec<Value>) -> Result<Value, DispatchError> {
        let args = self.decode(args)?;
        encode(self.op.call_sync(args)?)
    }

    async fn call(&self, args: Vec<Value>) -> Result<Value, DispatchError> {
        let args = self.decode(args)?;
        encode(self.op.call_async(args).await?)
    }

    fn call_errback(&self, args: Vec<Value>, done: DynErrback) {
        let args = match self.decode(args) {
            Ok(args) => args,
            Err(error) => {
                done(Err(error));
                return;
            }
        };
        self.op.call_errback(args, move |result| {
            done(result.map_err(DispatchError::from).and_then(encode));
        });
    }
}
