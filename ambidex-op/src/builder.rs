//! Construction-time validation and metadata inference for operations.

use crate::operation::{BlockingFn, ErrbackFn, FutureFn, NonBlocking, Operation};
use ambidex_protocol::{Arity, BoxError, Completion, Descriptor, OptionsError};
use futures_util::future::BoxFuture;
use std::future::Future;

/// Builds an [`Operation`] from a set of handlers plus optional
/// metadata.
///
/// The blocking handler is mandatory. At most one of the future handler
/// and the errback handler may be set; both at once is an
/// [`OptionsError::BothNonBlocking`]. The name is taken explicitly from
/// [`name`](Self::name), or inferred from a declared handler name (the
/// `*_named` registration methods) by stripping the conventional
/// `_sync` / `_async` / `_errback` suffix; no name at all is an
/// [`OptionsError::NoName`]. Arity is taken from
/// [`arity`](Self::arity) or inferred from the argument tuple.
pub struct OperationBuilder<A, T> {
    name: Option<String>,
    arity: Option<usize>,
    blocking: Option<(Option<&'static str>, BlockingFn<A, T>)>,
    future: Option<(Option<&'static str>, FutureFn<A, T>)>,
    errback: Option<(Option<&'static str>, ErrbackFn<A, T>)>,
}

impl<A, T> OperationBuilder<A, T> {
    /// Start with no handlers and no metadata.
    pub fn new() -> Self {
        Self {
            name: None,
            arity: None,
            blocking: None,
            future: None,
            errback: None,
        }
    }

    /// Set the operation name explicitly. Beats any inferred name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the inferred arity.
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Register the blocking handler.
    pub fn blocking<F>(self, handler: F) -> Self
    where
        F: Fn(A) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.blocking_inner(None, handler)
    }

    /// Register the blocking handler under a declared name, e.g.
    /// `"minify_sync"`. Used for name inference.
    pub fn blocking_named<F>(self, declared: &'static str, handler: F) -> Self
    where
        F: Fn(A) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.blocking_inner(Some(declared), handler)
    }

    fn blocking_inner<F>(mut self, declared: Option<&'static str>, handler: F) -> Self
    where
        F: Fn(A) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.blocking = Some((declared, Box::new(handler)));
        self
    }

    /// Register a future-returning non-blocking handler.
    pub fn future<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        self.future_inner(None, handler)
    }

    /// Register a future-returning non-blocking handler under a
    /// declared name, e.g. `"minify_async"`.
    pub fn future_named<F, Fut>(self, declared: &'static str, handler: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        self.future_inner(Some(declared), handler)
    }

    fn future_inner<F, Fut>(mut self, declared: Option<&'static str>, handler: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let boxed: FutureFn<A, T> = Box::new(move |args| {
            let future: BoxFuture<'static, Result<T, BoxError>> = Box::pin(handler(args));
            future
        });
        self.future = Some((declared, boxed));
        self
    }

    /// Register a completion-accepting non-blocking handler.
    pub fn errback<F>(self, handler: F) -> Self
    where
        F: Fn(A, Completion<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.errback_inner(None, handler)
    }

    /// Register a completion-accepting non-blocking handler under a
    /// declared name.
    pub fn errback_named<F>(self, declared: &'static str, handler: F) -> Self
    where
        F: Fn(A, Completion<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.errback_inner(Some(declared), handler)
    }

    fn errback_inner<F>(mut self, declared: Option<&'static str>, handler: F) -> Self
    where
        F: Fn(A, Completion<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.errback = Some((declared, Box::new(handler)));
        self
    }

    /// Validate the configuration and produce the operation.
    pub fn build(self) -> Result<Operation<A, T>, OptionsError>
    where
        A: Arity + Send + 'static,
        T: Send + 'static,
    {
        if self.future.is_some() && self.errback.is_some() {
            return Err(OptionsError::BothNonBlocking);
        }
        let Some((blocking_name, blocking)) = self.blocking else {
            return Err(OptionsError::MissingBlocking);
        };

        let future_name = self.future.as_ref().and_then(|(declared, _)| *declared);
        let errback_name = self.errback.as_ref().and_then(|(declared, _)| *declared);
        let name = match self.name {
            Some(name) => name,
            None => infer_name(blocking_name, future_name, errback_name)
                .ok_or(OptionsError::NoName)?,
        };
        let arity = self.arity.unwrap_or(A::ARITY);

        let non_blocking = match (self.future, self.errback) {
            (Some((_, handler)), None) => NonBlocking::Future(handler),
            (None, Some((_, handler))) => NonBlocking::Errback(handler),
            _ => NonBlocking::Fallback,
        };

        Ok(Operation::from_parts(
            Descriptor::new(name, arity),
            blocking,
            non_blocking,
        ))
    }
}

impl<A, T> Default for OperationBuilder<A, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick a name from the declared handler names: the blocking handler
/// names the algorithm, the non-blocking ones only qualify how it
/// completes.
fn infer_name(
    blocking: Option<&str>,
    future: Option<&str>,
    errback: Option<&str>,
) -> Option<String> {
    blocking
        .and_then(|declared| stem_of(declared, "_sync"))
        .or_else(|| future.and_then(|declared| stem_of(declared, "_async")))
        .or_else(|| errback.and_then(|declared| stem_of(declared, "_errback")))
}

fn stem_of(declared: &str, suffix: &str) -> Option<String> {
    let stem = declared.strip_suffix(suffix).unwrap_or(declared);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

// -- Tests --
