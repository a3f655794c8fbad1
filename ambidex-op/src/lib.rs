//! # ambidex-op — write the algorithm once, pick the convention per call
//!
//! An [`Operation`] pairs a mandatory blocking handler with at most one
//! non-blocking handler (future-returning or completion-accepting) and
//! produces one suspendable routine per invocation. The routine follows
//! the Start/Suspend handshake from `ambidex-protocol`, so the same
//! body runs under three calling conventions:
//!
//! - [`Operation::call_sync`] — run to completion on the caller,
//!   driven by the blocking evaluator.
//! - [`Operation::call_async`] — a future of the value, driven by the
//!   trampoline.
//! - [`Operation::call_errback`] — a completion callback invoked
//!   exactly once, also driven by the trampoline.
//!
//! The [`all`] and [`race`] combinators compose already-invoked
//! routines into one routine, and are themselves operations.

#![deny(missing_docs)]

pub mod builder;
pub mod combinators;
pub mod operation;
pub mod routine;

pub use builder::OperationBuilder;
pub use combinators::{Routines, all, race, race_first, wait_for_all};
pub use operation::{BlockingFn, ErrbackFn, FutureFn, Operation};
pub use routine::OperationRoutine;
