//! # ambidex-protocol — the suspension handshake, as vocabulary
//!
//! This crate defines the protocol that lets one routine body be driven
//! either blocking or non-blocking by an external evaluator. It contains
//! no evaluator and no operation builder — only the shared types both
//! sides of the handshake agree on.
//!
//! ## The Handshake
//!
//! | Piece | Type | What it does |
//! |-------|------|-------------|
//! | Sentinels | [`Signal`] | `Start` / `Suspend`, yielded by routines |
//! | Routine | [`Routine`] | One suspendable execution instance |
//! | Slot | [`ResultSlot`] | Write-once-wins outcome holder |
//! | Token | [`ResumeToken`] | "The slot is populated, continue" |
//! | Completion | [`Completion`] | Slot + token as one settle handle |
//! | Descriptor | [`Descriptor`] | Name + arity of an operation |
//!
//! A routine yields [`Signal::Start`] exactly once. Resumed with no
//! token, it runs its blocking path to completion and never yields
//! again. Resumed with a [`ResumeToken`], it starts its non-blocking
//! path, yields [`Signal::Suspend`], and completes from its
//! [`ResultSlot`] once the token has fired. Anything else is a
//! [`ProtocolError`].
//!
//! ## Design Principle
//!
//! The handshake is operation-defined, not mechanism-defined: "yield
//! Start" means "let the driver pick the path", not "return from a
//! generator". That is what lets a blocking evaluator, a trampoline,
//! and a test harness all drive the same routine.

#![deny(missing_docs)]

pub mod completion;
pub mod descriptor;
pub mod error;
pub mod routine;
pub mod signal;
pub mod slot;
pub mod token;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use completion::Completion;
pub use descriptor::{Arity, Descriptor};
pub use error::{BoxError, OptionsError, ProtocolError, RoutineError, UsageError};
pub use routine::{BoxRoutine, Routine, Step};
pub use signal::{PROTOCOL_VERSION, Signal};
pub use slot::ResultSlot;
pub use token::ResumeToken;
