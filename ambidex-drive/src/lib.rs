//! # ambidex-drive — evaluators for suspendable routines
//!
//! Two drivers over the same [`Routine`](ambidex_protocol::Routine)
//! contract:
//!
//! - [`blocking::drive`] — a single straight pass that never permits a
//!   suspension. Purely synchronous call sites use this and observe no
//!   asynchrony at all.
//! - [`trampoline::drive`] — permits the one suspension the protocol
//!   allows, resuming in the same call frame when the resume token
//!   fires synchronously and parking until the token fires otherwise.
//!
//! The routine's code is identical under both; picking the driver picks
//! the calling convention.

#![deny(missing_docs)]

pub mod blocking;
pub mod trampoline;
