#![deny(missing_docs)]
//! # ambidex — umbrella crate
//!
//! Provides a single import surface for the ambidex crates: the
//! suspension protocol, the two evaluators, the operation builder with
//! its three calling conventions, the fan-out combinators, and (behind
//! the `registry` feature) dynamic JSON dispatch. Plus a `prelude` for
//! the happy path.

#[cfg(feature = "core")]
pub use ambidex_drive;
#[cfg(feature = "core")]
pub use ambidex_op;
#[cfg(feature = "core")]
pub use ambidex_protocol;
#[cfg(feature = "registry")]
pub use ambidex_registry;

/// Happy-path imports for defining and calling operations.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use ambidex_protocol::{
        BoxError, BoxRoutine, Completion, Descriptor, OptionsError, ProtocolError, ResultSlot,
        ResumeToken, Routine, RoutineError, Signal, Step, UsageError,
    };

    #[cfg(feature = "core")]
    pub use ambidex_drive::{blocking, trampoline};

    #[cfg(feature = "core")]
    pub use ambidex_op::{Operation, OperationBuilder, all, race, race_first, wait_for_all};

    #[cfg(feature = "registry")]
    pub use ambidex_registry::{DispatchError, OperationDyn, OperationSet};
}
