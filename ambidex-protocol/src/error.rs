//! Error taxonomy for the suspension protocol.
//!
//! Four kinds, four fates: construction errors surface before any
//! routine exists, protocol errors are fatal handshake breaches, usage
//! errors flow through the failure channel of whichever calling
//! convention was used, and domain failures pass through result slots
//! unchanged.

use crate::signal::Signal;
use thiserror::Error;

/// A domain failure reason, exactly as handler code produced it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Breaches of the Start/Suspend handshake. Always fatal, never
/// recoverable by caller code. Drivers inject the error into the
/// offending routine's own failure channel before reporting it, so
/// diagnostics attribute the fault to the suspension point that broke
/// the contract.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The routine yielded something other than the start signal where
    /// the handshake requires one.
    #[error("expected the start signal, got {got}")]
    ExpectedStart {
        /// The signal that was actually yielded.
        got: Signal,
    },

    /// The routine yielded something other than the suspend signal
    /// after accepting a resume token.
    #[error("expected the suspend signal, got {got}")]
    ExpectedSuspend {
        /// The signal that was actually yielded.
        got: Signal,
    },

    /// The routine completed while the driver was still owed a suspend.
    #[error("unexpected routine completion while a suspension was pending")]
    UnexpectedCompletion,

    /// The driver resumed the routine at a point the handshake does not
    /// allow (past completion, or before its result slot settled).
    #[error("routine resumed out of turn")]
    OutOfTurn,
}

/// Malformed operation configuration. Fails synchronously, before any
/// routine exists.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// Both a future handler and an errback handler were supplied.
    #[error("expected one of either a future handler or an errback handler, but got both")]
    BothNonBlocking,

    /// No blocking handler was supplied.
    #[error("a blocking handler is required")]
    MissingBlocking,

    /// No explicit name was given and none was inferable from any
    /// declared handler name.
    #[error("operation name not given and not inferable from any handler name")]
    NoName,
}

/// Caller mistakes that flow through the normal failure channel of the
/// convention that was used.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsageError {
    /// Race was invoked over an empty collection.
    #[error("must race at least 1 item")]
    EmptyRace,

    /// The errback convention was invoked without a trailing callback.
    #[error("errback invocation is missing its trailing callback")]
    MissingCallback,
}

/// What a driver reports when a routine does not produce a value.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RoutineError {
    /// The routine broke the Start/Suspend handshake.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// Handler code failed; the reason is carried unchanged.
    #[error("{0}")]
    Failed(#[from] BoxError),
}

impl RoutineError {
    /// Unwrap a domain failure back to its original reason, so failures
    /// cross combinator boundaries without gaining wrapper layers.
    /// Protocol violations stay boxed as themselves.
    pub fn into_reason(self) -> BoxError {
        match self {
            RoutineError::Failed(reason) => reason,
            other => Box::new(other),
        }
    }

    /// Whether this is a handshake breach rather than a domain failure.
    pub fn is_protocol(&self) -> bool {
        matches!(self, RoutineError::Protocol(_))
    }
}

// -- Tests --
