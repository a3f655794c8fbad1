//! Handshake sentinels exchanged between a routine and its driver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol revision tag. Bump when the handshake itself changes shape;
/// drivers and routines built against different revisions must not be
/// mixed.
pub const PROTOCOL_VERSION: &str = "v1";

/// A sentinel yielded by a routine to its driver.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// First yield of every routine: "ready, pick my path".
    Start,
    /// The non-blocking path has been started; the routine waits for
    /// its resume token to fire.
    Suspend,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Start => write!(f, "start"),
            Signal::Suspend => write!(f, "suspend"),
        }
    }
}
