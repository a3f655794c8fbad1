//! The callable that resumes a suspended routine.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

struct TokenInner {
    fired: AtomicBool,
    notify: Box<dyn Fn() + Send + Sync>,
}

/// Handle given to a suspended routine's non-blocking path. Firing it
/// signals "the result slot is now populated, continue".
///
/// It may fire before the driving call returns (the work completed
/// synchronously) or after (an external completion); the trampoline
/// behaves correctly in both cases. A token fires at most once — extra
/// fires are ignored, so success and failure callbacks can both hold a
/// clone without coordination.
#[derive(Clone)]
pub struct ResumeToken {
    inner: Arc<TokenInner>,
}

impl ResumeToken {
    /// Wrap a driver-side notification hook into a token.
    pub fn new(notify: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                fired: AtomicBool::new(false),
                notify: Box::new(notify),
            }),
        }
    }

    /// Signal that the awaited work has settled. Only the first fire
    /// reaches the driver.
    pub fn fire(&self) {
        if !self.inner.fired.swap(true, Ordering::AcqRel) {
            (self.inner.notify)();
        }
    }

    /// Whether this token has already fired.
    pub fn has_fired(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeToken")
            .field("fired", &self.has_fired())
            .finish()
    }
}

// -- Tests --
