//! Cooperative cancellation shared between a caller and a worker thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative-cancellation token backed by an [`AtomicBool`].
///
/// Clones share the same flag. Cancelling is sticky and idempotent; the
/// worker decides when to look at it.
#[derive(Clone, Debug)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
