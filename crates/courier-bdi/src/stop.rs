//! Hierarchical cooperative cancellation.
//!
//! A [`StopToken`] is a shared boolean flag plus a list of child tokens.
//! Stopping a token stops every descendant, which is how cancelling an
//! intention reaches the sub-intentions its plan spawned.  Plans re-check
//! their token before every suspension point; nothing is ever pre-empted
//! forcibly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    stopped:  AtomicBool,
    children: Mutex<Vec<StopToken>>,
}

/// A cloneable cancellation handle.  Clones share one flag; [`child`]
/// creates a *dependent* token that is stopped whenever the parent is.
///
/// [`child`]: StopToken::child
#[derive(Clone, Default)]
pub struct StopToken {
    inner: Arc<Inner>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token that follows this one: stopping the parent stops the
    /// child (but not vice versa).  A child created after the parent was
    /// already stopped starts out stopped.
    pub fn child(&self) -> StopToken {
        let child = StopToken::new();
        if self.is_stopped() {
            child.inner.stopped.store(true, Ordering::SeqCst);
            return child;
        }
        self.lock_children().push(child.clone());
        // Stop may have raced the registration; settle it.
        if self.is_stopped() {
            child.stop();
        }
        child
    }

    /// Raise the flag here and on every descendant.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        let children = self.lock_children().clone();
        for child in children {
            child.stop();
        }
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    fn lock_children(&self) -> std::sync::MutexGuard<'_, Vec<StopToken>> {
        self.inner
            .children
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
