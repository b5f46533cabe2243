//! The intention queue and its revision loop.
//!
//! # Invariants
//!
//! - The head is the *current* intention and the only one that ever
//!   executes; at most one intention is executing at any time.
//! - Pushing a predicate already queued (goal-equal, utility ignored) is a
//!   no-op.
//! - Any other push appends, then stops the previously last intention so
//!   the newcomer takes over at the next loop iteration.
//! - A head whose predicate no longer holds against the beliefs (deliver
//!   while empty-handed, pickup of a parcel that vanished or got grabbed)
//!   is dropped without execution.
//! - When the queue drains, waiters of [`wait_drained`] are woken so the
//!   driver can re-deliberate immediately.
//!
//! [`wait_drained`]: IntentionQueue::wait_drained

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;
use tracing::{debug, warn};

use courier_belief::BeliefSet;
use courier_core::Millis;
use courier_policy::{Predicate, PredicateKind};

use crate::context::PlanContext;
use crate::error::PlanError;
use crate::intention::Intention;

/// FIFO of commitments, effectively single-element: the run loop only ever
/// executes the head, and a push immediately stops the previous tail.
#[derive(Default)]
pub struct IntentionQueue {
    inner:   Mutex<VecDeque<Arc<Intention>>>,
    pushed:  Notify,
    drained: Notify,
}

impl IntentionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `predicate` unless an equal goal is already queued.
    ///
    /// Returns `false` on the duplicate no-op.  On a real push the
    /// previously last intention is stopped so the new commitment takes
    /// over at the next loop iteration.
    pub fn push(&self, predicate: Predicate) -> bool {
        {
            let mut queue = self.lock();
            if queue.iter().any(|i| i.predicate().same_goal(&predicate)) {
                return false;
            }
            if let Some(last) = queue.back() {
                last.stop();
            }
            debug!(goal = %predicate, "committing to new intention");
            queue.push_back(Arc::new(Intention::new(predicate)));
        }
        self.pushed.notify_one();
        true
    }

    /// The head's predicate, if any.
    pub fn current(&self) -> Option<Predicate> {
        self.lock().front().map(|i| i.predicate().clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Resolves the next time the queue runs dry (the "queue-empty
    /// callback" seam — the driver uses it to re-trigger deliberation).
    pub async fn wait_drained(&self) {
        self.drained.notified().await;
    }

    /// The revision loop.  Runs forever; the driver races it against its
    /// own event loop and drops it on shutdown.
    pub async fn run(&self, ctx: &PlanContext) {
        loop {
            let Some(intention) = self.lock().front().cloned() else {
                // Wakes only current waiters: the driver re-deliberates on
                // its periodic tick anyway if it misses one.
                self.drained.notify_waiters();
                self.pushed.notified().await;
                continue;
            };

            if intention.is_stopped() {
                self.remove(&intention);
                continue;
            }

            let valid = {
                let mut beliefs = ctx.lock_beliefs();
                still_valid(intention.predicate(), &mut beliefs, ctx.clock.now())
            };
            if !valid {
                debug!(goal = %intention.predicate(), "dropping invalidated intention");
                self.remove(&intention);
                continue;
            }

            match intention.achieve(ctx).await {
                Ok(_) => debug!(goal = %intention.predicate(), "intention achieved"),
                Err(PlanError::Stopped) => {
                    debug!(goal = %intention.predicate(), "intention stopped")
                }
                Err(e) => warn!(goal = %intention.predicate(), error = %e, "intention failed"),
            }
            self.remove(&intention);

            // Let sensor processing interleave between intentions.
            tokio::task::yield_now().await;
        }
    }

    fn remove(&self, target: &Arc<Intention>) {
        let mut queue = self.lock();
        if queue.front().is_some_and(|head| Arc::ptr_eq(head, target)) {
            queue.pop_front();
        } else {
            queue.retain(|i| !Arc::ptr_eq(i, target));
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<Intention>>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Re-validate a committed predicate against the current beliefs.
fn still_valid(predicate: &Predicate, beliefs: &mut BeliefSet, now: Millis) -> bool {
    match predicate.kind {
        PredicateKind::Deliver => beliefs.carried_count() > 0,
        PredicateKind::Pickup => match &predicate.parcel {
            None => false,
            Some(id) => beliefs
                .parcel(id, now)
                .is_some_and(|parcel| parcel.is_free()),
        },
        PredicateKind::Exploration | PredicateKind::GoTo => true,
    }
}
