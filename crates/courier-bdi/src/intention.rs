//! A committed predicate with its execution lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use courier_policy::Predicate;

use crate::context::PlanContext;
use crate::error::{PlanError, PlanResult};
use crate::plan::{library, PlanEntry};
use crate::stop::StopToken;

/// One commitment.  Owned by the intention queue (or, for sub-intentions,
/// by the plan that spawned it); shared by reference with the run loop.
///
/// Lifecycle flags use atomics because the queue inspects an intention that
/// the run loop is concurrently executing; the actual execution is strictly
/// sequential.
pub struct Intention {
    predicate: Predicate,
    stop:      StopToken,
    executing: AtomicBool,
    finished:  AtomicBool,
}

impl Intention {
    /// A top-level intention with its own fresh stop token.
    pub fn new(predicate: Predicate) -> Self {
        Self::with_token(predicate, StopToken::new())
    }

    /// A sub-intention: `stop` should be a [`StopToken::child`] of the
    /// parent plan's token so cancellation cascades.
    pub fn with_token(predicate: Predicate, stop: StopToken) -> Self {
        Self {
            predicate,
            stop,
            executing: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Request cooperative cancellation (cascades into sub-intentions).
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Achieve the predicate by running the first applicable plan from the
    /// library; on plan error, try the next applicable one.
    ///
    /// Fails with [`PlanError::Stopped`] as soon as cancellation is
    /// observed and with [`PlanError::NoApplicablePlan`] when the library
    /// has nothing for this predicate kind.
    pub async fn achieve(&self, ctx: &PlanContext) -> PlanResult<bool> {
        self.achieve_with(library(), ctx).await
    }

    pub(crate) async fn achieve_with(
        &self,
        plans: &[PlanEntry],
        ctx:   &PlanContext,
    ) -> PlanResult<bool> {
        if self.stop.is_stopped() {
            return Err(PlanError::Stopped);
        }
        self.executing.store(true, Ordering::SeqCst);
        let result = self.try_plans(plans, ctx).await;
        self.executing.store(false, Ordering::SeqCst);
        if result.is_ok() {
            self.finished.store(true, Ordering::SeqCst);
        }
        result
    }

    async fn try_plans(&self, plans: &[PlanEntry], ctx: &PlanContext) -> PlanResult<bool> {
        let mut last_error: Option<PlanError> = None;
        for entry in plans {
            if !(entry.applicable)(self.predicate.kind) {
                continue;
            }
            if self.stop.is_stopped() {
                return Err(PlanError::Stopped);
            }
            debug!(plan = entry.name, goal = %self.predicate, "executing plan");
            let mut plan = (entry.build)();
            match plan.execute(&self.predicate, ctx, &self.stop).await {
                Ok(done) => return Ok(done),
                Err(PlanError::Stopped) => return Err(PlanError::Stopped),
                Err(e) => {
                    warn!(plan = entry.name, error = %e, "plan failed, trying next");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or(PlanError::NoApplicablePlan(self.predicate.kind)))
    }
}
