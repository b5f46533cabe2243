//! `courier-bdi` — commitment and execution.
//!
//! # Crate layout
//!
//! | Module      | Contents                                               |
//! |-------------|--------------------------------------------------------|
//! | [`stop`]    | `StopToken` — hierarchical cooperative cancellation    |
//! | [`context`] | `PlanContext` — everything a running plan may touch    |
//! | [`intention`] | `Intention` — a committed predicate with lifecycle   |
//! | [`queue`]   | `IntentionQueue` — commitment, revision, the run loop  |
//! | [`plan`]    | `Plan` trait, the plan library, partition refresh      |
//! | [`goto`], [`pickup`], [`deliver`] | the three concrete plans         |
//! | [`error`]   | `PlanError`, `PlanResult<T>`                           |
//!
//! # Ownership
//!
//! The queue owns its intentions; a running plan owns its sub-intentions;
//! cancellation flows down the same tree through [`StopToken`] children.
//! Plans observe the token at every suspension point — there is no forced
//! pre-emption anywhere.

pub mod context;
pub mod deliver;
pub mod error;
pub mod goto;
pub mod intention;
pub mod pickup;
pub mod plan;
pub mod queue;
pub mod stop;


pub use context::PlanContext;
pub use deliver::DeliverPlan;
pub use error::{PlanError, PlanResult};
pub use goto::GoToPlan;
pub use intention::Intention;
pub use pickup::PickUpPlan;
pub use plan::{library, refresh_partitioning, Plan, PlanEntry};
pub use queue::IntentionQueue;
pub use stop::StopToken;
