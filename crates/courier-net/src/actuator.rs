//! The actuator contract: everything the agent can do to the world.

use async_trait::async_trait;

use courier_core::{AgentId, Move, ParcelId, Point};

use crate::error::NetResult;
use crate::message::Envelope;

/// Outbound actions.  Every call is a suspension point: implementations
/// perform I/O and resolve when the simulator acknowledges.
///
/// Implementations must be `Send + Sync` — the driver and the intention
/// loop share one handle.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Take one step.  Resolves to the new position, or `None` when the
    /// simulator refused the move (tile occupied mid-step).
    async fn step(&self, direction: Move) -> NetResult<Option<Point>>;

    /// Pick up whatever lies on the current tile.  Resolves to the affected
    /// parcel ids (empty when there was nothing to take).
    async fn pick_up(&self) -> NetResult<Vec<ParcelId>>;

    /// Put down everything carried.  Resolves to the affected parcel ids.
    async fn put_down(&self) -> NetResult<Vec<ParcelId>>;

    /// Send `envelope` to one agent, fire-and-forget.
    async fn say(&self, to: &AgentId, envelope: &Envelope) -> NetResult<()>;

    /// Broadcast `envelope` to every agent in range.
    async fn shout(&self, envelope: &Envelope) -> NetResult<()>;

    /// Send `envelope` to one agent and await its reply.  Bounded by the
    /// transport's own timeout.
    async fn ask(&self, to: &AgentId, envelope: &Envelope) -> NetResult<Envelope>;
}
