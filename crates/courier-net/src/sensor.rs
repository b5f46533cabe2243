//! The sensor contract: a stream of typed events.
//!
//! The original callback interface (`onYou`, `onMap`, `onParcels`, …) maps
//! onto one event enum delivered over an unbounded channel — the transport
//! adapter pushes, the driver pulls.  Ordering within the channel is the
//! ordering guarantee: events observed before a deliberation run are
//! reflected in its decision.

use tokio::sync::{mpsc, oneshot};

use courier_core::{Agent, AgentId, GameConfig, Parcel, TileSpec};

use crate::message::Envelope;

/// One-shot continuation for answering an `ask`-style peer message.
pub type ReplySender = oneshot::Sender<Envelope>;

/// Everything the world can tell the agent.
#[derive(Debug)]
pub enum SensorEvent {
    /// Transport established.
    Connected,
    /// Transport lost; the driver shuts down cleanly.
    Disconnected,
    /// Game parameters, once per session.
    Config(GameConfig),
    /// Self state, re-sent on every movement frame (positions may be
    /// fractional mid-step).
    You(Agent),
    /// The tile map, once after connect.
    Map {
        width:  u32,
        height: u32,
        tiles:  Vec<TileSpec>,
    },
    /// Parcels currently inside the observation radius.
    Parcels(Vec<Parcel>),
    /// Agents currently inside the observation radius.
    Agents(Vec<Agent>),
    /// An inbound peer message.  `reply` is present iff the peer used the
    /// request/ask primitive and awaits an answer.
    Msg {
        from:     AgentId,
        name:     String,
        envelope: Envelope,
        reply:    Option<ReplySender>,
    },
}

/// Sending half handed to the transport adapter.
pub type SensorTx = mpsc::UnboundedSender<SensorEvent>;
/// Receiving half owned by the driver.
pub type SensorRx = mpsc::UnboundedReceiver<SensorEvent>;

/// Create the sensor event channel.
pub fn sensor_channel() -> (SensorTx, SensorRx) {
    mpsc::unbounded_channel()
}
