//! `courier-net` — the agent's I/O seams and the teammate protocol.
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`sensor`]   | `SensorEvent` stream — how the world reaches the agent |
//! | [`actuator`] | `Actuator` trait — how the agent reaches the world     |
//! | [`message`]  | `Envelope` wire format, partition map serialization    |
//! | [`team`]     | `HandshakeState`, `TeamLink` — discovery, handshake,   |
//! |              | session-scoped belief exchange                         |
//! | [`error`]    | `NetError`, `NetResult<T>`                             |
//!
//! The concrete transport (socket client, wire framing) is an external
//! collaborator: it feeds [`SensorEvent`]s into the channel and implements
//! [`Actuator`].  Everything in this crate is transport-agnostic.

pub mod actuator;
pub mod error;
pub mod message;
pub mod sensor;
pub mod team;


pub use actuator::Actuator;
pub use error::{NetError, NetResult};
pub use message::{partition_from_wire, partition_to_wire, Envelope};
pub use sensor::{sensor_channel, ReplySender, SensorEvent, SensorRx, SensorTx};
pub use team::{HandshakeState, TeamEvent, TeamLink};
