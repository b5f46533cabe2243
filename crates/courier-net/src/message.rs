//! Wire format for peer messages.
//!
//! Every message travels as an `{type, content}` envelope; the `type` tag
//! uses snake_case names.  Steady-state messages carry the session id
//! established by the handshake, and receivers drop anything tagged with a
//! stale session.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use courier_core::{Agent, AgentId, Parcel, Point};

use crate::error::{NetError, NetResult};

// ── Envelope ──────────────────────────────────────────────────────────────────

/// A peer message.  Serializes as `{"type": "...", "content": {...}}`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Envelope {
    /// Periodic discovery broadcast, sent until the handshake completes.
    Hello {
        team:  String,
        agent: AgentId,
        stamp: u64,
    },
    /// Step 1 of the handshake, sent (via ask) by the lower-id agent.
    HandshakeInit {
        team_key: String,
        nonce:    u64,
        from:     AgentId,
    },
    /// Step 2: the responder issues a fresh session and echoes the nonce.
    HandshakeAck {
        team_key:   String,
        session:    String,
        from:       AgentId,
        echo_nonce: u64,
    },
    /// Step 3: the initiator confirms the session.
    HandshakeConfirm {
        session: String,
        from:    AgentId,
    },
    /// Parcels from the sender's latest sensor frame.
    ParcelsSensed {
        session: String,
        parcels: Vec<Parcel>,
    },
    /// Agents from the sender's latest sensor frame.
    AgentsSensed {
        session: String,
        agents:  Vec<Agent>,
    },
    /// The sender's own agent record.
    MyInfo {
        session: String,
        info:    Agent,
    },
    /// Replaces the receiver's cached generator partitioning.
    MapPartitioning {
        session:      String,
        partitioning: BTreeMap<String, AgentId>,
    },
}

impl Envelope {
    /// The session id carried by steady-state messages; `None` for the
    /// discovery/handshake family.
    pub fn session(&self) -> Option<&str> {
        match self {
            Envelope::ParcelsSensed { session, .. }
            | Envelope::AgentsSensed { session, .. }
            | Envelope::MyInfo { session, .. }
            | Envelope::MapPartitioning { session, .. }
            | Envelope::HandshakeConfirm { session, .. } => Some(session),
            _ => None,
        }
    }
}

// ── Partition map serialization ───────────────────────────────────────────────

/// Serialize a partitioning as the wire's `"x,y" → agentId` object.
/// `BTreeMap` keeps the key order stable across both teammates.
pub fn partition_to_wire(map: &FxHashMap<Point, AgentId>) -> BTreeMap<String, AgentId> {
    map.iter()
        .map(|(point, owner)| (point.key(), owner.clone()))
        .collect()
}

/// Decode the wire partitioning back into point keys.
pub fn partition_from_wire(
    wire: &BTreeMap<String, AgentId>,
) -> NetResult<FxHashMap<Point, AgentId>> {
    wire.iter()
        .map(|(key, owner)| {
            Point::from_key(key)
                .map(|point| (point, owner.clone()))
                .map_err(|e| NetError::Malformed(e.to_string()))
        })
        .collect()
}
