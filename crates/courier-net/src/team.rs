//! Discovery, three-way handshake, and session-scoped teammate exchange.
//!
//! # Protocol
//!
//! 1. Both agents periodically `shout` a `hello` carrying the team key
//!    until a handshake completes.
//! 2. On hearing a peer with the right key, the **lexicographically lower**
//!    id initiates: it `ask`s a `handshake_init` with a fresh nonce.
//! 3. The responder answers `handshake_ack` with a fresh UUID session and
//!    the echoed nonce.
//! 4. The initiator verifies key and nonce, `say`s `handshake_confirm`, and
//!    marks itself complete with `initiated = true`.
//! 5. The responder completes on receiving the confirm.
//!
//! Afterwards every exchanged message is tagged with the session id;
//! anything carrying a stale session is discarded.  Only the initiator owns
//! the partition broadcasts.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use courier_core::{Agent, AgentId, Parcel, Point};

use crate::actuator::Actuator;
use crate::error::{NetError, NetResult};
use crate::message::{partition_from_wire, partition_to_wire, Envelope};
use crate::sensor::ReplySender;

// ── HandshakeState ────────────────────────────────────────────────────────────

/// Where the pairing currently stands.  One per agent, cleared on
/// disconnect.
#[derive(Clone, Default, Debug)]
pub struct HandshakeState {
    pub teammate:  Option<AgentId>,
    pub session:   Option<String>,
    pub complete:  bool,
    /// `true` on the side that ran the initiator role; that side owns the
    /// partition broadcasts.
    pub initiated: bool,
}

// ── TeamEvent ─────────────────────────────────────────────────────────────────

/// What an inbound peer message means for the driver.  The link never
/// touches beliefs itself; it reports, the driver applies.
#[derive(Debug)]
pub enum TeamEvent {
    HandshakeComplete {
        session:   String,
        initiated: bool,
        teammate:  AgentId,
    },
    /// Teammate-sensed parcels — merge like a local sensor frame.
    Parcels(Vec<Parcel>),
    /// Teammate-sensed agents — merge like a local sensor frame.
    Agents(Vec<Agent>),
    /// The teammate's own record.
    TeammateInfo(Agent),
    /// A fresh generator partitioning from the initiator.
    Partitioning(FxHashMap<Point, AgentId>),
}

// ── TeamLink ──────────────────────────────────────────────────────────────────

struct LinkState {
    self_id:     Option<AgentId>,
    handshake:   HandshakeState,
    /// An init ask is currently in flight; suppress duplicate initiations.
    in_progress: bool,
    /// Session issued as responder, waiting for the confirm.
    pending:     Option<(String, AgentId)>,
}

/// The coordination endpoint for one agent.
///
/// Lock discipline: the internal mutex is never held across an await — the
/// handshake copies what it needs, performs the round-trip, then commits.
pub struct TeamLink {
    team_key: String,
    actuator: Arc<dyn Actuator>,
    state:    Mutex<LinkState>,
}

impl TeamLink {
    pub fn new(team_key: String, actuator: Arc<dyn Actuator>) -> Self {
        Self {
            team_key,
            actuator,
            state: Mutex::new(LinkState {
                self_id:     None,
                handshake:   HandshakeState::default(),
                in_progress: false,
                pending:     None,
            }),
        }
    }

    /// Record the own id as soon as the first self frame arrives.
    pub fn set_self_id(&self, id: AgentId) {
        let mut state = self.lock();
        if state.self_id.is_none() {
            state.self_id = Some(id);
        }
    }

    pub fn handshake(&self) -> HandshakeState {
        self.lock().handshake.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.lock().handshake.complete
    }

    pub fn initiated_handshake(&self) -> bool {
        let state = self.lock();
        state.handshake.complete && state.handshake.initiated
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ── Discovery ─────────────────────────────────────────────────────────

    /// Shout a `hello` unless the handshake is already complete.  Called on
    /// the driver's heartbeat interval.
    pub async fn heartbeat(&self, stamp: u64) -> NetResult<()> {
        let me = {
            let state = self.lock();
            if state.handshake.complete {
                return Ok(());
            }
            match &state.self_id {
                None => return Ok(()), // no identity yet
                Some(id) => id.clone(),
            }
        };
        self.actuator
            .shout(&Envelope::Hello { team: self.team_key.clone(), agent: me, stamp })
            .await
    }

    // ── Inbound handling ──────────────────────────────────────────────────

    /// Process one inbound peer message.  Returns the belief-relevant
    /// meaning, if any.
    pub async fn handle(
        &self,
        from:     AgentId,
        envelope: Envelope,
        reply:    Option<ReplySender>,
    ) -> NetResult<Option<TeamEvent>> {
        match envelope {
            Envelope::Hello { team, agent, .. } => self.on_hello(team, agent).await,
            Envelope::HandshakeInit { team_key, nonce, from: peer } => {
                self.on_init(team_key, nonce, peer, reply)
            }
            Envelope::HandshakeConfirm { session, from: peer } => Ok(self.on_confirm(session, peer)),
            steady => Ok(self.on_steady(from, steady)),
        }
    }

    /// Discovery: the lower id runs the initiator role.
    async fn on_hello(&self, team: String, peer: AgentId) -> NetResult<Option<TeamEvent>> {
        let me = {
            let mut state = self.lock();
            if team != self.team_key || state.handshake.complete || state.in_progress {
                return Ok(None);
            }
            let Some(me) = state.self_id.clone() else {
                return Ok(None); // no identity yet
            };
            if me >= peer {
                return Ok(None); // the peer initiates
            }
            state.in_progress = true;
            me
        };

        let nonce: u64 = rand::random();
        let init = Envelope::HandshakeInit {
            team_key: self.team_key.clone(),
            nonce,
            from: me.clone(),
        };
        let outcome = self.initiate(&peer, &me, nonce, init).await;
        if outcome.is_err() {
            self.lock().in_progress = false;
        }
        outcome
    }

    async fn initiate(
        &self,
        peer:  &AgentId,
        me:    &AgentId,
        nonce: u64,
        init:  Envelope,
    ) -> NetResult<Option<TeamEvent>> {
        let reply = self.actuator.ask(peer, &init).await?;
        let Envelope::HandshakeAck { team_key, session, from, echo_nonce } = reply else {
            return Err(NetError::Handshake("unexpected reply to init".into()));
        };
        if team_key != self.team_key {
            return Err(NetError::Handshake("ack carries wrong team key".into()));
        }
        if echo_nonce != nonce {
            return Err(NetError::Handshake("ack nonce mismatch".into()));
        }
        if from != *peer {
            return Err(NetError::Handshake("ack from unexpected agent".into()));
        }

        self.actuator
            .say(
                peer,
                &Envelope::HandshakeConfirm { session: session.clone(), from: me.clone() },
            )
            .await?;

        let mut state = self.lock();
        state.in_progress = false;
        state.handshake = HandshakeState {
            teammate:  Some(peer.clone()),
            session:   Some(session.clone()),
            complete:  true,
            initiated: true,
        };
        Ok(Some(TeamEvent::HandshakeComplete {
            session,
            initiated: true,
            teammate: peer.clone(),
        }))
    }

    /// Responder side: issue a session and echo the nonce.
    fn on_init(
        &self,
        team_key: String,
        nonce:    u64,
        peer:     AgentId,
        reply:    Option<ReplySender>,
    ) -> NetResult<Option<TeamEvent>> {
        if team_key != self.team_key {
            return Ok(None); // not our team; stay silent
        }
        let Some(reply) = reply else {
            return Err(NetError::Handshake("init arrived without a reply channel".into()));
        };
        let me = match self.lock().self_id.clone() {
            None => return Ok(None),
            Some(id) => id,
        };

        let session = Uuid::new_v4().to_string();
        let ack = Envelope::HandshakeAck {
            team_key: self.team_key.clone(),
            session:  session.clone(),
            from:     me,
            echo_nonce: nonce,
        };
        if reply.send(ack).is_err() {
            return Err(NetError::Transport("init reply channel closed".into()));
        }
        self.lock().pending = Some((session, peer));
        Ok(None)
    }

    fn on_confirm(&self, session: String, peer: AgentId) -> Option<TeamEvent> {
        let mut state = self.lock();
        match &state.pending {
            Some((pending_session, pending_peer))
                if *pending_session == session && *pending_peer == peer =>
            {
                state.pending = None;
                state.handshake = HandshakeState {
                    teammate:  Some(peer.clone()),
                    session:   Some(session.clone()),
                    complete:  true,
                    initiated: false,
                };
                Some(TeamEvent::HandshakeComplete { session, initiated: false, teammate: peer })
            }
            _ => {
                debug!(%peer, "ignoring confirm for unknown session");
                None
            }
        }
    }

    /// Steady-state messages: enforce session and sender, then translate.
    fn on_steady(&self, from: AgentId, envelope: Envelope) -> Option<TeamEvent> {
        {
            let state = self.lock();
            if !state.handshake.complete
                || state.handshake.teammate.as_ref() != Some(&from)
                || envelope.session() != state.handshake.session.as_deref()
            {
                debug!(%from, "discarding message with stale session or wrong sender");
                return None;
            }
        }
        match envelope {
            Envelope::ParcelsSensed { parcels, .. } => Some(TeamEvent::Parcels(parcels)),
            Envelope::AgentsSensed { agents, .. } => Some(TeamEvent::Agents(agents)),
            Envelope::MyInfo { info, .. } => Some(TeamEvent::TeammateInfo(info)),
            Envelope::MapPartitioning { partitioning, .. } => {
                match partition_from_wire(&partitioning) {
                    Ok(map) => Some(TeamEvent::Partitioning(map)),
                    Err(e) => {
                        warn!(error = %e, "dropping malformed partitioning");
                        None
                    }
                }
            }
            _ => None,
        }
    }

    // ── Outbound sharing ──────────────────────────────────────────────────

    /// `(session, teammate)` when complete.
    fn route(&self) -> Option<(String, AgentId)> {
        let state = self.lock();
        let handshake = &state.handshake;
        match (&handshake.session, &handshake.teammate) {
            (Some(session), Some(teammate)) if handshake.complete => {
                Some((session.clone(), teammate.clone()))
            }
            _ => None,
        }
    }

    /// Forward a local parcel frame to the teammate.  No-op before the
    /// handshake completes.
    pub async fn share_parcels(&self, parcels: &[Parcel]) -> NetResult<()> {
        let Some((session, teammate)) = self.route() else {
            return Ok(());
        };
        self.actuator
            .say(&teammate, &Envelope::ParcelsSensed { session, parcels: parcels.to_vec() })
            .await
    }

    /// Forward a local agent frame to the teammate.
    pub async fn share_agents(&self, agents: &[Agent]) -> NetResult<()> {
        let Some((session, teammate)) = self.route() else {
            return Ok(());
        };
        self.actuator
            .say(&teammate, &Envelope::AgentsSensed { session, agents: agents.to_vec() })
            .await
    }

    /// Send the own agent record.
    pub async fn share_info(&self, me: &Agent) -> NetResult<()> {
        let Some((session, teammate)) = self.route() else {
            return Ok(());
        };
        self.actuator
            .say(&teammate, &Envelope::MyInfo { session, info: me.clone() })
            .await
    }

    /// Broadcast a freshly computed partitioning.  Callers gate this on
    /// [`initiated_handshake`][Self::initiated_handshake].
    pub async fn share_partitioning(&self, map: &FxHashMap<Point, AgentId>) -> NetResult<()> {
        let Some((session, teammate)) = self.route() else {
            return Ok(());
        };
        self.actuator
            .say(
                &teammate,
                &Envelope::MapPartitioning { session, partitioning: partition_to_wire(map) },
            )
            .await
    }
}
