//! Typed goals produced by the option generator and executed by plans.

use std::fmt;

use courier_core::{ParcelId, Point};

/// What kind of goal a [`Predicate`] expresses.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PredicateKind {
    Pickup,
    Deliver,
    Exploration,
    GoTo,
}

/// A committed or candidate goal: a kind, a destination, the target parcel
/// for pickups, and the score that justified it.
///
/// Constructors enforce the shape invariant: `parcel` is present exactly on
/// `Pickup` predicates.
#[derive(Clone, PartialEq, Debug)]
pub struct Predicate {
    pub kind:        PredicateKind,
    pub destination: Point,
    pub parcel:      Option<ParcelId>,
    pub utility:     f64,
}

impl Predicate {
    pub fn pickup(destination: Point, parcel: ParcelId, utility: f64) -> Self {
        Self { kind: PredicateKind::Pickup, destination, parcel: Some(parcel), utility }
    }

    pub fn deliver(destination: Point, utility: f64) -> Self {
        Self { kind: PredicateKind::Deliver, destination, parcel: None, utility }
    }

    pub fn exploration(destination: Point) -> Self {
        Self { kind: PredicateKind::Exploration, destination, parcel: None, utility: 0.0 }
    }

    pub fn go_to(destination: Point) -> Self {
        Self { kind: PredicateKind::GoTo, destination, parcel: None, utility: 0.0 }
    }

    /// `true` when both predicates express the same goal.  The utility field
    /// is a score, not part of the goal — the intention queue uses this to
    /// detect duplicate pushes.
    pub fn same_goal(&self, other: &Predicate) -> bool {
        self.kind == other.kind
            && self.destination == other.destination
            && self.parcel == other.parcel
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.parcel) {
            (PredicateKind::Pickup, Some(id)) => {
                write!(f, "pickup {id} @ {} (u={:.4})", self.destination, self.utility)
            }
            (kind, _) => {
                write!(f, "{kind:?} @ {} (u={:.4})", self.destination, self.utility)
            }
        }
    }
}
