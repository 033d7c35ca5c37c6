//! Accept/reject decisions handed back to the interaction layer.

use crate::grid::Cell;
use crate::shapes::{Edge, EdgeId, Node, NodeId, NodeKind};
use kurbo::Point;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Role an event plays in an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRole {
    /// The event is the edge source (outgoing).
    Source,
    /// The event is the edge target (incoming).
    Target,
}

impl std::fmt::Display for EdgeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeRole::Source => f.write_str("outgoing"),
            EdgeRole::Target => f.write_str("incoming"),
        }
    }
}

/// Why a placement or connection was refused.
///
/// All variants are expected, recoverable outcomes of a user gesture.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("Shape at ({}, {}) does not fit on the grid: cell {cell} with span {span}", .point.x, .point.y)]
    OutOfGrid { point: Point, cell: Cell, span: u32 },

    #[error("Activities must be dropped on borders between cells (dropped at ({}, {}))", .point.x, .point.y)]
    NotOnBorder { point: Point, threshold: f64 },

    #[error("Events must be dropped on the start or end of an activity (dropped at ({}, {}))", .point.x, .point.y)]
    NoNearbyAttachment { point: Point, threshold: f64 },

    #[error("Only event to activity connections are allowed ({from_kind} {from} -> {to_kind} {to})")]
    InvalidKindPair {
        from: NodeId,
        from_kind: NodeKind,
        to: NodeId,
        to_kind: NodeKind,
    },

    #[error("Event {event} already has an {role} connection")]
    EventAlreadyConnected { event: NodeId, role: EdgeRole },

    #[error("Node {id} does not exist")]
    UnknownEndpoint { id: NodeId },

    #[error("Edge {id} does not exist")]
    UnknownEdge { id: EdgeId },
}

impl Rejection {
    /// Stable machine-readable name of the rejection.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::OutOfGrid { .. } => "out_of_grid",
            Rejection::NotOnBorder { .. } => "not_on_border",
            Rejection::NoNearbyAttachment { .. } => "no_nearby_attachment",
            Rejection::InvalidKindPair { .. } => "invalid_kind_pair",
            Rejection::EventAlreadyConnected { .. } => "event_already_connected",
            Rejection::UnknownEndpoint { .. } => "unknown_endpoint",
            Rejection::UnknownEdge { .. } => "unknown_edge",
        }
    }

    /// Whether the rejection should be shown to the user.
    ///
    /// Unknown ids come from stale gestures racing a deletion and are
    /// dropped silently.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Rejection::UnknownEndpoint { .. } | Rejection::UnknownEdge { .. }
        )
    }
}

/// Serialized form of a rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionReport {
    pub kind: &'static str,
    pub message: String,
    pub user_facing: bool,
}

impl From<&Rejection> for RejectionReport {
    fn from(rejection: &Rejection) -> Self {
        Self {
            kind: rejection.kind(),
            message: rejection.to_string(),
            user_facing: rejection.is_user_facing(),
        }
    }
}

/// Result of a gesture: the accepted payload or the reason it was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Accepted(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn accepted(&self) -> Option<&T> {
        match self {
            Outcome::Accepted(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Accepted(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T, Rejection>> for Outcome<T> {
    fn from(result: Result<T, Rejection>) -> Self {
        match result {
            Ok(value) => Outcome::Accepted(value),
            Err(reason) => Outcome::Rejected(reason),
        }
    }
}

/// Body of a serialized [`Outcome`]. Each variant becomes one field next
/// to `accepted`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBody<'a> {
    Node(&'a Node),
    Edge(&'a Edge),
    Reason(RejectionReport),
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    accepted: bool,
    #[serde(flatten)]
    body: OutcomeBody<'a>,
}

/// Payload types carried by an [`Outcome`].
pub trait Payload {
    fn body(&self) -> OutcomeBody<'_>;
}

impl Payload for Node {
    fn body(&self) -> OutcomeBody<'_> {
        OutcomeBody::Node(self)
    }
}

impl Payload for Edge {
    fn body(&self) -> OutcomeBody<'_> {
        OutcomeBody::Edge(self)
    }
}

/// Serializes as `{accepted, node|edge|reason}`.
impl<T: Payload> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = match self {
            Outcome::Accepted(payload) => OutcomeRecord {
                accepted: true,
                body: payload.body(),
            },
            Outcome::Rejected(reason) => OutcomeRecord {
                accepted: false,
                body: OutcomeBody::Reason(reason.into()),
            },
        };
        record.serialize(serializer)
    }
}
