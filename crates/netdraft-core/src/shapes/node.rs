//! Activity and event nodes.

use super::NodeId;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// The two kinds of node in an activity network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Duration-bearing shape spanning one or more cells horizontally.
    Activity,
    /// Zero-duration milestone occupying one cell.
    Event,
}

impl NodeKind {
    /// Lowercase tag used in ids and persisted records.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Activity => "activity",
            NodeKind::Event => "event",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which end of an activity an attachment point sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentEnd {
    /// Start of the activity (its position).
    Head,
    /// End of the activity (position + span cells to the right).
    Butt,
}

/// A point an event may snap to.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentPoint {
    pub point: Point,
    pub activity: NodeId,
    pub end: AttachmentEnd,
}

/// A placed node. Position and span are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    /// Top-left corner, a grid intersection.
    pub(crate) position: Point,
    /// Number of cells covered horizontally (always 1 for events).
    pub(crate) span: u32,
}

impl Node {
    /// Create an activity node.
    pub fn activity(id: impl Into<NodeId>, position: Point, span: u32) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Activity,
            position,
            span,
        }
    }

    /// Create an event node.
    pub fn event(id: impl Into<NodeId>, position: Point) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Event,
            position,
            span: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn span(&self) -> u32 {
        self.span
    }

    pub fn is_activity(&self) -> bool {
        self.kind == NodeKind::Activity
    }

    pub fn is_event(&self) -> bool {
        self.kind == NodeKind::Event
    }

    /// Head and butt attachment points, head first. Empty for events.
    pub fn attachment_points(&self, cell_size: f64) -> Vec<AttachmentPoint> {
        if !self.is_activity() {
            return Vec::new();
        }
        let butt = self.position + Vec2::new(self.span as f64 * cell_size, 0.0);
        vec![
            AttachmentPoint {
                point: self.position,
                activity: self.id.clone(),
                end: AttachmentEnd::Head,
            },
            AttachmentPoint {
                point: butt,
                activity: self.id.clone(),
                end: AttachmentEnd::Butt,
            },
        ]
    }
}
