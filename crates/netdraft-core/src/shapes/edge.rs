//! Directed connections between activities and events.

use super::{EdgeId, NodeId, SerializableColor};
use serde::{Deserialize, Serialize};

/// Arrowhead drawn at the target end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowMarker {
    #[default]
    ArrowClosed,
}

/// Cosmetic edge style handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub marker_end: ArrowMarker,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            marker_end: ArrowMarker::ArrowClosed,
            stroke_color: SerializableColor::white(),
            stroke_width: 1.5,
        }
    }
}

/// A directed edge. Endpoints are referenced by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl Edge {
    /// Create an edge with the default arrow style.
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            style: EdgeStyle::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether either endpoint is the given node.
    pub fn touches(&self, node: &str) -> bool {
        self.source == node || self.target == node
    }
}
