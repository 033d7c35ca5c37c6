//! Shape definitions for the network diagram.

mod edge;
mod node;

pub use edge::{ArrowMarker, Edge, EdgeStyle};
pub use node::{AttachmentEnd, AttachmentPoint, Node, NodeKind};

use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = String;

/// Unique identifier for edges.
pub type EdgeId = String;

/// Generate a fresh node id, prefixed with its kind (`activity-…`, `event-…`).
pub fn new_node_id(kind: NodeKind) -> NodeId {
    format!("{}-{}", kind.tag(), Uuid::new_v4())
}

/// Generate a fresh edge id.
pub fn new_edge_id() -> EdgeId {
    format!("edge-{}", Uuid::new_v4())
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}
