//! Serialized form of a diagram.
//!
//! Nodes and edges are stored as flat records. Loading replays every record
//! through the same structural rules the editor enforces and drops the ones
//! that break them.

use crate::config::EditorConfig;
use crate::connection::{ConnectRequest, validate_connection};
use crate::diagram::Diagram;
use crate::shapes::{Edge, EdgeId, EdgeStyle, Node, NodeId, NodeKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

fn default_span() -> u32 {
    1
}

/// A node as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_span")]
    pub span: u32,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            kind: node.kind(),
            x: node.position().x,
            y: node.position().y,
            span: node.span(),
        }
    }
}

/// An edge as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id().to_string(),
            source: edge.source().to_string(),
            target: edge.target().to_string(),
            style: edge.style.clone(),
        }
    }
}

/// A persisted diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// A record discarded while loading, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRecord {
    pub id: String,
    pub reason: String,
}

/// What happened to the records of a loaded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub nodes_loaded: usize,
    pub edges_loaded: usize,
    pub dropped_nodes: Vec<DroppedRecord>,
    pub dropped_edges: Vec<DroppedRecord>,
}

impl LoadReport {
    /// Whether every record was accepted.
    pub fn is_clean(&self) -> bool {
        self.dropped_nodes.is_empty() && self.dropped_edges.is_empty()
    }
}

impl DiagramDocument {
    /// Snapshot a diagram, preserving insertion order.
    pub fn from_diagram(diagram: &Diagram) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            nodes: diagram.nodes().map(NodeRecord::from).collect(),
            edges: diagram.edges().map(EdgeRecord::from).collect(),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Rebuild a diagram, dropping records that break structural rules.
    pub fn into_diagram(self, config: &EditorConfig) -> (Diagram, LoadReport) {
        let mut diagram = Diagram::new();
        let mut report = LoadReport::default();

        for record in self.nodes {
            let id = record.id.clone();
            let result = check_node(record, config).and_then(|node| {
                diagram.add_node(node).map_err(|err| err.to_string())
            });
            match result {
                Ok(()) => report.nodes_loaded += 1,
                Err(reason) => {
                    log::warn!("Dropping node {} on load: {}", id, reason);
                    report.dropped_nodes.push(DroppedRecord { id, reason });
                }
            }
        }

        for record in self.edges {
            let id = record.id.clone();
            let result = if diagram.get_edge(&record.id).is_some() {
                Err(format!("Edge {} already exists", record.id))
            } else {
                let style = record.style;
                validate_connection(ConnectRequest::new(record.id, record.source, record.target), &diagram)
                    .map_err(|rejection| rejection.to_string())
                    .and_then(|edge| {
                        diagram
                            .add_edge(Edge { style, ..edge })
                            .map_err(|err| err.to_string())
                    })
            };
            match result {
                Ok(()) => report.edges_loaded += 1,
                Err(reason) => {
                    log::warn!("Dropping edge {} on load: {}", id, reason);
                    report.dropped_edges.push(DroppedRecord { id, reason });
                }
            }
        }

        (diagram, report)
    }
}

fn check_node(record: NodeRecord, config: &EditorConfig) -> Result<Node, String> {
    let grid = &config.grid;
    let position = Point::new(record.x, record.y);

    if !record.x.is_finite() || !record.y.is_finite() || !grid.is_quantized(position) {
        return Err(format!("({}, {}) is not a grid intersection", record.x, record.y));
    }
    // remove float drift from hand-edited files
    let position = grid.quantize(position);
    let cell = grid.to_cell(position);

    match record.kind {
        NodeKind::Activity => {
            if record.span == 0 {
                return Err("activity span must be positive".to_string());
            }
            if !grid.span_fits(cell, record.span) {
                return Err(format!(
                    "activity at cell {} with span {} does not fit the grid",
                    cell, record.span
                ));
            }
            Ok(Node::activity(record.id, position, record.span))
        }
        NodeKind::Event => {
            if !grid.in_bounds(cell) {
                return Err(format!("event at cell {} is outside the grid", cell));
            }
            Ok(Node::event(record.id, position))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;

    fn config() -> EditorConfig {
        EditorConfig::with_grid(GridSpec::new(25.0, 20, 25).unwrap())
    }

    fn node(id: &str, kind: NodeKind, x: f64, y: f64, span: u32) -> NodeRecord {
        NodeRecord {
            id: id.into(),
            kind,
            x,
            y,
            span,
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> EdgeRecord {
        EdgeRecord {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            style: EdgeStyle::default(),
        }
    }

    #[test]
    fn test_record_format() {
        let record = NodeRecord::from(&Node::activity("a1", Point::new(50.0, 75.0), 4));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "a1");
        assert_eq!(json["type"], "activity");
        assert_eq!(json["x"], 50.0);
        assert_eq!(json["y"], 75.0);
        assert_eq!(json["span"], 4);
    }

    #[test]
    fn test_minimal_json_accepted() {
        let doc = DiagramDocument::from_json(
            r#"{ "nodes": [ { "id": "e1", "type": "event", "x": 25, "y": 25 } ],
                 "edges": [] }"#,
        )
        .unwrap();
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert_eq!(doc.nodes[0].span, 1);

        let (diagram, report) = doc.into_diagram(&config());
        assert!(report.is_clean());
        assert_eq!(diagram.get_node("e1").unwrap().kind(), NodeKind::Event);
    }

    #[test]
    fn test_load_drops_malformed_nodes() {
        let doc = DiagramDocument {
            version: DOCUMENT_VERSION,
            nodes: vec![
                node("ok", NodeKind::Activity, 50.0, 50.0, 2),
                node("ok", NodeKind::Event, 100.0, 50.0, 1),
                node("off-grid", NodeKind::Event, 60.0, 50.0, 1),
                node("too-wide", NodeKind::Activity, 600.0, 50.0, 2),
                node("zero", NodeKind::Activity, 0.0, 0.0, 0),
                node("below", NodeKind::Event, 0.0, 500.0, 1),
                node("nan", NodeKind::Event, f64::NAN, 0.0, 1),
            ],
            edges: vec![],
        };
        let (diagram, report) = doc.into_diagram(&config());
        assert_eq!(diagram.node_count(), 1);
        assert_eq!(report.nodes_loaded, 1);
        let dropped: Vec<&str> = report.dropped_nodes.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(dropped, vec!["ok", "off-grid", "too-wide", "zero", "below", "nan"]);
    }

    #[test]
    fn test_load_drops_invalid_edges() {
        let doc = DiagramDocument {
            version: DOCUMENT_VERSION,
            nodes: vec![
                node("a1", NodeKind::Activity, 50.0, 50.0, 2),
                node("a2", NodeKind::Activity, 100.0, 50.0, 2),
                node("e1", NodeKind::Event, 100.0, 50.0, 1),
            ],
            edges: vec![
                edge("x1", "a1", "e1"),
                edge("x1", "e1", "a2"),
                edge("x2", "a2", "e1"),
                edge("x3", "a1", "a2"),
                edge("x4", "ghost", "e1"),
                edge("x5", "e1", "a2"),
            ],
        };
        let (diagram, report) = doc.into_diagram(&config());
        let kept: Vec<&str> = diagram.edges().map(|e| e.id()).collect();
        assert_eq!(kept, vec!["x1", "x5"]);
        let dropped: Vec<&str> = report.dropped_edges.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(dropped, vec!["x1", "x2", "x3", "x4"]);
        assert_eq!(report.edges_loaded, 2);
    }

    #[test]
    fn test_load_keeps_orphaned_events() {
        // an event whose activity was deleted is still a valid node
        let doc = DiagramDocument {
            version: DOCUMENT_VERSION,
            nodes: vec![node("e1", NodeKind::Event, 300.0, 300.0, 1)],
            edges: vec![],
        };
        let (diagram, report) = doc.into_diagram(&config());
        assert!(report.is_clean());
        assert_eq!(diagram.node_count(), 1);
    }

    #[test]
    fn test_load_absorbs_float_drift() {
        let doc = DiagramDocument {
            version: DOCUMENT_VERSION,
            nodes: vec![node("a1", NodeKind::Activity, 50.000_000_01, 75.0, 2)],
            edges: vec![],
        };
        let (diagram, _) = doc.into_diagram(&config());
        assert_eq!(diagram.get_node("a1").unwrap().position(), Point::new(50.0, 75.0));
    }
}
