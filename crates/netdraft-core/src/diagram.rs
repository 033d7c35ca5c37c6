//! Diagram state: the canonical node and edge collections.

use crate::shapes::{Edge, EdgeId, Node, NodeId, NodeKind};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Internal consistency failures.
///
/// These never result from user input going through the validators; they
/// indicate a caller bug and are not folded into rejections.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("Edge {0} already exists")]
    DuplicateEdge(EdgeId),
    #[error("Edge {edge} references missing node {node}")]
    DanglingEdge { edge: EdgeId, node: NodeId },
}

/// Counts shown in the toolbox summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagramSummary {
    pub activities: usize,
    pub events: usize,
    pub connections: usize,
}

/// All nodes and edges of a diagram, keyed by id.
///
/// Insertion order is kept alongside the maps so iteration is stable.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    edges: HashMap<EdgeId, Edge>,
    edge_order: Vec<EdgeId>,
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Activities in insertion order.
    pub fn activities(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|node| node.kind() == NodeKind::Activity)
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    /// Edges leaving the given node.
    pub fn outgoing<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges().filter(move |edge| edge.source() == node)
    }

    /// Edges entering the given node.
    pub fn incoming<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges().filter(move |edge| edge.target() == node)
    }

    /// Add a node.
    pub fn add_node(&mut self, node: Node) -> Result<(), DiagramError> {
        if self.contains_node(node.id()) {
            return Err(DiagramError::DuplicateNode(node.id().to_string()));
        }
        self.node_order.push(node.id().to_string());
        self.nodes.insert(node.id().to_string(), node);
        Ok(())
    }

    /// Remove a node together with every edge touching it.
    ///
    /// Returns the node and the cascaded edges, or `None` if absent.
    pub fn remove_node(&mut self, id: &str) -> Option<(Node, Vec<Edge>)> {
        let node = self.nodes.remove(id)?;
        self.node_order.retain(|node_id| node_id != id);

        let touching: Vec<EdgeId> = self
            .edges()
            .filter(|edge| edge.touches(id))
            .map(|edge| edge.id().to_string())
            .collect();
        let removed = touching
            .iter()
            .filter_map(|edge_id| self.remove_edge(edge_id))
            .collect();

        Some((node, removed))
    }

    /// Add an edge. Both endpoints must already be present.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), DiagramError> {
        let index = self.edge_order.len();
        self.insert_edge_at(index, edge)
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        self.take_edge(id).map(|(_, edge)| edge)
    }

    /// Remove an edge, returning its position in the insertion order so it
    /// can be put back exactly with [`Diagram::restore_edge`].
    pub(crate) fn take_edge(&mut self, id: &str) -> Option<(usize, Edge)> {
        let edge = self.edges.remove(id)?;
        let index = self
            .edge_order
            .iter()
            .position(|edge_id| edge_id == id)
            .unwrap_or(self.edge_order.len());
        if index < self.edge_order.len() {
            self.edge_order.remove(index);
        }
        Some((index, edge))
    }

    /// Put an edge back at the position it was taken from.
    pub(crate) fn restore_edge(&mut self, index: usize, edge: Edge) -> Result<(), DiagramError> {
        self.insert_edge_at(index, edge)
    }

    fn insert_edge_at(&mut self, index: usize, edge: Edge) -> Result<(), DiagramError> {
        if self.edges.contains_key(edge.id()) {
            return Err(DiagramError::DuplicateEdge(edge.id().to_string()));
        }
        for endpoint in [edge.source(), edge.target()] {
            if !self.contains_node(endpoint) {
                return Err(DiagramError::DanglingEdge {
                    edge: edge.id().to_string(),
                    node: endpoint.to_string(),
                });
            }
        }
        let index = index.min(self.edge_order.len());
        self.edge_order.insert(index, edge.id().to_string());
        self.edges.insert(edge.id().to_string(), edge);
        Ok(())
    }

    /// Activity, event and connection counts.
    pub fn summary(&self) -> DiagramSummary {
        let activities = self.activities().count();
        DiagramSummary {
            activities,
            events: self.nodes.len() - activities,
            connections: self.edges.len(),
        }
    }
}
