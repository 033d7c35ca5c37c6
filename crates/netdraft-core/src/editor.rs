//! Editor session: routes user gestures through the validators and applies
//! accepted decisions to the diagram.
//!
//! Accepted drops are queued and become visible on the next
//! [`Editor::end_frame`]. Every gesture commits the queue before it is
//! validated, so deferring a drop never changes what a later gesture sees.

use crate::config::{ConfigError, EditorConfig};
use crate::connection::{self, ConnectRequest, validate_connection};
use crate::diagram::{Diagram, DiagramError, DiagramSummary};
use crate::document::{DiagramDocument, LoadReport};
use crate::outcome::Outcome;
use crate::placement::{DropRequest, validate_drop};
use crate::shapes::{Edge, EdgeId, Node, NodeId, NodeKind, new_edge_id, new_node_id};
use crate::storage::{Storage, StorageError};
use crate::tools::{DragState, Modifiers, ToolManager};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from editor operations that touch storage.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Diagram(#[from] DiagramError),
}

/// A discrete user gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gesture {
    BeginDrag {
        kind: NodeKind,
        #[serde(default)]
        shift: bool,
    },
    Drop {
        x: f64,
        y: f64,
    },
    Connect {
        source: NodeId,
        target: NodeId,
    },
    Reconnect {
        edge: EdgeId,
        source: NodeId,
        target: NodeId,
    },
    DeleteNode {
        id: NodeId,
    },
    DeleteEdge {
        id: EdgeId,
    },
    EndFrame,
}

/// What a gesture did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum GestureReport {
    DragStarted(DragState),
    Drop(Outcome<Node>),
    /// A drop arrived with nothing being dragged.
    DropIgnored,
    Connect(Outcome<Edge>),
    Reconnect(Outcome<Edge>),
    NodeDeleted {
        id: NodeId,
        removed: bool,
        cascaded_edges: Vec<EdgeId>,
    },
    EdgeDeleted {
        id: EdgeId,
        removed: bool,
    },
    FrameEnded {
        committed: usize,
    },
}

/// An editing session over one diagram.
pub struct Editor {
    config: EditorConfig,
    diagram: Diagram,
    tools: ToolManager,
    /// Accepted drops waiting for the next frame.
    pending: Vec<Node>,
}

impl Editor {
    /// Create an editor with an empty diagram.
    pub fn new(config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tools: ToolManager::new(&config),
            config,
            diagram: Diagram::new(),
            pending: Vec::new(),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The committed diagram.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Accepted drops not yet committed.
    pub fn pending(&self) -> &[Node] {
        &self.pending
    }

    pub fn summary(&self) -> DiagramSummary {
        self.diagram.summary()
    }

    /// Start dragging a shape out of the toolbox.
    pub fn begin_drag(&mut self, kind: NodeKind, modifiers: Modifiers) -> DragState {
        self.tools.begin_drag(kind, modifiers)
    }

    /// Drop the dragged shape at a world position.
    ///
    /// Returns `None` when nothing was being dragged.
    pub fn drop_at(&mut self, point: Point) -> Result<Option<Outcome<Node>>, DiagramError> {
        self.commit_pending()?;

        let Some(drag) = self.tools.take_drag() else {
            log::debug!("Ignoring drop at {:?}: no shape being dragged", point);
            return Ok(None);
        };

        let request = DropRequest {
            id: new_node_id(drag.kind),
            kind: drag.kind,
            point,
            span: drag.span,
        };
        let outcome = Outcome::from(validate_drop(request, &self.diagram, &self.config));

        match &outcome {
            Outcome::Accepted(node) => {
                log::debug!("Accepted {} {} at {:?}", node.kind(), node.id(), node.position());
                self.pending.push(node.clone());
            }
            Outcome::Rejected(reason) => log::debug!("Rejected {} drop: {}", drag.kind, reason),
        }
        Ok(Some(outcome))
    }

    /// Commit queued drops. Returns how many nodes were added.
    pub fn end_frame(&mut self) -> Result<usize, DiagramError> {
        self.commit_pending()
    }

    fn commit_pending(&mut self) -> Result<usize, DiagramError> {
        let count = self.pending.len();
        for node in std::mem::take(&mut self.pending) {
            self.diagram.add_node(node).inspect_err(|err| {
                log::error!("Failed to commit accepted node: {}", err);
            })?;
        }
        Ok(count)
    }

    /// Connect two placed shapes.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<Outcome<Edge>, DiagramError> {
        self.commit_pending()?;

        let request = ConnectRequest::new(new_edge_id(), source, target);
        match validate_connection(request, &self.diagram) {
            Ok(edge) => {
                self.diagram.add_edge(edge.clone()).inspect_err(|err| {
                    log::error!("Failed to apply accepted edge: {}", err);
                })?;
                log::debug!("Connected {} -> {} as {}", source, target, edge.id());
                Ok(Outcome::Accepted(edge))
            }
            Err(reason) => {
                log::debug!("Rejected connection {} -> {}: {}", source, target, reason);
                Ok(Outcome::Rejected(reason))
            }
        }
    }

    /// Re-point an existing edge. On rejection the edge is left unchanged.
    pub fn reconnect(
        &mut self,
        edge_id: &str,
        source: &str,
        target: &str,
    ) -> Result<Outcome<Edge>, DiagramError> {
        self.commit_pending()?;

        let result = connection::reconnect(&mut self.diagram, edge_id, source, target)
            .inspect_err(|err| log::error!("Reconnecting {} corrupted the diagram: {}", edge_id, err))?;
        if let Err(reason) = &result {
            log::debug!("Rejected reconnection of {}: {}", edge_id, reason);
        }
        Ok(result.into())
    }

    /// Delete a node and every edge touching it.
    pub fn delete_node(&mut self, id: &str) -> Result<Option<(Node, Vec<Edge>)>, DiagramError> {
        self.commit_pending()?;
        let removed = self.diagram.remove_node(id);
        if let Some((_, edges)) = &removed {
            log::debug!("Deleted node {} and {} edge(s)", id, edges.len());
        }
        Ok(removed)
    }

    /// Delete an edge.
    pub fn delete_edge(&mut self, id: &str) -> Result<Option<Edge>, DiagramError> {
        self.commit_pending()?;
        Ok(self.diagram.remove_edge(id))
    }

    /// Apply a gesture and describe the result.
    pub fn apply(&mut self, gesture: Gesture) -> Result<GestureReport, DiagramError> {
        let report = match gesture {
            Gesture::BeginDrag { kind, shift } => {
                let modifiers = Modifiers {
                    shift,
                    ..Modifiers::default()
                };
                GestureReport::DragStarted(self.begin_drag(kind, modifiers))
            }
            Gesture::Drop { x, y } => match self.drop_at(Point::new(x, y))? {
                Some(outcome) => GestureReport::Drop(outcome),
                None => GestureReport::DropIgnored,
            },
            Gesture::Connect { source, target } => {
                GestureReport::Connect(self.connect(&source, &target)?)
            }
            Gesture::Reconnect {
                edge,
                source,
                target,
            } => GestureReport::Reconnect(self.reconnect(&edge, &source, &target)?),
            Gesture::DeleteNode { id } => {
                let removed = self.delete_node(&id)?;
                GestureReport::NodeDeleted {
                    removed: removed.is_some(),
                    cascaded_edges: removed
                        .map(|(_, edges)| edges.iter().map(|e| e.id().to_string()).collect())
                        .unwrap_or_default(),
                    id,
                }
            }
            Gesture::DeleteEdge { id } => {
                let removed = self.delete_edge(&id)?.is_some();
                GestureReport::EdgeDeleted { id, removed }
            }
            Gesture::EndFrame => GestureReport::FrameEnded {
                committed: self.end_frame()?,
            },
        };
        Ok(report)
    }

    /// Snapshot the diagram, including queued drops.
    pub fn document(&mut self) -> Result<DiagramDocument, DiagramError> {
        self.commit_pending()?;
        Ok(DiagramDocument::from_diagram(&self.diagram))
    }

    /// Save the diagram under the configured storage key.
    pub async fn save<S: Storage + ?Sized>(&mut self, storage: &S) -> Result<(), EditorError> {
        let document = self.document()?;
        storage.save(&self.config.storage_key, &document).await?;
        log::info!(
            "Saved {} node(s) and {} edge(s) to {}",
            document.nodes.len(),
            document.edges.len(),
            self.config.storage_key
        );
        Ok(())
    }

    /// Replace the diagram with the one stored under the configured key.
    ///
    /// Returns `Ok(None)` and leaves the diagram untouched when nothing is
    /// stored.
    pub async fn load<S: Storage + ?Sized>(
        &mut self,
        storage: &S,
    ) -> Result<Option<LoadReport>, EditorError> {
        let document = match storage.load(&self.config.storage_key).await {
            Ok(document) => document,
            Err(StorageError::NotFound(key)) => {
                log::info!("Nothing stored under {}", key);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let (diagram, report) = document.into_diagram(&self.config);
        self.diagram = diagram;
        self.pending.clear();
        self.tools.cancel_drag();
        log::info!(
            "Loaded {} node(s) and {} edge(s) from {}",
            report.nodes_loaded,
            report.edges_loaded,
            self.config.storage_key
        );
        Ok(Some(report))
    }
}
