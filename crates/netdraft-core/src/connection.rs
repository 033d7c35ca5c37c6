//! Connection rules for edges between placed shapes.
//!
//! Edges always join an event and an activity, in either direction. An
//! event carries at most one outgoing and one incoming edge.

use crate::diagram::{Diagram, DiagramError};
use crate::outcome::{EdgeRole, Rejection};
use crate::shapes::{Edge, EdgeId, Node, NodeId};

/// A proposed edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectRequest {
    /// Id the edge receives if accepted.
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl ConnectRequest {
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Decide whether an edge is legal and build it with the default style.
pub fn validate_connection(request: ConnectRequest, diagram: &Diagram) -> Result<Edge, Rejection> {
    let source = endpoint(diagram, &request.source)?;
    let target = endpoint(diagram, &request.target)?;

    if source.kind() == target.kind() {
        return Err(Rejection::InvalidKindPair {
            from: request.source,
            from_kind: source.kind(),
            to: request.target,
            to_kind: target.kind(),
        });
    }

    if source.is_event() && diagram.outgoing(source.id()).next().is_some() {
        return Err(Rejection::EventAlreadyConnected {
            event: request.source,
            role: EdgeRole::Source,
        });
    }
    if target.is_event() && diagram.incoming(target.id()).next().is_some() {
        return Err(Rejection::EventAlreadyConnected {
            event: request.target,
            role: EdgeRole::Target,
        });
    }

    Ok(Edge::new(request.id, request.source, request.target))
}

fn endpoint<'a>(diagram: &'a Diagram, id: &str) -> Result<&'a Node, Rejection> {
    diagram
        .get_node(id)
        .ok_or_else(|| Rejection::UnknownEndpoint { id: id.to_string() })
}

/// Re-point an existing edge to a new source and target.
///
/// The old edge is taken out, the new pair is validated against the rest of
/// the diagram, and on rejection the old edge is put back exactly where it
/// was. The re-pointed edge keeps its id and style. The outer `Err` is only
/// returned when the diagram itself is inconsistent.
pub fn reconnect(
    diagram: &mut Diagram,
    edge_id: &str,
    source: impl Into<NodeId>,
    target: impl Into<NodeId>,
) -> Result<Result<Edge, Rejection>, DiagramError> {
    let Some((index, old)) = diagram.take_edge(edge_id) else {
        return Ok(Err(Rejection::UnknownEdge {
            id: edge_id.to_string(),
        }));
    };

    let request = ConnectRequest {
        id: old.id().to_string(),
        source: source.into(),
        target: target.into(),
    };

    match validate_connection(request, diagram) {
        Ok(edge) => {
            let edge = Edge {
                style: old.style.clone(),
                ..edge
            };
            match diagram.restore_edge(index, edge.clone()) {
                Ok(()) => Ok(Ok(edge)),
                Err(err) => {
                    log::error!("Reconnected edge {} could not be inserted: {}", edge_id, err);
                    diagram.restore_edge(index, old)?;
                    Err(err)
                }
            }
        }
        Err(rejection) => {
            diagram.restore_edge(index, old)?;
            Ok(Err(rejection))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{EdgeStyle, SerializableColor};
    use kurbo::Point;

    /// a1 -> e1 -> a2, plus a free event e2 and a free activity a3.
    fn network() -> Diagram {
        let mut diagram = Diagram::new();
        diagram
            .add_node(Node::activity("a1", Point::new(50.0, 50.0), 2))
            .unwrap();
        diagram
            .add_node(Node::activity("a2", Point::new(100.0, 50.0), 2))
            .unwrap();
        diagram
            .add_node(Node::activity("a3", Point::new(50.0, 150.0), 2))
            .unwrap();
        diagram.add_node(Node::event("e1", Point::new(100.0, 50.0))).unwrap();
        diagram.add_node(Node::event("e2", Point::new(50.0, 150.0))).unwrap();
        diagram.add_edge(Edge::new("x1", "a1", "e1")).unwrap();
        diagram.add_edge(Edge::new("x2", "e1", "a2")).unwrap();
        diagram
    }

    #[test]
    fn test_activity_to_event_accepted() {
        let diagram = network();
        let edge = validate_connection(ConnectRequest::new("x3", "a3", "e2"), &diagram).unwrap();
        assert_eq!(edge.id(), "x3");
        assert_eq!(edge.source(), "a3");
        assert_eq!(edge.target(), "e2");
        assert_eq!(edge.style, EdgeStyle::default());
    }

    #[test]
    fn test_event_to_activity_accepted() {
        let diagram = network();
        assert!(validate_connection(ConnectRequest::new("x3", "e2", "a3"), &diagram).is_ok());
    }

    #[test]
    fn test_same_kind_pairs_rejected() {
        let diagram = network();
        let activities = ["a1", "a2", "a3"];
        let events = ["e1", "e2"];
        for group in [&activities[..], &events[..]] {
            for &source in group {
                for &target in group {
                    let result =
                        validate_connection(ConnectRequest::new("x", source, target), &diagram);
                    assert!(
                        matches!(result, Err(Rejection::InvalidKindPair { .. })),
                        "{source} -> {target}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_unknown_endpoint() {
        let diagram = network();
        let result = validate_connection(ConnectRequest::new("x", "ghost", "e2"), &diagram);
        assert_eq!(result, Err(Rejection::UnknownEndpoint { id: "ghost".into() }));
        let result = validate_connection(ConnectRequest::new("x", "a3", "ghost"), &diagram);
        assert_eq!(result, Err(Rejection::UnknownEndpoint { id: "ghost".into() }));
    }

    #[test]
    fn test_second_outgoing_rejected() {
        let diagram = network();
        let result = validate_connection(ConnectRequest::new("x", "e1", "a3"), &diagram);
        assert_eq!(
            result,
            Err(Rejection::EventAlreadyConnected {
                event: "e1".into(),
                role: EdgeRole::Source,
            })
        );
    }

    #[test]
    fn test_second_incoming_rejected() {
        let diagram = network();
        let result = validate_connection(ConnectRequest::new("x", "a3", "e1"), &diagram);
        assert_eq!(
            result,
            Err(Rejection::EventAlreadyConnected {
                event: "e1".into(),
                role: EdgeRole::Target,
            })
        );
    }

    #[test]
    fn test_one_in_one_out_allowed() {
        let mut diagram = network();
        let incoming = validate_connection(ConnectRequest::new("x3", "a3", "e2"), &diagram).unwrap();
        diagram.add_edge(incoming).unwrap();
        let outgoing = validate_connection(ConnectRequest::new("x4", "e2", "a1"), &diagram).unwrap();
        diagram.add_edge(outgoing).unwrap();

        assert_eq!(diagram.incoming("e2").count(), 1);
        assert_eq!(diagram.outgoing("e2").count(), 1);
    }

    #[test]
    fn test_activities_have_no_cardinality_limit() {
        let mut diagram = network();
        diagram.add_node(Node::event("e3", Point::new(150.0, 50.0))).unwrap();
        // a1 already has an outgoing edge to e1
        assert!(validate_connection(ConnectRequest::new("x3", "a1", "e3"), &diagram).is_ok());
    }

    #[test]
    fn test_reconnect_to_valid_target() {
        let mut diagram = network();
        let edge = reconnect(&mut diagram, "x1", "a3", "e1").unwrap().unwrap();
        assert_eq!(edge.id(), "x1");
        assert_eq!(edge.source(), "a3");
        assert_eq!(diagram.get_edge("x1").unwrap().source(), "a3");
        assert_eq!(diagram.edge_count(), 2);
    }

    #[test]
    fn test_reconnect_keeps_style() {
        let mut diagram = network();
        let mut edge = diagram.remove_edge("x1").unwrap();
        edge.style.stroke_color = SerializableColor::new(10, 20, 30, 255);
        diagram.add_edge(edge).unwrap();

        let edge = reconnect(&mut diagram, "x1", "a3", "e1").unwrap().unwrap();
        assert_eq!(edge.style.stroke_color, SerializableColor::new(10, 20, 30, 255));
    }

    #[test]
    fn test_reconnect_to_invalid_target_restores_edge() {
        let mut diagram = network();
        let before: Vec<Edge> = diagram.edges().cloned().collect();

        let result = reconnect(&mut diagram, "x1", "a1", "a2").unwrap();
        assert!(matches!(result, Err(Rejection::InvalidKindPair { .. })));

        let after: Vec<Edge> = diagram.edges().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reconnect_same_pair_is_allowed() {
        // the old edge does not count against the event's cardinality
        let mut diagram = network();
        let edge = reconnect(&mut diagram, "x2", "e1", "a2").unwrap().unwrap();
        assert_eq!(edge.source(), "e1");
        assert_eq!(diagram.edge_count(), 2);
    }

    #[test]
    fn test_reconnect_into_occupied_event_restores_edge() {
        let mut diagram = network();
        diagram.add_edge(Edge::new("x3", "a3", "e2")).unwrap();

        let result = reconnect(&mut diagram, "x3", "a3", "e1").unwrap();
        assert!(matches!(
            result,
            Err(Rejection::EventAlreadyConnected { .. })
        ));
        assert_eq!(diagram.get_edge("x3").unwrap().target(), "e2");
    }

    #[test]
    fn test_reconnect_unknown_edge() {
        let mut diagram = network();
        let result = reconnect(&mut diagram, "nope", "a1", "e2").unwrap();
        assert_eq!(result, Err(Rejection::UnknownEdge { id: "nope".into() }));
        assert_eq!(diagram.edge_count(), 2);
    }
}
