//! Placement rules for dropped shapes.
//!
//! Activities land on the grid intersection nearest the pointer, provided
//! the pointer was close to a grid line and the whole span fits. Events snap
//! to the nearest head or butt of an existing activity.

use crate::config::EditorConfig;
use crate::diagram::Diagram;
use crate::grid::GridSpec;
use crate::outcome::Rejection;
use crate::shapes::{AttachmentPoint, Node, NodeId, NodeKind};
use kurbo::Point;

/// A proposed drop.
#[derive(Debug, Clone, PartialEq)]
pub struct DropRequest {
    /// Id the node receives if the drop is accepted.
    pub id: NodeId,
    pub kind: NodeKind,
    /// Raw pointer position in world coordinates.
    pub point: Point,
    /// Span selected at drag start. Ignored for events.
    pub span: u32,
}

/// Decide whether a drop is legal and build the node to insert.
///
/// Pure: the diagram is only read.
pub fn validate_drop(
    request: DropRequest,
    diagram: &Diagram,
    config: &EditorConfig,
) -> Result<Node, Rejection> {
    // NaN would cast to cell 0 and pass every bounds check
    if !request.point.is_finite() {
        let span = match request.kind {
            NodeKind::Activity => request.span.max(1),
            NodeKind::Event => 1,
        };
        return Err(Rejection::OutOfGrid {
            point: request.point,
            cell: config.grid.to_cell(request.point),
            span,
        });
    }

    match request.kind {
        NodeKind::Activity => place_activity(request, config),
        NodeKind::Event => place_event(request, diagram, config),
    }
}

fn place_activity(request: DropRequest, config: &EditorConfig) -> Result<Node, Rejection> {
    let grid = &config.grid;
    let span = request.span.max(1);
    let snapped = grid.quantize(request.point);
    let cell = grid.to_cell(snapped);

    if !grid.span_fits(cell, span) {
        return Err(Rejection::OutOfGrid {
            point: request.point,
            cell,
            span,
        });
    }

    let threshold = config.border_threshold;
    let on_border = grid.near_border(request.point.x, threshold)
        || grid.near_border(request.point.y, threshold);
    if !on_border {
        return Err(Rejection::NotOnBorder {
            point: request.point,
            threshold,
        });
    }

    Ok(Node::activity(request.id, snapped, span))
}

fn place_event(
    request: DropRequest,
    diagram: &Diagram,
    config: &EditorConfig,
) -> Result<Node, Rejection> {
    let grid = &config.grid;
    let threshold = config.attach_threshold();

    let Some(target) = nearest_attachment(request.point, diagram, grid, threshold) else {
        return Err(Rejection::NoNearbyAttachment {
            point: request.point,
            threshold,
        });
    };

    // unreachable while activities stay inside the grid
    let cell = grid.to_cell(target.point);
    if !grid.in_bounds(cell) {
        return Err(Rejection::OutOfGrid {
            point: target.point,
            cell,
            span: 1,
        });
    }

    log::debug!(
        "Event {} snapped to {:?} of {}",
        request.id,
        target.end,
        target.activity
    );
    Ok(Node::event(request.id, target.point))
}

/// Find the attachment point closest to `point` within `threshold`.
///
/// Distance is Euclidean and the threshold is inclusive. Activities are
/// scanned in insertion order, head before butt, and a candidate only
/// replaces the current best when strictly closer, so ties go to the
/// first one found. Points off the grid, such as the butt of an activity
/// flush with the right edge, are never candidates.
pub fn nearest_attachment(
    point: Point,
    diagram: &Diagram,
    grid: &GridSpec,
    threshold: f64,
) -> Option<AttachmentPoint> {
    if !point.is_finite() {
        return None;
    }

    let limit_sq = threshold * threshold;
    let mut best: Option<(f64, AttachmentPoint)> = None;

    for activity in diagram.activities() {
        for candidate in activity.attachment_points(grid.cell_size()) {
            let dist_sq = (candidate.point - point).hypot2();
            if dist_sq > limit_sq || !grid.in_bounds(grid.to_cell(candidate.point)) {
                continue;
            }
            let closer = match &best {
                Some((best_sq, _)) => dist_sq < *best_sq,
                None => true,
            };
            if closer {
                best = Some((dist_sq, candidate));
            }
        }
    }

    best.map(|(_, target)| target)
}
