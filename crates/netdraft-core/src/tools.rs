//! Toolbox drag state.

use crate::config::EditorConfig;
use crate::shapes::NodeKind;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

/// A shape being dragged out of the toolbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DragState {
    pub kind: NodeKind,
    /// Span the activity will get; always 1 for events.
    pub span: u32,
}

/// Tracks which shape, if any, is being dragged.
#[derive(Debug, Clone)]
pub struct ToolManager {
    drag: Option<DragState>,
    base_span: u32,
    alternate_span: u32,
}

impl ToolManager {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            drag: None,
            base_span: config.base_span,
            alternate_span: config.alternate_span,
        }
    }

    /// Start dragging a shape. Holding shift picks the alternate activity span.
    pub fn begin_drag(&mut self, kind: NodeKind, modifiers: Modifiers) -> DragState {
        let span = match kind {
            NodeKind::Activity if modifiers.shift => self.alternate_span,
            NodeKind::Activity => self.base_span,
            NodeKind::Event => 1,
        };
        let drag = DragState { kind, span };
        self.drag = Some(drag);
        drag
    }

    /// The drag in progress.
    pub fn current_drag(&self) -> Option<DragState> {
        self.drag
    }

    /// End the drag in progress, returning it.
    pub fn take_drag(&mut self) -> Option<DragState> {
        self.drag.take()
    }

    /// Abandon the drag in progress.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_selection() {
        let mut tools = ToolManager::new(&EditorConfig::default());

        let drag = tools.begin_drag(NodeKind::Activity, Modifiers::default());
        assert_eq!(drag.span, 2);

        let drag = tools.begin_drag(NodeKind::Activity, Modifiers::shift());
        assert_eq!(drag.span, 4);

        let drag = tools.begin_drag(NodeKind::Event, Modifiers::shift());
        assert_eq!(drag.span, 1);
    }

    #[test]
    fn test_take_drag_clears() {
        let mut tools = ToolManager::new(&EditorConfig::default());
        assert!(tools.take_drag().is_none());

        tools.begin_drag(NodeKind::Event, Modifiers::default());
        assert_eq!(tools.current_drag().map(|d| d.kind), Some(NodeKind::Event));
        assert!(tools.take_drag().is_some());
        assert!(tools.current_drag().is_none());

        tools.begin_drag(NodeKind::Activity, Modifiers::default());
        tools.cancel_drag();
        assert!(tools.take_drag().is_none());
    }
}
