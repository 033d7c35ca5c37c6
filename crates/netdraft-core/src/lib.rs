//! NetDraft Core Library
//!
//! Placement, snapping and connection rules for activity network diagrams.
//! Rendering and input plumbing live outside this crate; it consumes
//! geometric gestures and hands back accept/reject decisions.

pub mod config;
pub mod connection;
pub mod diagram;
pub mod document;
pub mod editor;
pub mod grid;
pub mod outcome;
pub mod placement;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use config::{ConfigError, EditorConfig};
pub use connection::{ConnectRequest, reconnect, validate_connection};
pub use diagram::{Diagram, DiagramError, DiagramSummary};
pub use document::{DiagramDocument, EdgeRecord, LoadReport, NodeRecord};
pub use editor::{Editor, EditorError, Gesture, GestureReport};
pub use grid::{Cell, GridSpec};
pub use outcome::{EdgeRole, Outcome, Rejection, RejectionReport};
pub use placement::{DropRequest, nearest_attachment, validate_drop};
pub use shapes::{Edge, EdgeId, EdgeStyle, Node, NodeId, NodeKind};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use tools::{DragState, Modifiers, ToolManager};
