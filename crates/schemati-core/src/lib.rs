//! Schemati Core Library
//!
//! Data model, geometry, snapping, selection and the interactive editing
//! state machine for the Schemati diagram editor. Rendering and export
//! live in `schemati-render`.

pub mod arrange;
pub mod config;
pub mod context;
pub mod diagram;
pub mod document;
pub mod edit;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod routing;
pub mod selection;
pub mod snap;
pub mod tools;
pub mod viewport;

pub use arrange::{AlignDirection, DistributeDirection, ZOrderAction};
pub use config::{EditorConfig, StyleDefaults};
pub use context::{DiagramContext, DiagramStatistics};
pub use diagram::{ChangeSink, Diagram};
pub use document::{DiagramDocument, DocumentError, DocumentResult};
pub use geometry::ShapeKind;
pub use input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{Editor, Gesture, Preview};
pub use layout::Layout;
pub use model::{
    Border, Connection, CssColor, ElementId, ElementKind, ElementRef, ModelError, ModelResult,
    Node, RoutingStyle, ValidationReport,
};
pub use routing::{ConnectionRoute, RoutePath};
pub use selection::Selection;
pub use snap::{GuideAxis, SnapGuide, snap_to_grid, GRID_SIZE};
pub use tools::Tool;
pub use viewport::Viewport;
