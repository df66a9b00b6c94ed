//! Tool modes chosen in the shell's toolbar.

use crate::geometry::ShapeKind;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select, move, resize and marquee.
    #[default]
    Select,
    /// Drag out a node of the default shape.
    Node,
    /// Drag out a borderless text node.
    Text,
    /// Click a node, then another, to connect them.
    Connection,
    /// Drag out a grouping border.
    Border,
    /// Click an element to delete it.
    Delete,
    /// Drag to pan the viewport.
    Pan,
}

impl Tool {
    /// Whether this tool creates elements by dragging out a rectangle.
    pub fn creates_by_drag(self) -> bool {
        matches!(self, Tool::Node | Tool::Text | Tool::Border)
    }

    /// Shape and label for nodes created by this tool.
    pub fn node_template(self, default_shape: ShapeKind) -> Option<(ShapeKind, &'static str)> {
        match self {
            Tool::Node => Some((default_shape, "New Node")),
            Tool::Text => Some((ShapeKind::Rectangle, "Text")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_tool_always_makes_rectangles() {
        assert_eq!(
            Tool::Text.node_template(ShapeKind::Circle),
            Some((ShapeKind::Rectangle, "Text"))
        );
        assert_eq!(
            Tool::Node.node_template(ShapeKind::Diamond),
            Some((ShapeKind::Diamond, "New Node"))
        );
        assert_eq!(Tool::Border.node_template(ShapeKind::Circle), None);
        assert!(Tool::Border.creates_by_drag());
        assert!(!Tool::Pan.creates_by_drag());
    }
}
