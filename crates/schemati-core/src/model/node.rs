//! Node entity and its style.

use super::{CssColor, ElementId, ElementKind, ModelResult, check_finite, check_rect};
use crate::geometry::ShapeKind;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NODE_COLOR: &str = "#3b82f6";
pub const DEFAULT_NODE_FILL: &str = "#ffffff";
pub const DEFAULT_NODE_BORDER_WIDTH: f64 = 2.5;
pub const DEFAULT_NODE_CORNER_RADIUS: f64 = 8.0;
pub const DEFAULT_SHADOW_COLOR: &str = "rgba(0, 0, 0, 0.1)";
pub const DEFAULT_SHADOW_BLUR: f64 = 8.0;
pub const DEFAULT_SHADOW_OFFSET: Vec2 = Vec2::new(0.0, 2.0);
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
pub const DEFAULT_FONT_FAMILY: &str = "system-ui, -apple-system, sans-serif";
pub const DEFAULT_FONT_COLOR: &str = "#1f2937";
pub const DEFAULT_FONT_WEIGHT: &str = "500";

/// Horizontal text alignment inside a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Named node sizes offered by the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSizePreset {
    Small,
    #[default]
    Medium,
    Large,
}

impl NodeSizePreset {
    pub fn size(self) -> Size {
        match self {
            NodeSizePreset::Small => Size::new(120.0, 60.0),
            NodeSizePreset::Medium => Size::new(150.0, 80.0),
            NodeSizePreset::Large => Size::new(200.0, 100.0),
        }
    }
}

/// Optional per-node style overrides. Missing values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

impl NodeStyle {
    /// Overlay every value set in `patch` onto this style.
    pub fn merge(&mut self, patch: &NodeStyle) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if patch.$field.is_some() { self.$field = patch.$field.clone(); })*
            };
        }
        take!(
            color,
            background_color,
            border_color,
            border_width,
            border_radius,
            opacity,
            shadow_color,
            shadow_blur,
            shadow_offset_x,
            shadow_offset_y,
            font_size,
            font_family,
            font_color,
            font_weight,
            text_align
        );
    }
}

/// Drop shadow parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub color: CssColor,
    pub blur: f64,
    pub offset: Vec2,
}

impl Shadow {
    /// A shadow is drawn only when it has visible color.
    pub fn is_visible(&self) -> bool {
        !self.color.is_transparent()
    }
}

/// Node style with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNodeStyle {
    pub fill: CssColor,
    pub stroke: CssColor,
    pub stroke_width: f64,
    pub corner_radius: f64,
    pub opacity: f64,
    pub shadow: Shadow,
    pub font_size: f64,
    pub font_family: String,
    pub font_color: CssColor,
    pub font_weight: String,
    pub text_align: TextAlign,
}

/// A shaped, labelled diagram vertex. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub shape: ShapeKind,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub style: NodeStyle,
}

impl Node {
    /// Create a node with a fresh id after validating its geometry.
    pub fn new(shape: ShapeKind, bounds: Rect, label: impl Into<String>) -> ModelResult<Self> {
        check_rect(bounds.x0, bounds.y0, bounds.width(), bounds.height())?;
        Ok(Self {
            id: ElementId::generate(ElementKind::Node),
            x: bounds.x0,
            y: bounds.y0,
            width: bounds.width(),
            height: bounds.height(),
            shape,
            label: label.into(),
            style: NodeStyle::default(),
        })
    }

    /// Create a node of the shape's default size centered on `center`.
    pub fn with_default_size(
        shape: ShapeKind,
        center: Point,
        label: impl Into<String>,
    ) -> ModelResult<Self> {
        let size = shape.default_size();
        Self::new(shape, Rect::from_center_size(center, size), label)
    }

    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    /// Check the node's geometry invariants.
    pub fn validate(&self) -> ModelResult<()> {
        check_rect(self.x, self.y, self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Move the top-left corner to `(x, y)`.
    pub fn set_position(&mut self, x: f64, y: f64) -> ModelResult<()> {
        check_finite("x", x)?;
        check_finite("y", y)?;
        self.x = x;
        self.y = y;
        Ok(())
    }

    /// Resize, keeping the top-left corner fixed.
    pub fn resize(&mut self, width: f64, height: f64) -> ModelResult<()> {
        check_rect(self.x, self.y, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..self.clone()
        }
    }

    /// Boundary point facing `target`, used to anchor connections.
    pub fn edge_point(&self, target: Point) -> Point {
        self.shape.edge_point(self.center(), self.size(), target)
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.shape.hit_test(self.center(), self.size(), point)
    }

    pub fn resolved_style(&self) -> ResolvedNodeStyle {
        let s = &self.style;
        ResolvedNodeStyle {
            fill: s
                .background_color
                .clone()
                .unwrap_or_else(|| CssColor::from(DEFAULT_NODE_FILL)),
            stroke: s
                .border_color
                .clone()
                .or_else(|| s.color.clone())
                .unwrap_or_else(|| CssColor::from(DEFAULT_NODE_COLOR)),
            stroke_width: s.border_width.unwrap_or(DEFAULT_NODE_BORDER_WIDTH),
            corner_radius: s.border_radius.unwrap_or(DEFAULT_NODE_CORNER_RADIUS),
            opacity: s.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            shadow: Shadow {
                color: s
                    .shadow_color
                    .clone()
                    .unwrap_or_else(|| CssColor::from(DEFAULT_SHADOW_COLOR)),
                blur: s.shadow_blur.unwrap_or(DEFAULT_SHADOW_BLUR),
                offset: Vec2::new(
                    s.shadow_offset_x.unwrap_or(DEFAULT_SHADOW_OFFSET.x),
                    s.shadow_offset_y.unwrap_or(DEFAULT_SHADOW_OFFSET.y),
                ),
            },
            font_size: s.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            font_family: s
                .font_family
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            font_color: s
                .font_color
                .clone()
                .unwrap_or_else(|| CssColor::from(DEFAULT_FONT_COLOR)),
            font_weight: s
                .font_weight
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_WEIGHT.to_string()),
            text_align: s.text_align.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;

    #[test]
    fn test_new_rejects_degenerate_size() {
        let err = Node::new(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 0.0, 10.0), "x");
        assert!(matches!(err, Err(ModelError::NonPositiveDimension { what: "width", .. })));
    }

    #[test]
    fn test_default_sizes() {
        let node = Node::with_default_size(ShapeKind::Diamond, Point::new(100.0, 100.0), "d").unwrap();
        assert!((node.width - 120.0).abs() < f64::EPSILON);
        assert!((node.x - 40.0).abs() < f64::EPSILON);
        assert_eq!(NodeSizePreset::Large.size(), Size::new(200.0, 100.0));
    }

    #[test]
    fn test_resolved_style_defaults() {
        let node = Node::new(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 150.0, 80.0), "a").unwrap();
        let style = node.resolved_style();
        assert_eq!(style.stroke.as_str(), DEFAULT_NODE_COLOR);
        assert!((style.stroke_width - 2.5).abs() < f64::EPSILON);
        assert!((style.shadow.offset.y - 2.0).abs() < f64::EPSILON);
        assert!(style.shadow.is_visible());
    }

    #[test]
    fn test_legacy_color_drives_border() {
        let mut node = Node::new(ShapeKind::Circle, Rect::new(0.0, 0.0, 100.0, 100.0), "c").unwrap();
        node.style.color = Some(CssColor::from("#ef4444"));
        assert_eq!(node.resolved_style().stroke.as_str(), "#ef4444");
        node.style.border_color = Some(CssColor::from("#000000"));
        assert_eq!(node.resolved_style().stroke.as_str(), "#000000");
    }

    #[test]
    fn test_json_field_names() {
        let json = r##"{"id":"node-1","x":10,"y":20,"width":150,"height":80,"shape":"diamond","label":"A","backgroundColor":"#fff","fontSize":18}"##;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.shape, ShapeKind::Diamond);
        assert_eq!(node.style.font_size, Some(18.0));
        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["backgroundColor"], "#fff");
        assert!(out.get("borderColor").is_none());
    }

    #[test]
    fn test_merge_style_patch() {
        let mut style = NodeStyle {
            border_width: Some(1.0),
            ..Default::default()
        };
        style.merge(&NodeStyle {
            font_size: Some(20.0),
            ..Default::default()
        });
        assert_eq!(style.border_width, Some(1.0));
        assert_eq!(style.font_size, Some(20.0));
    }

    #[test]
    fn test_set_position_rejects_nan() {
        let mut node = Node::new(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0), "").unwrap();
        assert!(node.set_position(f64::NAN, 0.0).is_err());
        assert!(node.set_position(5.0, 6.0).is_ok());
        assert_eq!(node.center(), Point::new(10.0, 11.0));
    }
}
