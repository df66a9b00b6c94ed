//! Backend-agnostic display list.
//!
//! The pipeline fills a [`Scene`] once per frame or export; the SVG and
//! raster backends only ever read it.

use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
use peniko::Color;
use schemati_core::model::{ElementId, ElementKind};

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub dash: Option<Vec<f64>>,
    /// Round caps and joins.
    pub round: bool,
}

impl StrokeStyle {
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
            round: false,
        }
    }

    pub fn with_dash(mut self, dash: Option<Vec<f64>>) -> Self {
        self.dash = dash;
        self
    }

    pub fn rounded(mut self) -> Self {
        self.round = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropShadow {
    pub color: Color,
    pub blur: f64,
    pub offset: Vec2,
}

/// Fill, stroke and compositing for one primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub fill: Option<Color>,
    pub stroke: Option<StrokeStyle>,
    pub opacity: f64,
    pub shadow: Option<DropShadow>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            opacity: 1.0,
            shadow: None,
        }
    }
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    pub fn stroke(stroke: StrokeStyle) -> Self {
        Self {
            stroke: Some(stroke),
            ..Self::default()
        }
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_shadow(mut self, shadow: Option<DropShadow>) -> Self {
        self.shadow = shadow;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

/// One line of text, vertically centered on `position.y`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub position: Point,
    pub anchor: TextAnchor,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned rectangle with optional corner radius.
    Rect { rect: Rect, radius: f64 },
    Ellipse { center: Point, radii: Vec2 },
    /// Closed polygon.
    Polygon(Vec<Point>),
    /// Open polyline.
    Polyline(Vec<Point>),
    Path(BezPath),
    Text(TextRun),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub primitive: Primitive,
    pub paint: Paint,
}

impl Item {
    pub fn new(primitive: Primitive, paint: Paint) -> Self {
        Self { primitive, paint }
    }
}

/// Identifies the diagram element a group was drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementTag {
    pub kind: ElementKind,
    pub id: ElementId,
    /// Logical bounds of the element.
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub tag: Option<ElementTag>,
    pub items: Vec<Item>,
}

impl Group {
    pub fn tagged(tag: ElementTag) -> Self {
        Self {
            tag: Some(tag),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive, paint: Paint) {
        self.items.push(Item::new(primitive, paint));
    }
}

/// A frame's worth of drawing, in logical coordinates under `transform`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Output surface size in pixels.
    pub size: Size,
    /// Logical to surface transform.
    pub transform: Affine,
    pub background: Option<Color>,
    pub groups: Vec<Group>,
}

impl Scene {
    pub fn new(size: Size, transform: Affine) -> Self {
        Self {
            size,
            transform,
            background: None,
            groups: Vec::new(),
        }
    }

    /// Append an untagged group holding a single primitive.
    pub fn push(&mut self, primitive: Primitive, paint: Paint) {
        let mut group = Group::default();
        group.push(primitive, paint);
        self.groups.push(group);
    }

    pub fn push_group(&mut self, group: Group) {
        if !group.items.is_empty() {
            self.groups.push(group);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Tagged groups of one element kind, in draw order.
    pub fn tagged(&self, kind: ElementKind) -> impl Iterator<Item = &Group> {
        self.groups
            .iter()
            .filter(move |g| g.tag.as_ref().is_some_and(|t| t.kind == kind))
    }
}
