//! Connection entity and its stroke/arrow style.

use super::{CssColor, ElementId, ElementKind, ModelError, ModelResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONNECTION_COLOR: &str = "#6b7280";
pub const DEFAULT_CONNECTION_WIDTH: f64 = 2.5;
pub const DEFAULT_DASH_LENGTH: f64 = 8.0;
pub const DEFAULT_GAP_LENGTH: f64 = 4.0;
pub const DEFAULT_ARROW_SIZE: f64 = 12.0;

/// How a connection is routed between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStyle {
    Straight,
    #[default]
    Curved,
    Orthogonal,
}

impl RoutingStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            RoutingStyle::Straight => "straight",
            RoutingStyle::Curved => "curved",
            RoutingStyle::Orthogonal => "orthogonal",
        }
    }
}

/// Stroke dash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Arrowhead drawn at the target end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    #[default]
    Filled,
    Outlined,
    None,
}

/// Optional per-connection style overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_style: Option<ArrowStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curvature: Option<f64>,
}

impl ConnectionStyle {
    pub fn merge(&mut self, patch: &ConnectionStyle) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if patch.$field.is_some() { self.$field = patch.$field.clone(); })*
            };
        }
        take!(
            color,
            width,
            opacity,
            line_style,
            dash_length,
            gap_length,
            arrow_size,
            arrow_style,
            curvature
        );
    }
}

/// Connection style with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConnectionStyle {
    pub color: CssColor,
    pub width: f64,
    pub opacity: f64,
    pub line_style: LineStyle,
    pub dash_length: f64,
    pub gap_length: f64,
    pub arrow_size: f64,
    pub arrow_style: ArrowStyle,
    pub curvature: f64,
}

impl ResolvedConnectionStyle {
    /// Dash intervals for the stroke, `None` when solid.
    pub fn dash_pattern(&self) -> Option<[f64; 2]> {
        match self.line_style {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some([self.dash_length, self.gap_length]),
            LineStyle::Dotted => Some([1.0, self.gap_length]),
        }
    }
}

/// A directed, styled edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ElementId,
    pub from: ElementId,
    pub to: ElementId,
    #[serde(default)]
    pub style: RoutingStyle,
    #[serde(flatten)]
    pub stroke: ConnectionStyle,
}

impl Connection {
    /// Create a connection with a fresh id. Endpoint existence is checked
    /// by the diagram, not here.
    pub fn new(from: ElementId, to: ElementId, style: RoutingStyle) -> ModelResult<Self> {
        let id = ElementId::generate(ElementKind::Connection);
        if from == to {
            return Err(ModelError::SelfLoop(id));
        }
        Ok(Self {
            id,
            from,
            to,
            style,
            stroke: ConnectionStyle::default(),
        })
    }

    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_stroke(mut self, stroke: ConnectionStyle) -> Self {
        self.stroke = stroke;
        self
    }

    /// Whether this connection touches the given node.
    pub fn touches(&self, node: &ElementId) -> bool {
        &self.from == node || &self.to == node
    }

    pub fn resolved_style(&self) -> ResolvedConnectionStyle {
        let s = &self.stroke;
        ResolvedConnectionStyle {
            color: s
                .color
                .clone()
                .unwrap_or_else(|| CssColor::from(DEFAULT_CONNECTION_COLOR)),
            width: s.width.unwrap_or(DEFAULT_CONNECTION_WIDTH),
            opacity: s.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            line_style: s.line_style.unwrap_or_default(),
            dash_length: s.dash_length.unwrap_or(DEFAULT_DASH_LENGTH),
            gap_length: s.gap_length.unwrap_or(DEFAULT_GAP_LENGTH),
            arrow_size: s.arrow_size.unwrap_or(DEFAULT_ARROW_SIZE),
            arrow_style: s.arrow_style.unwrap_or_default(),
            curvature: s.curvature.unwrap_or(1.0),
        }
    }
}
