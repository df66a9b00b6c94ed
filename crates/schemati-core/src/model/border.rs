use super::node::Shadow;
use super::{CssColor, ElementId, ElementKind, ModelResult, check_rect};
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BORDER_COLOR: &str = "#6b7280";
pub const DEFAULT_BORDER_LINE_WIDTH: f64 = 2.0;

/// Optional per-border style overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<CssColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
}

impl BorderStyle {
    pub fn merge(&mut self, patch: &BorderStyle) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if patch.$field.is_some() { self.$field = patch.$field.clone(); })*
            };
        }
        take!(
            color,
            line_width,
            background_color,
            background_opacity,
            opacity,
            border_radius,
            shadow_color,
            shadow_blur,
            shadow_offset_x,
            shadow_offset_y
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBorderStyle {
    pub stroke: CssColor,
    pub line_width: f64,
    pub fill: CssColor,
    /// Opacity of the fill only, independent of `opacity`.
    pub fill_opacity: f64,
    pub opacity: f64,
    pub corner_radius: f64,
    pub shadow: Shadow,
}

/// A decorative grouping rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(flatten)]
    pub style: BorderStyle,
}

impl Border {
    pub fn new(bounds: Rect) -> ModelResult<Self> {
        check_rect(bounds.x0, bounds.y0, bounds.width(), bounds.height())?;
        Ok(Self {
            id: ElementId::generate(ElementKind::Border),
            x: bounds.x0,
            y: bounds.y0,
            w: bounds.width(),
            h: bounds.height(),
            style: BorderStyle::default(),
        })
    }

    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_style(mut self, style: BorderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_rect(self.x, self.y, self.w, self.h)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..self.clone()
        }
    }

    pub fn resolved_style(&self) -> ResolvedBorderStyle {
        let s = &self.style;
        ResolvedBorderStyle {
            stroke: s
                .color
                .clone()
                .unwrap_or_else(|| CssColor::from(DEFAULT_BORDER_COLOR)),
            line_width: s.line_width.unwrap_or(DEFAULT_BORDER_LINE_WIDTH),
            fill: s
                .background_color
                .clone()
                .unwrap_or_else(CssColor::transparent),
            fill_opacity: s.background_opacity.unwrap_or(0.0).clamp(0.0, 1.0),
            opacity: s.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            corner_radius: s.border_radius.unwrap_or(0.0),
            shadow: Shadow {
                color: s
                    .shadow_color
                    .clone()
                    .unwrap_or_else(CssColor::transparent),
                blur: s.shadow_blur.unwrap_or(0.0),
                offset: Vec2::new(
                    s.shadow_offset_x.unwrap_or(0.0),
                    s.shadow_offset_y.unwrap_or(0.0),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_fill_or_shadow() {
        let border = Border::new(Rect::new(0.0, 0.0, 200.0, 100.0)).unwrap();
        let style = border.resolved_style();
        assert_eq!(style.stroke.as_str(), DEFAULT_BORDER_COLOR);
        assert!((style.fill_opacity).abs() < f64::EPSILON);
        assert!(!style.shadow.is_visible());
    }

    #[test]
    fn test_json_uses_short_size_fields() {
        let json = r##"{"id":"b1","x":0,"y":0,"w":10,"h":20,"lineWidth":3}"##;
        let border: Border = serde_json::from_str(json).unwrap();
        assert_eq!(border.bounds(), Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(border.style.line_width, Some(3.0));
        assert!(Border::new(Rect::new(0.0, 0.0, 10.0, 0.0)).is_err());
    }
}
