//! Label measurement and greedy word wrapping.

use crate::scene::TextAnchor;
use kurbo::Point;
use schemati_core::model::{Node, TextAlign};

/// Horizontal inset on each side of a node label. Left and right aligned
/// labels anchor at this inset, not at the node center.
pub const LABEL_PADDING: f64 = 12.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

/// Text width oracle used by the wrapper.
pub trait TextMeasure {
    /// Advance width of `text` at `font_size`, in logical units.
    fn measure(&self, text: &str, font_size: f64) -> f64;
}

/// Width estimate from per-character em fractions. Close enough for
/// sans-serif UI fonts without loading any font data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMetrics {
    pub narrow: f64,
    pub regular: f64,
    pub wide: f64,
}

impl Default for ApproximateMetrics {
    fn default() -> Self {
        Self {
            narrow: 0.3,
            regular: 0.55,
            wide: 0.8,
        }
    }
}

impl TextMeasure for ApproximateMetrics {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars()
            .map(|c| match c {
                'i' | 'j' | 'l' | 't' | 'f' | 'r' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!'
                | '|' | ' ' => self.narrow,
                'm' | 'w' | 'M' | 'W' | '@' => self.wide,
                c if c.is_uppercase() => (self.regular + self.wide) / 2.0,
                _ => self.regular,
            })
            .sum::<f64>()
            * font_size
    }
}

/// Break `text` into lines no wider than `max_width`, splitting only at spaces.
///
/// A single word wider than `max_width` stays on its own line.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64, measure: &impl TextMeasure) -> Vec<String> {
    let mut words = text.split(' ');
    let mut current = words.next().unwrap_or_default().to_string();
    let mut lines = Vec::new();
    for word in words {
        let candidate = format!("{current} {word}");
        if measure.measure(&candidate, font_size) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLine {
    pub text: String,
    /// Anchor point; `y` is the line's vertical center.
    pub position: Point,
}

/// Wrapped label lines for a node, centered vertically as a block.
pub fn layout_label(node: &Node, measure: &impl TextMeasure) -> (Vec<LabelLine>, TextAnchor) {
    let style = node.resolved_style();
    let (x, anchor) = match style.text_align {
        TextAlign::Left => (node.x + LABEL_PADDING, TextAnchor::Start),
        TextAlign::Center => (node.x + node.width / 2.0, TextAnchor::Middle),
        TextAlign::Right => (node.x + node.width - LABEL_PADDING, TextAnchor::End),
    };
    if node.label.is_empty() {
        return (Vec::new(), anchor);
    }

    let max_width = node.width - 2.0 * LABEL_PADDING;
    let wrapped = wrap_text(&node.label, max_width, style.font_size, measure);
    let line_height = style.font_size * LINE_HEIGHT_FACTOR;
    let block = wrapped.len() as f64 * line_height;
    let first = node.y + node.height / 2.0 - block / 2.0 + line_height / 2.0;

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, text)| LabelLine {
            text,
            position: Point::new(x, first + i as f64 * line_height),
        })
        .collect();
    (lines, anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use schemati_core::geometry::ShapeKind;

    /// Every character is exactly one unit wide at font size 1.
    struct Monospace;

    impl TextMeasure for Monospace {
        fn measure(&self, text: &str, font_size: f64) -> f64 {
            text.chars().count() as f64 * font_size
        }
    }

    #[test]
    fn test_wrap_greedy() {
        let lines = wrap_text("alpha beta gamma delta", 11.0, 1.0, &Monospace);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
        let long = wrap_text("extraordinarily long", 5.0, 1.0, &Monospace);
        assert_eq!(long, vec!["extraordinarily", "long"]);
        assert_eq!(wrap_text("", 5.0, 1.0, &Monospace), vec![""]);
    }

    #[test]
    fn test_label_block_is_vertically_centered() {
        let node = Node::new(
            ShapeKind::Rectangle,
            Rect::new(0.0, 0.0, 124.0, 100.0),
            "aaaaa bbbbb ccccc",
        )
        .unwrap();
        // max width 100 at font size 14: 7 chars per line.
        let (lines, anchor) = layout_label(&node, &Monospace);
        assert_eq!(anchor, TextAnchor::Middle);
        assert_eq!(lines.len(), 3);
        let line_height = 14.0 * LINE_HEIGHT_FACTOR;
        assert!((lines[1].position.y - 50.0).abs() < 1e-9);
        assert!((lines[0].position.y - (50.0 - line_height)).abs() < 1e-9);
        assert_eq!(lines[0].position.x, 62.0);
    }

    #[test]
    fn test_approximate_metrics_scale_with_font_size() {
        let metrics = ApproximateMetrics::default();
        let small = metrics.measure("Payment", 10.0);
        let large = metrics.measure("Payment", 20.0);
        assert!((large - 2.0 * small).abs() < 1e-9);
        assert!(metrics.measure("mmm", 10.0) > metrics.measure("iii", 10.0));
    }

    #[test]
    fn test_side_alignment_anchors_at_inset() {
        let mut node = Node::new(ShapeKind::Rectangle, Rect::new(10.0, 0.0, 160.0, 80.0), "Api")
            .unwrap();
        node.style.text_align = Some(TextAlign::Left);
        let (lines, anchor) = layout_label(&node, &Monospace);
        assert_eq!(anchor, TextAnchor::Start);
        assert_eq!(lines[0].position.x, 10.0 + LABEL_PADDING);

        node.style.text_align = Some(TextAlign::Right);
        let (lines, anchor) = layout_label(&node, &Monospace);
        assert_eq!(anchor, TextAnchor::End);
        assert_eq!(lines[0].position.x, 160.0 - LABEL_PADDING);
    }
}
