//! Automatic placement: whole-diagram arrangements and the spot for one new node.

use crate::model::Node;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

const START: Point = Point::new(100.0, 100.0);
const SPACING: f64 = 200.0;
const VERTICAL_SPACING: f64 = 150.0;
const MIN_CIRCLE_RADIUS: f64 = 200.0;
const RADIUS_PER_NODE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Horizontal,
    Vertical,
    Grid,
    Circular,
}

/// Reposition every node according to `layout`. Sizes are untouched.
pub fn arrange_nodes(nodes: &[Node], layout: Layout) -> Vec<Node> {
    let count = nodes.len();
    let columns = (count as f64).sqrt().ceil().max(1.0) as usize;
    let radius = MIN_CIRCLE_RADIUS.max(count as f64 * RADIUS_PER_NODE);

    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let index = i as f64;
            let origin = match layout {
                Layout::Horizontal => Point::new(START.x + index * SPACING, START.y),
                Layout::Vertical => Point::new(START.x, START.y + index * VERTICAL_SPACING),
                Layout::Grid => Point::new(
                    START.x + (i % columns) as f64 * SPACING,
                    START.y + (i / columns) as f64 * VERTICAL_SPACING,
                ),
                Layout::Circular => {
                    let center = Point::new(START.x + radius, START.y + radius);
                    let angle = TAU * index / count as f64 - FRAC_PI_2;
                    Point::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    )
                }
            };
            let mut placed = node.clone();
            placed.x = origin.x;
            placed.y = origin.y;
            placed
        })
        .collect()
}

/// Top-left corner for one more node next to `existing`.
pub fn auto_position(existing: &[Node], layout: Layout) -> Point {
    if existing.is_empty() {
        return START;
    }
    match layout {
        Layout::Horizontal => {
            let right = existing
                .iter()
                .map(|n| n.x + n.width)
                .fold(f64::NEG_INFINITY, f64::max);
            Point::new(right + SPACING, START.y)
        }
        Layout::Vertical => {
            let bottom = existing
                .iter()
                .map(|n| n.y + n.height)
                .fold(f64::NEG_INFINITY, f64::max);
            Point::new(START.x, bottom + VERTICAL_SPACING)
        }
        Layout::Grid => {
            let n = existing.len();
            let columns = ((n + 1) as f64).sqrt().ceil() as usize;
            Point::new(
                START.x + (n % columns) as f64 * SPACING,
                START.y + (n / columns) as f64 * VERTICAL_SPACING,
            )
        }
        Layout::Circular => START,
    }
}
