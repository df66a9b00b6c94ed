//! Grid snapping and magnetic alignment snapping.

use crate::model::{Border, ElementId, Node};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Default magnetic snap distance in logical units.
pub const SNAP_THRESHOLD: f64 = 15.0;

/// Within `threshold * SNAP_LOCK_FRACTION` a snap lands exactly on the line.
pub const SNAP_LOCK_FRACTION: f64 = 0.2;

/// Round a value to the nearest grid line.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Round both coordinates of a point to the grid.
pub fn snap_point_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_to_grid(point.x, grid_size), snap_to_grid(point.y, grid_size))
}

/// Orientation of an alignment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideAxis {
    /// A line of constant x.
    Vertical,
    /// A line of constant y.
    Horizontal,
}

/// A line the moving element may align to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    pub axis: GuideAxis,
    pub position: f64,
    /// 1 = viewport edge, 2 = viewport center, 3 = element edge. Lower wins ties.
    pub priority: u8,
}

/// An active alignment line, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapGuide {
    pub axis: GuideAxis,
    pub position: f64,
    /// Proximity strength in [0, 1].
    pub strength: f64,
}

/// Result of a magnetic snap.
#[derive(Debug, Clone, PartialEq)]
pub struct MagneticSnap {
    /// Snapped top-left corner.
    pub position: Point,
    /// Displacement from the requested position, clamping included.
    pub offset: Vec2,
    pub guides: Vec<SnapGuide>,
    /// Mean strength of the per-edge matches, 0 when nothing matched.
    pub strength: f64,
}

impl MagneticSnap {
    pub fn none(position: Point) -> Self {
        Self {
            position,
            offset: Vec2::ZERO,
            guides: Vec::new(),
            strength: 0.0,
        }
    }

    pub fn is_snapped(&self) -> bool {
        !self.guides.is_empty()
    }
}

/// Parameters for one snap evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapSettings {
    pub threshold: f64,
    pub lock_fraction: f64,
    /// Area the element's top-left is kept within, if any.
    pub clamp_to: Option<Rect>,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            threshold: SNAP_THRESHOLD,
            lock_fraction: SNAP_LOCK_FRACTION,
            clamp_to: None,
        }
    }
}

/// Gather alignment candidates from the visible area and every element not in `exclude`.
pub fn collect_candidates(
    visible: Rect,
    nodes: &[Node],
    borders: &[Border],
    exclude: &HashSet<ElementId>,
) -> Vec<SnapCandidate> {
    let viewport_x = [visible.x0, visible.x1];
    let viewport_y = [visible.y0, visible.y1];
    let center = visible.center();

    let mut candidates = Vec::new();
    for x in viewport_x {
        candidates.push(SnapCandidate { axis: GuideAxis::Vertical, position: x, priority: 1 });
    }
    for y in viewport_y {
        candidates.push(SnapCandidate { axis: GuideAxis::Horizontal, position: y, priority: 1 });
    }
    candidates.push(SnapCandidate { axis: GuideAxis::Vertical, position: center.x, priority: 2 });
    candidates.push(SnapCandidate { axis: GuideAxis::Horizontal, position: center.y, priority: 2 });

    let is_viewport_line = |axis: GuideAxis, value: f64| {
        let (edges, mid) = match axis {
            GuideAxis::Vertical => (viewport_x, center.x),
            GuideAxis::Horizontal => (viewport_y, center.y),
        };
        edges.iter().chain(std::iter::once(&mid)).any(|v| (v - value).abs() < 1e-9)
    };

    let element_bounds = nodes
        .iter()
        .filter(|n| !exclude.contains(&n.id))
        .map(Node::bounds)
        .chain(borders.iter().filter(|b| !exclude.contains(&b.id)).map(Border::bounds));

    for bounds in element_bounds {
        let c = bounds.center();
        for x in [bounds.x0, c.x, bounds.x1] {
            if !is_viewport_line(GuideAxis::Vertical, x) {
                candidates.push(SnapCandidate { axis: GuideAxis::Vertical, position: x, priority: 3 });
            }
        }
        for y in [bounds.y0, c.y, bounds.y1] {
            if !is_viewport_line(GuideAxis::Horizontal, y) {
                candidates.push(SnapCandidate { axis: GuideAxis::Horizontal, position: y, priority: 3 });
            }
        }
    }
    candidates
}

/// Normalized proximity `max(0, 1 - distance / threshold)`.
pub fn snap_strength(distance: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / threshold).max(0.0)
}

/// Fraction of the gap to close: cubic in strength, full inside the lock radius.
pub fn eased_factor(distance: f64, settings: &SnapSettings) -> f64 {
    if distance <= settings.threshold * settings.lock_fraction {
        return 1.0;
    }
    snap_strength(distance, settings.threshold).powi(3)
}

#[derive(Debug, Clone, Copy)]
struct EdgeMatch {
    axis: GuideAxis,
    edge: f64,
    target: f64,
    distance: f64,
    priority: u8,
}

fn best_match(
    axis: GuideAxis,
    edge: f64,
    candidates: &[SnapCandidate],
    threshold: f64,
) -> Option<EdgeMatch> {
    candidates
        .iter()
        .filter(|c| c.axis == axis)
        .map(|c| EdgeMatch {
            axis,
            edge,
            target: c.position,
            distance: (c.position - edge).abs(),
            priority: c.priority,
        })
        .filter(|m| m.distance < threshold)
        .min_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.priority.cmp(&b.priority))
        })
}

/// Snap an element's bounds against the candidate lines.
pub fn magnetic_snap(
    bounds: Rect,
    candidates: &[SnapCandidate],
    settings: &SnapSettings,
) -> MagneticSnap {
    let center = bounds.center();
    let references = [
        (GuideAxis::Vertical, bounds.x0),
        (GuideAxis::Vertical, center.x),
        (GuideAxis::Vertical, bounds.x1),
        (GuideAxis::Horizontal, bounds.y0),
        (GuideAxis::Horizontal, center.y),
        (GuideAxis::Horizontal, bounds.y1),
    ];

    let mut matches: Vec<EdgeMatch> = references
        .iter()
        .filter_map(|&(axis, edge)| best_match(axis, edge, candidates, settings.threshold))
        .collect();
    matches.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.priority.cmp(&b.priority))
    });

    let mut offset = Vec2::ZERO;
    let mut guides = Vec::new();
    let mut claimed_x = false;
    let mut claimed_y = false;
    for m in &matches {
        let claimed = match m.axis {
            GuideAxis::Vertical => &mut claimed_x,
            GuideAxis::Horizontal => &mut claimed_y,
        };
        if *claimed {
            continue;
        }
        *claimed = true;
        let shift = (m.target - m.edge) * eased_factor(m.distance, settings);
        match m.axis {
            GuideAxis::Vertical => offset.x = shift,
            GuideAxis::Horizontal => offset.y = shift,
        }
        guides.push(SnapGuide {
            axis: m.axis,
            position: m.target,
            strength: snap_strength(m.distance, settings.threshold),
        });
    }

    let strength = if matches.is_empty() {
        0.0
    } else {
        matches
            .iter()
            .map(|m| snap_strength(m.distance, settings.threshold))
            .sum::<f64>()
            / matches.len() as f64
    };

    let origin = bounds.origin();
    let mut position = origin + offset;
    if let Some(area) = settings.clamp_to {
        position = clamp_origin(position, bounds.size().to_vec2(), area);
    }

    MagneticSnap {
        position,
        offset: position - origin,
        guides,
        strength,
    }
}

/// Keep a box of `extent` with top-left `origin` inside `area` where it fits.
fn clamp_origin(origin: Point, extent: Vec2, area: Rect) -> Point {
    let clamp_axis = |value: f64, min: f64, max: f64| {
        if max < min { min } else { value.clamp(min, max) }
    };
    Point::new(
        clamp_axis(origin.x, area.x0, area.x1 - extent.x),
        clamp_axis(origin.y, area.y0, area.y1 - extent.y),
    )
}
