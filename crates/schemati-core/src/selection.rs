//! Selection set, marquee selection, resize handles and group-move state.

use crate::diagram::Diagram;
use crate::model::{Border, ElementId, ElementKind, ElementRef, Node};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Resize handle hit radius in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Ordered set of selected elements plus an optional primary element.
///
/// The primary element is the context-menu target; the whole set is used
/// for bulk operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    items: Vec<ElementRef>,
    primary: Option<ElementRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, element: &ElementRef) -> bool {
        self.items.contains(element)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementRef> {
        self.items.iter()
    }

    pub fn items(&self) -> &[ElementRef] {
        &self.items
    }

    pub fn primary(&self) -> Option<&ElementRef> {
        self.primary.as_ref()
    }

    /// Ids of the selected elements of one kind, in selection order.
    pub fn ids(&self, kind: ElementKind) -> Vec<&ElementId> {
        self.items
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| &e.id)
            .collect()
    }

    pub fn id_set(&self, kind: ElementKind) -> HashSet<ElementId> {
        self.ids(kind).into_iter().cloned().collect()
    }

    /// Replace the selection with a single element.
    pub fn select_only(&mut self, element: ElementRef) {
        self.items = vec![element.clone()];
        self.primary = Some(element);
    }

    /// Add an element, making it primary.
    pub fn add(&mut self, element: ElementRef) {
        if !self.items.contains(&element) {
            self.items.push(element.clone());
        }
        self.primary = Some(element);
    }

    /// Toggle membership of an element.
    pub fn toggle(&mut self, element: ElementRef) {
        if self.contains(&element) {
            self.remove(&element);
        } else {
            self.add(element);
        }
    }

    pub fn remove(&mut self, element: &ElementRef) {
        self.items.retain(|e| e != element);
        if self.primary.as_ref() == Some(element) {
            self.primary = self.items.last().cloned();
        }
    }

    /// Replace the selection with `elements`; the first becomes primary.
    pub fn set(&mut self, elements: impl IntoIterator<Item = ElementRef>) {
        self.items.clear();
        for element in elements {
            if !self.items.contains(&element) {
                self.items.push(element);
            }
        }
        self.primary = self.items.first().cloned();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.primary = None;
    }

    /// Drop references to elements that no longer exist.
    pub fn retain_existing(&mut self, diagram: &Diagram) {
        self.items.retain(|e| diagram.contains(e));
        if self.primary.as_ref().is_some_and(|p| !diagram.contains(p)) {
            self.primary = self.items.first().cloned();
        }
    }
}

/// Elements selected by a marquee: every node whose bounds overlap it.
pub fn marquee_selection(diagram: &Diagram, marquee: Rect) -> Vec<ElementRef> {
    diagram
        .nodes_in_rect(marquee)
        .into_iter()
        .map(|n| ElementRef::node(n.id.clone()))
        .collect()
}

/// Node corners used as resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn position(self, bounds: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(bounds.x0, bounds.y0),
            Corner::TopRight => Point::new(bounds.x1, bounds.y0),
            Corner::BottomLeft => Point::new(bounds.x0, bounds.y1),
            Corner::BottomRight => Point::new(bounds.x1, bounds.y1),
        }
    }

    /// The corner that stays fixed while this one is dragged.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Resize handle under `point`, if any. `tolerance` is in logical units.
pub fn hit_test_handles(node: &Node, point: Point, tolerance: f64) -> Option<Corner> {
    let bounds = node.bounds();
    Corner::ALL
        .into_iter()
        .find(|c| c.position(bounds).distance(point) <= tolerance)
}

/// Bounds after dragging `corner` to `target`, keeping each side at least `min_size`.
pub fn resized_bounds(original: Rect, corner: Corner, target: Point, min_size: f64) -> Rect {
    let anchor = corner.opposite().position(original);
    let min_size = min_size.max(f64::EPSILON);
    let span = |from: f64, to: f64| {
        let d = to - from;
        if d.abs() < min_size { min_size.copysign(if d == 0.0 { 1.0 } else { d }) } else { d }
    };
    let dx = span(anchor.x, target.x);
    let dy = span(anchor.y, target.y);
    Rect::from_points(anchor, Point::new(anchor.x + dx, anchor.y + dy))
}

/// State for moving the selected nodes and borders together.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveState {
    /// Element whose bounds drive snapping.
    pub primary: ElementRef,
    /// Pointer position (logical) at drag start.
    pub start_point: Point,
    pub current_point: Point,
    /// Original nodes, for preview and cancellation.
    pub original_nodes: Vec<Node>,
    pub original_borders: Vec<Border>,
}

impl MoveState {
    pub fn new(
        primary: ElementRef,
        start_point: Point,
        original_nodes: Vec<Node>,
        original_borders: Vec<Border>,
    ) -> Self {
        Self {
            primary,
            start_point,
            current_point: start_point,
            original_nodes,
            original_borders,
        }
    }

    /// Raw pointer delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Original bounds of the primary element.
    pub fn primary_bounds(&self) -> Option<Rect> {
        match self.primary.kind {
            ElementKind::Node => self
                .original_nodes
                .iter()
                .find(|n| n.id == self.primary.id)
                .map(Node::bounds),
            ElementKind::Border => self
                .original_borders
                .iter()
                .find(|b| b.id == self.primary.id)
                .map(Border::bounds),
            ElementKind::Connection => None,
        }
    }

    /// Ids of every moving element.
    pub fn moving_ids(&self) -> HashSet<ElementId> {
        self.original_nodes
            .iter()
            .map(|n| n.id.clone())
            .chain(self.original_borders.iter().map(|b| b.id.clone()))
            .collect()
    }

    /// Apply one rigid translation to every moving element of `diagram`.
    pub fn translated(&self, diagram: &Diagram, delta: Vec2) -> (Vec<Node>, Vec<Border>) {
        let nodes = diagram
            .nodes
            .iter()
            .map(|n| match self.original_nodes.iter().find(|o| o.id == n.id) {
                Some(original) => original.translated(delta),
                None => n.clone(),
            })
            .collect();
        let borders = diagram
            .borders
            .iter()
            .map(|b| match self.original_borders.iter().find(|o| o.id == b.id) {
                Some(original) => original.translated(delta),
                None => b.clone(),
            })
            .collect();
        (nodes, borders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeKind;

    fn node(id: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
        Node::new(ShapeKind::Rectangle, Rect::new(x, y, x + w, y + h), id)
            .unwrap()
            .with_id(id)
    }

    #[test]
    fn test_marquee_overlap_not_containment() {
        let mut diagram = Diagram::new();
        diagram.add_node(node("inside", 50.0, 50.0, 100.0, 60.0)).unwrap();
        diagram.add_node(node("outside", 250.0, 250.0, 50.0, 50.0)).unwrap();
        diagram.add_node(node("partial", 180.0, 180.0, 100.0, 100.0)).unwrap();

        let marquee = Rect::from_points(Point::new(10.0, 10.0), Point::new(200.0, 200.0));
        let picked = marquee_selection(&diagram, marquee);
        assert_eq!(picked, vec![ElementRef::node("inside"), ElementRef::node("partial")]);
    }

    #[test]
    fn test_marquee_is_idempotent() {
        let mut diagram = Diagram::new();
        diagram.add_node(node("a", 50.0, 50.0, 100.0, 60.0)).unwrap();
        let marquee = Rect::new(10.0, 10.0, 200.0, 200.0);
        let mut selection = Selection::new();
        selection.set(marquee_selection(&diagram, marquee));
        let first = selection.clone();
        selection.set(marquee_selection(&diagram, marquee));
        assert_eq!(first, selection);
    }

    #[test]
    fn test_toggle_and_primary() {
        let mut selection = Selection::new();
        selection.add(ElementRef::node("a"));
        selection.add(ElementRef::border("b"));
        assert_eq!(selection.primary(), Some(&ElementRef::border("b")));
        selection.toggle(ElementRef::border("b"));
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.primary(), Some(&ElementRef::node("a")));
        selection.toggle(ElementRef::node("c"));
        assert_eq!(selection.ids(ElementKind::Node).len(), 2);
    }

    #[test]
    fn test_retain_existing_rebuilds_from_ids() {
        let mut diagram = Diagram::new();
        diagram.add_node(node("a", 0.0, 0.0, 10.0, 10.0)).unwrap();
        let mut selection = Selection::new();
        selection.set([ElementRef::node("gone"), ElementRef::node("a")]);
        selection.retain_existing(&diagram);
        assert_eq!(selection.items(), &[ElementRef::node("a")]);
        assert_eq!(selection.primary(), Some(&ElementRef::node("a")));
    }

    #[test]
    fn test_resize_from_corner_keeps_opposite_fixed() {
        let original = Rect::new(0.0, 0.0, 100.0, 50.0);
        let resized = resized_bounds(original, Corner::BottomRight, Point::new(150.0, 80.0), 20.0);
        assert_eq!(resized, Rect::new(0.0, 0.0, 150.0, 80.0));
        let tiny = resized_bounds(original, Corner::TopLeft, Point::new(95.0, 45.0), 20.0);
        assert_eq!(tiny, Rect::new(80.0, 30.0, 100.0, 50.0));
    }

    #[test]
    fn test_handle_hit() {
        let n = node("a", 0.0, 0.0, 100.0, 50.0);
        assert_eq!(hit_test_handles(&n, Point::new(98.0, 52.0), 8.0), Some(Corner::BottomRight));
        assert_eq!(hit_test_handles(&n, Point::new(50.0, 25.0), 8.0), None);
    }

    #[test]
    fn test_group_move_is_rigid() {
        let mut diagram = Diagram::new();
        diagram.add_node(node("a", 0.0, 0.0, 10.0, 10.0)).unwrap();
        diagram.add_node(node("b", 100.0, 0.0, 10.0, 10.0)).unwrap();
        diagram.add_node(node("c", 500.0, 0.0, 10.0, 10.0)).unwrap();
        let state = MoveState::new(
            ElementRef::node("a"),
            Point::ZERO,
            diagram.nodes[..2].to_vec(),
            Vec::new(),
        );
        let (nodes, _) = state.translated(&diagram, Vec2::new(5.0, 7.0));
        assert_eq!((nodes[0].x, nodes[0].y), (5.0, 7.0));
        assert_eq!((nodes[1].x, nodes[1].y), (105.0, 7.0));
        assert_eq!((nodes[2].x, nodes[2].y), (500.0, 0.0));
    }
}
