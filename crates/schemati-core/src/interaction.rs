//! Pointer and keyboard state machine for the editor surface.
//!
//! The [`Editor`] never owns the diagram. Each handler receives the current
//! collections by reference and publishes replacements through a
//! [`ChangeSink`].

use crate::arrange::{
    AlignDirection, DistributeDirection, ZOrderAction, align_nodes, distribute_nodes, reorder,
};
use crate::config::{EditorConfig, StyleDefaults};
use crate::diagram::{ChangeSink, Diagram};
use crate::geometry::ShapeKind;
use crate::input::{Key, KeyEvent, MouseButton, PointerEvent};
use crate::model::{
    Border, Connection, CssColor, ElementId, ElementKind, ElementRef, Node, NodeStyle,
};
use crate::selection::{
    Corner, HANDLE_HIT_TOLERANCE, MoveState, Selection, hit_test_handles, marquee_selection,
    resized_bounds,
};
use crate::snap::{SnapGuide, SnapSettings, collect_candidates, magnetic_snap, snap_point_to_grid};
use crate::tools::Tool;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};
use log::{debug, warn};

/// The gesture in progress. Points are logical unless noted.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Dragging out a node with the node or text tool.
    DraggingNode {
        start: Point,
        current: Point,
        shape: ShapeKind,
        tool: Tool,
    },
    DraggingBorder { start: Point, current: Point },
    /// First endpoint chosen, waiting for the second click.
    DraggingConnection { from: ElementId, pointer: Point },
    Marqueeing { start: Point, current: Point },
    Moving(MoveState),
    Resizing {
        node: ElementId,
        corner: Corner,
        original: Rect,
    },
    /// Last pointer position in screen pixels.
    Panning { last: Point },
}

/// Transient shape drawn while a creation gesture is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Node { bounds: Rect, shape: ShapeKind },
    Border { bounds: Rect },
    /// From the start node's center to the pointer.
    Connection { from: Point, to: Point },
}

/// Interactive editing state: viewport, selection, tool and gesture.
#[derive(Debug, Clone)]
pub struct Editor {
    pub viewport: Viewport,
    pub selection: Selection,
    pub config: EditorConfig,
    pub defaults: StyleDefaults,
    tool: Tool,
    gesture: Gesture,
    guides: Vec<SnapGuide>,
    snap_strength: f64,
    hovered: Option<ElementRef>,
    clipboard: Vec<Node>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default(), StyleDefaults::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig, defaults: StyleDefaults) -> Self {
        Self {
            viewport: Viewport::default(),
            selection: Selection::new(),
            config,
            defaults,
            tool: Tool::default(),
            gesture: Gesture::Idle,
            guides: Vec::new(),
            snap_strength: 0.0,
            hovered: None,
            clipboard: Vec::new(),
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools, abandoning any creation gesture.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            debug!("tool {:?} -> {:?}", self.tool, tool);
            self.tool = tool;
            if !matches!(self.gesture, Gesture::Moving(_) | Gesture::Resizing { .. }) {
                self.gesture = Gesture::Idle;
            }
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Active snap guides of the current drag.
    pub fn guides(&self) -> &[SnapGuide] {
        &self.guides
    }

    pub fn snap_strength(&self) -> f64 {
        self.snap_strength
    }

    pub fn hovered(&self) -> Option<&ElementRef> {
        self.hovered.as_ref()
    }

    pub fn marquee(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Marqueeing { start, current } => Some(Rect::from_points(start, current)),
            _ => None,
        }
    }

    /// Preview for the creation gesture in progress.
    pub fn preview(&self, diagram: &Diagram) -> Option<Preview> {
        match &self.gesture {
            Gesture::DraggingNode {
                start,
                current,
                shape,
                ..
            } => Some(Preview::Node {
                bounds: Rect::from_points(*start, *current),
                shape: *shape,
            }),
            Gesture::DraggingBorder { start, current } => Some(Preview::Border {
                bounds: Rect::from_points(*start, *current),
            }),
            Gesture::DraggingConnection { from, pointer } => diagram.node(from).map(|n| {
                Preview::Connection {
                    from: n.center(),
                    to: *pointer,
                }
            }),
            _ => None,
        }
    }

    /// Feed one pointer event. Returns true when a redraw is needed.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> bool {
        let gesture = std::mem::take(&mut self.gesture);
        let (next, changed) = match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.on_down(gesture, position, button, modifiers.shift, diagram, sink),
            PointerEvent::Move { position } => self.on_move(gesture, position, diagram, sink),
            PointerEvent::Up { position, .. } => self.on_up(gesture, position, diagram, sink),
            PointerEvent::Leave => (Gesture::Idle, self.cancel(gesture, diagram, sink)),
            PointerEvent::Wheel { position, delta } => {
                self.viewport.wheel_zoom(position, delta.y);
                (gesture, true)
            }
        };
        self.gesture = next;
        changed
    }

    fn logical(&self, screen: Point) -> Point {
        self.viewport.to_logical(screen)
    }

    fn creation_point(&self, screen: Point) -> Point {
        let point = self.logical(screen);
        if self.config.grid_enabled {
            snap_point_to_grid(point, self.config.grid_size)
        } else {
            point
        }
    }

    fn on_down(
        &mut self,
        gesture: Gesture,
        position: Point,
        button: MouseButton,
        shift: bool,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> (Gesture, bool) {
        if button == MouseButton::Middle || (button == MouseButton::Left && self.tool == Tool::Pan)
        {
            return (Gesture::Panning { last: position }, false);
        }
        if button != MouseButton::Left {
            return (gesture, false);
        }

        let point = self.logical(position);
        if let Gesture::DraggingConnection { from, .. } = gesture {
            return (Gesture::Idle, self.finish_connection(from, point, diagram, sink));
        }

        match self.tool {
            Tool::Select => self.begin_select(point, shift, diagram),
            Tool::Node | Tool::Text => {
                let start = self.creation_point(position);
                let shape = self
                    .tool
                    .node_template(self.defaults.node_shape)
                    .map_or(self.defaults.node_shape, |(shape, _)| shape);
                (
                    Gesture::DraggingNode {
                        start,
                        current: start,
                        shape,
                        tool: self.tool,
                    },
                    true,
                )
            }
            Tool::Border => {
                let start = self.creation_point(position);
                (Gesture::DraggingBorder { start, current: start }, true)
            }
            Tool::Connection => match diagram.node_at(point) {
                Some(node) => {
                    debug!("connection from {}", node.id);
                    (
                        Gesture::DraggingConnection {
                            from: node.id.clone(),
                            pointer: point,
                        },
                        true,
                    )
                }
                None => (Gesture::Idle, false),
            },
            Tool::Delete => {
                let hit = diagram.element_at(
                    point,
                    self.config.connection_hit_threshold,
                    self.config.border_hit_threshold,
                );
                match hit {
                    Some(element) => {
                        self.delete_elements(&[element], diagram, sink);
                        (Gesture::Idle, true)
                    }
                    None => (Gesture::Idle, false),
                }
            }
            Tool::Pan => (Gesture::Panning { last: position }, false),
        }
    }

    fn begin_select(&mut self, point: Point, shift: bool, diagram: &Diagram) -> (Gesture, bool) {
        if !shift {
            if let Some(gesture) = self.begin_resize(point, diagram) {
                return (gesture, true);
            }
        }

        let hit = diagram.element_at(
            point,
            self.config.connection_hit_threshold,
            self.config.border_hit_threshold,
        );
        let Some(element) = hit else {
            if !shift {
                self.selection.clear();
            }
            return (
                Gesture::Marqueeing {
                    start: point,
                    current: point,
                },
                true,
            );
        };

        if shift {
            self.selection.toggle(element.clone());
        } else if !self.selection.contains(&element) {
            self.selection.select_only(element.clone());
        }

        let movable = element.kind != ElementKind::Connection && self.selection.contains(&element);
        if !movable {
            return (Gesture::Idle, true);
        }

        let nodes = self.selection.id_set(ElementKind::Node);
        let borders = self.selection.id_set(ElementKind::Border);
        let state = MoveState::new(
            element,
            point,
            diagram
                .nodes
                .iter()
                .filter(|n| nodes.contains(&n.id))
                .cloned()
                .collect(),
            diagram
                .borders
                .iter()
                .filter(|b| borders.contains(&b.id))
                .cloned()
                .collect(),
        );
        debug!(
            "move start: {} nodes, {} borders",
            state.original_nodes.len(),
            state.original_borders.len()
        );
        (Gesture::Moving(state), true)
    }

    fn begin_resize(&self, point: Point, diagram: &Diagram) -> Option<Gesture> {
        if self.selection.len() != 1 {
            return None;
        }
        let primary = self.selection.primary()?;
        if primary.kind != ElementKind::Node {
            return None;
        }
        let node = diagram.node(&primary.id)?;
        let tolerance = HANDLE_HIT_TOLERANCE / self.viewport.zoom;
        let corner = hit_test_handles(node, point, tolerance)?;
        Some(Gesture::Resizing {
            node: node.id.clone(),
            corner,
            original: node.bounds(),
        })
    }

    fn on_move(
        &mut self,
        gesture: Gesture,
        position: Point,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> (Gesture, bool) {
        match gesture {
            Gesture::Idle => {
                let hovered = diagram.element_at(
                    self.logical(position),
                    self.config.connection_hit_threshold,
                    self.config.border_hit_threshold,
                );
                let changed = hovered != self.hovered;
                self.hovered = hovered;
                (Gesture::Idle, changed)
            }
            Gesture::DraggingNode {
                start, shape, tool, ..
            } => (
                Gesture::DraggingNode {
                    start,
                    current: self.creation_point(position),
                    shape,
                    tool,
                },
                true,
            ),
            Gesture::DraggingBorder { start, .. } => (
                Gesture::DraggingBorder {
                    start,
                    current: self.creation_point(position),
                },
                true,
            ),
            Gesture::DraggingConnection { from, .. } => (
                Gesture::DraggingConnection {
                    from,
                    pointer: self.logical(position),
                },
                true,
            ),
            Gesture::Marqueeing { start, .. } => {
                let current = self.logical(position);
                self.selection
                    .set(marquee_selection(diagram, Rect::from_points(start, current)));
                (Gesture::Marqueeing { start, current }, true)
            }
            Gesture::Moving(mut state) => {
                state.current_point = self.logical(position);
                let delta = self.snapped_delta(&state, diagram);
                let (nodes, borders) = state.translated(diagram, delta);
                if !state.original_nodes.is_empty() {
                    sink.commit_nodes(nodes);
                }
                if !state.original_borders.is_empty() {
                    sink.commit_borders(borders);
                }
                (Gesture::Moving(state), true)
            }
            Gesture::Resizing {
                node,
                corner,
                original,
            } => {
                let bounds = resized_bounds(
                    original,
                    corner,
                    self.logical(position),
                    self.config.min_node_size,
                );
                sink.commit_nodes(with_bounds(&diagram.nodes, &node, bounds));
                (
                    Gesture::Resizing {
                        node,
                        corner,
                        original,
                    },
                    true,
                )
            }
            Gesture::Panning { last } => {
                self.viewport.pan_by(position - last);
                (Gesture::Panning { last: position }, true)
            }
        }
    }

    /// Drag delta after grid and magnetic snapping of the primary element.
    fn snapped_delta(&mut self, state: &MoveState, diagram: &Diagram) -> Vec2 {
        let raw = state.delta();
        let Some(primary) = state.primary_bounds() else {
            return raw;
        };
        let origin = primary.origin();
        let mut target = origin + raw;
        if self.config.grid_enabled {
            target = snap_point_to_grid(target, self.config.grid_size);
        }

        let visible = self.viewport.visible_rect();
        let candidates = if self.config.magnetic_snap {
            collect_candidates(visible, &diagram.nodes, &diagram.borders, &state.moving_ids())
        } else {
            Vec::new()
        };
        let settings = SnapSettings {
            threshold: self.config.snap_threshold,
            lock_fraction: self.config.snap_lock_fraction,
            clamp_to: self.config.clamp_to_viewport.then_some(visible),
        };
        let snap = magnetic_snap(primary + (target - origin), &candidates, &settings);
        self.snap_strength = snap.strength;
        self.guides = snap.guides;
        snap.position - origin
    }

    fn on_up(
        &mut self,
        gesture: Gesture,
        position: Point,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> (Gesture, bool) {
        match gesture {
            Gesture::DraggingNode {
                start, shape, tool, ..
            } => {
                let bounds = Rect::from_points(start, self.creation_point(position));
                self.commit_new_node(bounds, shape, tool, diagram, sink);
                (Gesture::Idle, true)
            }
            Gesture::DraggingBorder { start, .. } => {
                let bounds = Rect::from_points(start, self.creation_point(position));
                self.commit_new_border(bounds, diagram, sink);
                (Gesture::Idle, true)
            }
            // Connections complete on the second press, not on release.
            Gesture::DraggingConnection { from, pointer } => {
                (Gesture::DraggingConnection { from, pointer }, false)
            }
            Gesture::Marqueeing { start, .. } => {
                let marquee = Rect::from_points(start, self.logical(position));
                self.selection.set(marquee_selection(diagram, marquee));
                debug!("marquee selected {}", self.selection.len());
                (Gesture::Idle, true)
            }
            Gesture::Moving(_) => {
                self.guides.clear();
                self.snap_strength = 0.0;
                (Gesture::Idle, true)
            }
            Gesture::Resizing { .. } | Gesture::Panning { .. } => (Gesture::Idle, true),
            Gesture::Idle => (Gesture::Idle, false),
        }
    }

    /// Abort `gesture`, restoring anything it already committed.
    fn cancel(&mut self, gesture: Gesture, diagram: &Diagram, sink: &mut impl ChangeSink) -> bool {
        self.guides.clear();
        self.snap_strength = 0.0;
        match gesture {
            Gesture::Idle => false,
            Gesture::Moving(state) => {
                debug!("move cancelled, restoring originals");
                let (nodes, borders) = state.translated(diagram, Vec2::ZERO);
                if !state.original_nodes.is_empty() {
                    sink.commit_nodes(nodes);
                }
                if !state.original_borders.is_empty() {
                    sink.commit_borders(borders);
                }
                true
            }
            Gesture::Resizing { node, original, .. } => {
                sink.commit_nodes(with_bounds(&diagram.nodes, &node, original));
                true
            }
            _ => true,
        }
    }

    fn commit_new_node(
        &mut self,
        bounds: Rect,
        shape: ShapeKind,
        tool: Tool,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) {
        let min = self.config.min_node_size;
        if bounds.width() <= min || bounds.height() <= min {
            debug!("node preview discarded: {}x{}", bounds.width(), bounds.height());
            return;
        }
        let label = tool
            .node_template(shape)
            .map_or("New Node", |(_, label)| label);
        let style = if tool == Tool::Text {
            text_style(&self.defaults.node)
        } else {
            self.defaults.node.clone()
        };
        match Node::new(shape, bounds, label) {
            Ok(node) => {
                let node = node.with_style(style);
                debug!("created node {}", node.id);
                self.selection.select_only(ElementRef::node(node.id.clone()));
                let mut nodes = diagram.nodes.clone();
                nodes.push(node);
                sink.commit_nodes(nodes);
            }
            Err(err) => warn!("node not created: {err}"),
        }
    }

    fn commit_new_border(&mut self, bounds: Rect, diagram: &Diagram, sink: &mut impl ChangeSink) {
        let min = self.config.min_border_size;
        if bounds.width() <= min || bounds.height() <= min {
            debug!("border preview discarded: {}x{}", bounds.width(), bounds.height());
            return;
        }
        match Border::new(bounds) {
            Ok(border) => {
                let border = border.with_style(self.defaults.border.clone());
                debug!("created border {}", border.id);
                let mut borders = diagram.borders.clone();
                borders.push(border);
                sink.commit_borders(borders);
            }
            Err(err) => warn!("border not created: {err}"),
        }
    }

    fn finish_connection(
        &mut self,
        from: ElementId,
        point: Point,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> bool {
        let Some(target) = diagram.node_at(point) else {
            debug!("connection cancelled: no target");
            return true;
        };
        if target.id == from || diagram.node(&from).is_none() {
            debug!("connection cancelled: invalid target");
            return true;
        }
        match Connection::new(from, target.id.clone(), self.defaults.connection_routing) {
            Ok(connection) => {
                let connection = connection.with_stroke(self.defaults.connection.clone());
                debug!("created connection {}", connection.id);
                let mut connections = diagram.connections.clone();
                connections.push(connection);
                sink.commit_connections(connections);
            }
            Err(err) => warn!("connection not created: {err}"),
        }
        true
    }

    /// Remove `elements`, cascading node deletion to incident connections.
    fn delete_elements(
        &mut self,
        elements: &[ElementRef],
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) {
        let next = diagram.without(elements);
        debug!(
            "deleted {} nodes, {} connections, {} borders",
            diagram.nodes.len() - next.nodes.len(),
            diagram.connections.len() - next.connections.len(),
            diagram.borders.len() - next.borders.len()
        );
        self.selection.retain_existing(&next);
        if self.hovered.as_ref().is_some_and(|h| !next.contains(h)) {
            self.hovered = None;
        }
        if next.nodes.len() != diagram.nodes.len() {
            sink.commit_nodes(next.nodes);
        }
        if next.connections.len() != diagram.connections.len() {
            sink.commit_connections(next.connections);
        }
        if next.borders.len() != diagram.borders.len() {
            sink.commit_borders(next.borders);
        }
    }

    /// Feed one key press. Returns true when something changed.
    pub fn handle_key(
        &mut self,
        event: &KeyEvent,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> bool {
        match event.key {
            Key::Delete | Key::Backspace => {
                if self.selection.is_empty() {
                    return false;
                }
                let selected = self.selection.items().to_vec();
                self.delete_elements(&selected, diagram, sink);
                self.selection.clear();
                true
            }
            Key::Escape => {
                let gesture = std::mem::take(&mut self.gesture);
                let cancelled = self.cancel(gesture, diagram, sink);
                let had_selection = !self.selection.is_empty();
                self.selection.clear();
                cancelled || had_selection
            }
            Key::Character(_) => match event.command_char() {
                Some('a') => {
                    self.selection
                        .set(diagram.nodes.iter().map(|n| ElementRef::node(n.id.clone())));
                    true
                }
                Some('c') => {
                    self.clipboard = self.selected_nodes(diagram);
                    debug!("copied {} nodes", self.clipboard.len());
                    false
                }
                Some('v') => {
                    let copies = self.paste(self.clipboard.clone(), diagram, sink);
                    if copies.is_empty() {
                        return false;
                    }
                    self.clipboard = copies;
                    true
                }
                Some('d') => {
                    let selected = self.selected_nodes(diagram);
                    !self.paste(selected, diagram, sink).is_empty()
                }
                _ => false,
            },
        }
    }

    fn selected_nodes(&self, diagram: &Diagram) -> Vec<Node> {
        let ids = self.selection.id_set(ElementKind::Node);
        diagram
            .nodes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .cloned()
            .collect()
    }

    /// Insert offset copies of `nodes` with fresh ids and select them.
    fn paste(&mut self, nodes: Vec<Node>, diagram: &Diagram, sink: &mut impl ChangeSink) -> Vec<Node> {
        if nodes.is_empty() {
            return nodes;
        }
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        let copies: Vec<Node> = nodes
            .iter()
            .map(|n| {
                n.translated(offset)
                    .with_id(ElementId::generate(ElementKind::Node))
            })
            .collect();
        self.selection
            .set(copies.iter().map(|n| ElementRef::node(n.id.clone())));
        let mut all = diagram.nodes.clone();
        all.extend(copies.iter().cloned());
        sink.commit_nodes(all);
        debug!("pasted {} nodes", copies.len());
        copies
    }

    /// Align the selected nodes. False when fewer than two are selected.
    pub fn align_selected(
        &self,
        direction: AlignDirection,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> bool {
        let selected = self.selection.id_set(ElementKind::Node);
        match align_nodes(&diagram.nodes, &selected, direction) {
            Some(nodes) => {
                sink.commit_nodes(nodes);
                true
            }
            None => {
                debug!("align {direction:?} skipped: {} nodes selected", selected.len());
                false
            }
        }
    }

    /// Distribute the selected nodes. False when fewer than three are selected.
    pub fn distribute_selected(
        &self,
        direction: DistributeDirection,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> bool {
        let selected = self.selection.id_set(ElementKind::Node);
        match distribute_nodes(&diagram.nodes, &selected, direction) {
            Some(nodes) => {
                sink.commit_nodes(nodes);
                true
            }
            None => {
                debug!("distribute {direction:?} skipped: {} nodes selected", selected.len());
                false
            }
        }
    }

    /// Reorder the selection within each element collection.
    pub fn change_z_order(
        &self,
        action: ZOrderAction,
        diagram: &Diagram,
        sink: &mut impl ChangeSink,
    ) -> bool {
        if self.selection.is_empty() {
            debug!("z-order {action:?} skipped: empty selection");
            return false;
        }
        let nodes = self.selection.id_set(ElementKind::Node);
        let connections = self.selection.id_set(ElementKind::Connection);
        let borders = self.selection.id_set(ElementKind::Border);
        if !nodes.is_empty() {
            sink.commit_nodes(reorder(&diagram.nodes, |n| nodes.contains(&n.id), action));
        }
        if !connections.is_empty() {
            sink.commit_connections(reorder(
                &diagram.connections,
                |c| connections.contains(&c.id),
                action,
            ));
        }
        if !borders.is_empty() {
            sink.commit_borders(reorder(&diagram.borders, |b| borders.contains(&b.id), action));
        }
        true
    }
}

/// Node style for text-tool nodes: no outline, no fill, no shadow.
fn text_style(base: &NodeStyle) -> NodeStyle {
    NodeStyle {
        color: Some(CssColor::transparent()),
        background_color: Some(CssColor::transparent()),
        border_color: Some(CssColor::transparent()),
        shadow_color: Some(CssColor::transparent()),
        ..base.clone()
    }
}

fn with_bounds(nodes: &[Node], id: &ElementId, bounds: Rect) -> Vec<Node> {
    nodes
        .iter()
        .map(|n| {
            if &n.id != id {
                return n.clone();
            }
            let mut resized = n.clone();
            resized.x = bounds.x0;
            resized.y = bounds.y0;
            resized.width = bounds.width();
            resized.height = bounds.height();
            resized
        })
        .collect()
}
