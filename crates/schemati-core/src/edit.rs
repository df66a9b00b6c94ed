//! Single-element edits that produce replacement collections.
//!
//! Each function validates its input, copies the collection and changes one
//! element. The caller commits the result through a
//! [`ChangeSink`](crate::diagram::ChangeSink).

use crate::config::StyleDefaults;
use crate::geometry::ShapeKind;
use crate::layout::{Layout, auto_position};
use crate::model::{
    Border, BorderStyle, Connection, ConnectionStyle, ElementId, ModelError, ModelResult, Node,
    NodeSizePreset, NodeStyle,
};
use kurbo::{Point, Rect};

fn update<T: Clone>(
    items: &[T],
    id: &ElementId,
    id_of: impl Fn(&T) -> &ElementId,
    edit: impl FnOnce(&mut T) -> ModelResult<()>,
) -> ModelResult<Vec<T>> {
    let index = items
        .iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| ModelError::NotFound(id.clone()))?;
    let mut out = items.to_vec();
    edit(&mut out[index])?;
    Ok(out)
}

pub fn relabel(nodes: &[Node], id: &ElementId, label: impl Into<String>) -> ModelResult<Vec<Node>> {
    let label = label.into();
    update(nodes, id, |n| &n.id, |n| {
        n.label = label;
        Ok(())
    })
}

/// Merge `patch` into a node's style; unset fields keep their value.
pub fn restyle_node(nodes: &[Node], id: &ElementId, patch: &NodeStyle) -> ModelResult<Vec<Node>> {
    update(nodes, id, |n| &n.id, |n| {
        n.style.merge(patch);
        Ok(())
    })
}

pub fn restyle_connection(
    connections: &[Connection],
    id: &ElementId,
    patch: &ConnectionStyle,
) -> ModelResult<Vec<Connection>> {
    update(connections, id, |c| &c.id, |c| {
        c.stroke.merge(patch);
        Ok(())
    })
}

pub fn restyle_border(
    borders: &[Border],
    id: &ElementId,
    patch: &BorderStyle,
) -> ModelResult<Vec<Border>> {
    update(borders, id, |b| &b.id, |b| {
        b.style.merge(patch);
        Ok(())
    })
}

pub fn change_shape(nodes: &[Node], id: &ElementId, shape: ShapeKind) -> ModelResult<Vec<Node>> {
    update(nodes, id, |n| &n.id, |n| {
        n.shape = shape;
        Ok(())
    })
}

/// Resize a node keeping its top-left corner.
pub fn resize_node(
    nodes: &[Node],
    id: &ElementId,
    width: f64,
    height: f64,
) -> ModelResult<Vec<Node>> {
    update(nodes, id, |n| &n.id, |n| n.resize(width, height))
}

pub fn move_node(nodes: &[Node], id: &ElementId, to: Point) -> ModelResult<Vec<Node>> {
    update(nodes, id, |n| &n.id, |n| n.set_position(to.x, to.y))
}

/// Where a programmatically created node goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Explicit top-left corner.
    At(Point),
    /// Next free spot for the given layout.
    Auto(Layout),
}

/// Build a node of a preset size without appending it.
pub fn new_node(
    existing: &[Node],
    shape: ShapeKind,
    size: NodeSizePreset,
    placement: Placement,
    label: impl Into<String>,
    style: NodeStyle,
) -> ModelResult<Node> {
    let origin = match placement {
        Placement::At(point) => point,
        Placement::Auto(layout) => auto_position(existing, layout),
    };
    Ok(Node::new(shape, Rect::from_origin_size(origin, size.size()), label)?.with_style(style))
}

/// Build a node from the panel's current shape, size and style.
pub fn new_default_node(
    existing: &[Node],
    defaults: &StyleDefaults,
    placement: Placement,
    label: impl Into<String>,
) -> ModelResult<Node> {
    new_node(
        existing,
        defaults.node_shape,
        defaults.node_size,
        placement,
        label,
        defaults.node.clone(),
    )
}
