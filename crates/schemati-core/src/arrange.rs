//! Bulk transforms over the selection: align, distribute and z-order.
//!
//! Every operation returns a new collection and leaves its input untouched.

use crate::model::{ElementId, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Shared edge or center to align selected nodes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignDirection {
    Left,
    Right,
    Top,
    Bottom,
    /// Same center x for every node.
    CenterHorizontal,
    /// Same center y for every node.
    CenterVertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DistributeDirection {
    Horizontal,
    Vertical,
}

/// Draw-order change for the selected elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZOrderAction {
    /// Drawn last, on top of everything.
    Front,
    /// Drawn first, below everything.
    Back,
    /// One step towards the front.
    Forward,
    /// One step towards the back.
    Backward,
}

/// Minimum selected nodes for alignment.
pub const MIN_ALIGN_COUNT: usize = 2;

/// Minimum selected nodes for distribution.
pub const MIN_DISTRIBUTE_COUNT: usize = 3;

/// Align the selected nodes. `None` when fewer than two are selected.
pub fn align_nodes(
    nodes: &[Node],
    selected: &HashSet<ElementId>,
    direction: AlignDirection,
) -> Option<Vec<Node>> {
    let chosen: Vec<&Node> = nodes.iter().filter(|n| selected.contains(&n.id)).collect();
    if chosen.len() < MIN_ALIGN_COUNT {
        return None;
    }
    let count = chosen.len() as f64;
    let min_of = |f: fn(&Node) -> f64| chosen.iter().map(|n| f(n)).fold(f64::INFINITY, f64::min);
    let max_of = |f: fn(&Node) -> f64| chosen.iter().map(|n| f(n)).fold(f64::NEG_INFINITY, f64::max);
    let mean_of = |f: fn(&Node) -> f64| chosen.iter().map(|n| f(n)).sum::<f64>() / count;

    let reference = match direction {
        AlignDirection::Left => min_of(|n| n.x),
        AlignDirection::Right => max_of(|n| n.x + n.width),
        AlignDirection::Top => min_of(|n| n.y),
        AlignDirection::Bottom => max_of(|n| n.y + n.height),
        AlignDirection::CenterHorizontal => mean_of(|n| n.x + n.width / 2.0),
        AlignDirection::CenterVertical => mean_of(|n| n.y + n.height / 2.0),
    };

    Some(
        nodes
            .iter()
            .map(|n| {
                if !selected.contains(&n.id) {
                    return n.clone();
                }
                let mut moved = n.clone();
                match direction {
                    AlignDirection::Left => moved.x = reference,
                    AlignDirection::Right => moved.x = reference - n.width,
                    AlignDirection::Top => moved.y = reference,
                    AlignDirection::Bottom => moved.y = reference - n.height,
                    AlignDirection::CenterHorizontal => moved.x = reference - n.width / 2.0,
                    AlignDirection::CenterVertical => moved.y = reference - n.height / 2.0,
                }
                moved
            })
            .collect(),
    )
}

/// Space the selected nodes evenly. `None` when fewer than three are selected.
///
/// The outermost nodes stay put; interior nodes are laid out so the gaps
/// between consecutive bounding boxes are equal.
pub fn distribute_nodes(
    nodes: &[Node],
    selected: &HashSet<ElementId>,
    direction: DistributeDirection,
) -> Option<Vec<Node>> {
    let axis = |n: &Node| match direction {
        DistributeDirection::Horizontal => (n.x, n.width),
        DistributeDirection::Vertical => (n.y, n.height),
    };

    let mut chosen: Vec<&Node> = nodes.iter().filter(|n| selected.contains(&n.id)).collect();
    if chosen.len() < MIN_DISTRIBUTE_COUNT {
        return None;
    }
    chosen.sort_by(|a, b| axis(a).0.total_cmp(&axis(b).0));

    let (first_start, first_extent) = axis(chosen[0]);
    let (last_start, last_extent) = axis(chosen[chosen.len() - 1]);
    let span = last_start + last_extent - first_start;
    let total_extent: f64 = chosen.iter().map(|n| axis(n).1).sum();
    let gap = (span - total_extent) / (chosen.len() - 1) as f64;

    let mut placed: Vec<(ElementId, f64)> = Vec::with_capacity(chosen.len() - 2);
    let mut cursor = first_start + first_extent + gap;
    for node in &chosen[1..chosen.len() - 1] {
        placed.push((node.id.clone(), cursor));
        cursor += axis(node).1 + gap;
    }

    Some(
        nodes
            .iter()
            .map(|n| match placed.iter().find(|(id, _)| id == &n.id) {
                Some((_, start)) => {
                    let mut moved = n.clone();
                    match direction {
                        DistributeDirection::Horizontal => moved.x = *start,
                        DistributeDirection::Vertical => moved.y = *start,
                    }
                    moved
                }
                None => n.clone(),
            })
            .collect(),
    )
}

/// Reorder a draw-order list for the elements matched by `is_selected`.
pub fn reorder<T: Clone>(
    items: &[T],
    is_selected: impl Fn(&T) -> bool,
    action: ZOrderAction,
) -> Vec<T> {
    match action {
        ZOrderAction::Front | ZOrderAction::Back => {
            let (chosen, rest): (Vec<T>, Vec<T>) =
                items.iter().cloned().partition(|item| is_selected(item));
            if action == ZOrderAction::Front {
                rest.into_iter().chain(chosen).collect()
            } else {
                chosen.into_iter().chain(rest).collect()
            }
        }
        ZOrderAction::Forward => {
            let mut out = items.to_vec();
            for i in (0..out.len().saturating_sub(1)).rev() {
                if is_selected(&out[i]) && !is_selected(&out[i + 1]) {
                    out.swap(i, i + 1);
                }
            }
            out
        }
        ZOrderAction::Backward => {
            let mut out = items.to_vec();
            for i in 1..out.len() {
                if is_selected(&out[i]) && !is_selected(&out[i - 1]) {
                    out.swap(i, i - 1);
                }
            }
            out
        }
    }
}
