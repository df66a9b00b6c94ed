//! Diagram statistics and the reduced summary handed to the assistant.

use crate::diagram::Diagram;
use crate::geometry::ShapeKind;
use crate::model::{ElementId, RoutingStyle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsolatedNode {
    pub id: ElementId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramStatistics {
    pub node_count: usize,
    pub connection_count: usize,
    pub border_count: usize,
    /// Node count per shape name.
    pub node_shapes: BTreeMap<String, usize>,
    /// Connection count per routing style name.
    pub connection_styles: BTreeMap<String, usize>,
    pub isolated_node_count: usize,
    pub isolated_nodes: Vec<IsolatedNode>,
    pub connected_component_count: usize,
    /// Size of each connected component, in order of first appearance.
    pub connected_components: Vec<usize>,
    pub is_empty: bool,
}

impl DiagramStatistics {
    pub fn compute(diagram: &Diagram) -> Self {
        let mut node_shapes = BTreeMap::new();
        for node in &diagram.nodes {
            *node_shapes.entry(node.shape.as_str().to_string()).or_insert(0) += 1;
        }
        let mut connection_styles = BTreeMap::new();
        for connection in &diagram.connections {
            *connection_styles
                .entry(connection.style.as_str().to_string())
                .or_insert(0) += 1;
        }

        let isolated_nodes: Vec<IsolatedNode> = diagram
            .nodes
            .iter()
            .filter(|n| !diagram.connections.iter().any(|c| c.touches(&n.id)))
            .map(|n| IsolatedNode {
                id: n.id.clone(),
                label: n.label.clone(),
            })
            .collect();

        let components = connected_components(diagram);

        Self {
            node_count: diagram.nodes.len(),
            connection_count: diagram.connections.len(),
            border_count: diagram.borders.len(),
            node_shapes,
            connection_styles,
            isolated_node_count: isolated_nodes.len(),
            isolated_nodes,
            connected_component_count: components.len(),
            connected_components: components.iter().map(Vec::len).collect(),
            is_empty: diagram.is_empty(),
        }
    }
}

/// Node ids grouped by undirected reachability, in order of first appearance.
pub fn connected_components(diagram: &Diagram) -> Vec<Vec<ElementId>> {
    let mut adjacency: HashMap<&ElementId, Vec<&ElementId>> = HashMap::new();
    for connection in &diagram.connections {
        adjacency.entry(&connection.from).or_default().push(&connection.to);
        adjacency.entry(&connection.to).or_default().push(&connection.from);
    }

    let mut visited: HashSet<&ElementId> = HashSet::new();
    let mut components = Vec::new();
    for node in &diagram.nodes {
        if visited.contains(&node.id) {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![&node.id];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            component.push(id.clone());
            if let Some(neighbours) = adjacency.get(id) {
                stack.extend(neighbours.iter().rev().filter(|n| !visited.contains(*n)));
            }
        }
        components.push(component);
    }
    components
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: ElementId,
    pub label: String,
    pub shape: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSummary {
    pub id: ElementId,
    pub from: ElementId,
    pub to: ElementId,
    pub style: RoutingStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderSummary {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramContext {
    pub nodes: Vec<NodeSummary>,
    pub connections: Vec<ConnectionSummary>,
    pub borders: Vec<BorderSummary>,
    pub statistics: DiagramStatistics,
}

/// `{ "diagram_context": ... }` envelope sent with assistant requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEnvelope {
    pub diagram_context: DiagramContext,
}

impl DiagramContext {
    pub fn from_diagram(diagram: &Diagram) -> Self {
        Self {
            nodes: diagram
                .nodes
                .iter()
                .map(|n| NodeSummary {
                    id: n.id.clone(),
                    label: n.label.clone(),
                    shape: n.shape,
                    x: n.x,
                    y: n.y,
                    width: n.width,
                    height: n.height,
                })
                .collect(),
            connections: diagram
                .connections
                .iter()
                .map(|c| ConnectionSummary {
                    id: c.id.clone(),
                    from: c.from.clone(),
                    to: c.to.clone(),
                    style: c.style,
                })
                .collect(),
            borders: diagram
                .borders
                .iter()
                .map(|b| BorderSummary {
                    id: b.id.clone(),
                    x: b.x,
                    y: b.y,
                    w: b.w,
                    h: b.h,
                })
                .collect(),
            statistics: DiagramStatistics::compute(diagram),
        }
    }

    pub fn into_envelope(self) -> ContextEnvelope {
        ContextEnvelope {
            diagram_context: self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, Node};
    use kurbo::Rect;

    fn diagram() -> Diagram {
        let mut d = Diagram::new();
        for (id, shape, x) in [
            ("a", ShapeKind::Rectangle, 0.0),
            ("b", ShapeKind::Diamond, 200.0),
            ("c", ShapeKind::Rectangle, 400.0),
            ("d", ShapeKind::Circle, 600.0),
            ("e", ShapeKind::Rectangle, 800.0),
        ] {
            d.add_node(
                Node::new(shape, Rect::new(x, 0.0, x + 100.0, 60.0), id.to_uppercase())
                    .unwrap()
                    .with_id(id),
            )
            .unwrap();
        }
        for (id, from, to, style) in [
            ("ab", "a", "b", RoutingStyle::Curved),
            ("cb", "c", "b", RoutingStyle::Straight),
            ("de", "d", "e", RoutingStyle::Curved),
        ] {
            d.add_connection(Connection::new(from.into(), to.into(), style).unwrap().with_id(id))
                .unwrap();
        }
        d
    }

    #[test]
    fn test_statistics() {
        let mut d = diagram();
        d.add_node(
            Node::new(ShapeKind::Circle, Rect::new(0.0, 200.0, 50.0, 250.0), "Lonely")
                .unwrap()
                .with_id("z"),
        )
        .unwrap();
        let stats = DiagramStatistics::compute(&d);
        assert_eq!(stats.node_count, 6);
        assert_eq!(stats.connection_count, 3);
        assert_eq!(stats.node_shapes["rectangle"], 3);
        assert_eq!(stats.node_shapes["circle"], 2);
        assert_eq!(stats.connection_styles["curved"], 2);
        assert_eq!(stats.isolated_nodes, vec![IsolatedNode { id: "z".into(), label: "Lonely".into() }]);
        assert_eq!(stats.connected_components, vec![3, 2, 1]);
        assert!(!stats.is_empty);
        assert!(DiagramStatistics::compute(&Diagram::new()).is_empty);
    }

    #[test]
    fn test_components_follow_edges_both_ways() {
        let components = connected_components(&diagram());
        let first: Vec<&str> = components[0].iter().map(ElementId::as_str).collect();
        assert_eq!(first, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_context_json_shape() {
        let json = serde_json::to_value(DiagramContext::from_diagram(&diagram()).into_envelope())
            .unwrap();
        let context = &json["diagram_context"];
        assert_eq!(context["nodes"][1]["shape"], "diamond");
        assert_eq!(context["connections"][1]["style"], "straight");
        assert_eq!(context["statistics"]["nodeCount"], 5);
        assert_eq!(context["statistics"]["connectedComponentCount"], 2);
        assert!(context["nodes"][0].get("color").is_none());
    }
}
