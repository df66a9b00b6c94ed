//! The diagram model and the sink through which new versions are committed.

use crate::geometry::{near_rect_edge, rects_overlap};
use crate::model::{
    Border, Connection, ElementId, ElementKind, ElementRef, ModelError, ModelResult, Node,
    ValidationReport,
};
use crate::routing::ConnectionRoute;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Receiver for new element collections.
///
/// The shell owns the diagram; the core never edits it in place and hands
/// back a complete replacement collection instead.
pub trait ChangeSink {
    fn commit_nodes(&mut self, nodes: Vec<Node>);
    fn commit_connections(&mut self, connections: Vec<Connection>);
    fn commit_borders(&mut self, borders: Vec<Border>);
}

/// Nodes, connections and borders, each in draw order (back to front).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub borders: Vec<Border>,
}

impl ChangeSink for Diagram {
    fn commit_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
    }

    fn commit_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
    }

    fn commit_borders(&mut self, borders: Vec<Border>) {
        self.borders = borders;
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty() && self.borders.is_empty()
    }

    pub fn node(&self, id: &ElementId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn connection(&self, id: &ElementId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.id == id)
    }

    pub fn border(&self, id: &ElementId) -> Option<&Border> {
        self.borders.iter().find(|b| &b.id == id)
    }

    /// Whether the referenced element exists.
    pub fn contains(&self, element: &ElementRef) -> bool {
        match element.kind {
            ElementKind::Node => self.node(&element.id).is_some(),
            ElementKind::Connection => self.connection(&element.id).is_some(),
            ElementKind::Border => self.border(&element.id).is_some(),
        }
    }

    fn id_taken(&self, id: &ElementId) -> bool {
        self.node(id).is_some() || self.connection(id).is_some() || self.border(id).is_some()
    }

    /// Append a node after validating it.
    pub fn add_node(&mut self, node: Node) -> ModelResult<()> {
        node.validate()?;
        if self.id_taken(&node.id) {
            return Err(ModelError::DuplicateId(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Append a connection after checking both endpoints exist.
    pub fn add_connection(&mut self, connection: Connection) -> ModelResult<()> {
        self.check_connection(&connection)?;
        if self.id_taken(&connection.id) {
            return Err(ModelError::DuplicateId(connection.id));
        }
        self.connections.push(connection);
        Ok(())
    }

    pub fn add_border(&mut self, border: Border) -> ModelResult<()> {
        border.validate()?;
        if self.id_taken(&border.id) {
            return Err(ModelError::DuplicateId(border.id));
        }
        self.borders.push(border);
        Ok(())
    }

    fn check_connection(&self, connection: &Connection) -> ModelResult<()> {
        match self.connection_problems(connection).into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    fn connection_problems(&self, connection: &Connection) -> Vec<ModelError> {
        let mut problems = Vec::new();
        if connection.from == connection.to {
            problems.push(ModelError::SelfLoop(connection.id.clone()));
        }
        let mut endpoints = vec![&connection.from];
        if connection.to != connection.from {
            endpoints.push(&connection.to);
        }
        for endpoint in endpoints {
            if self.node(endpoint).is_none() {
                problems.push(ModelError::DanglingReference {
                    connection: connection.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        problems
    }

    /// Collections left after deleting `elements`, with node deletion
    /// cascading to incident connections.
    pub fn without(&self, elements: &[ElementRef]) -> Diagram {
        let ids = |kind: ElementKind| -> HashSet<&ElementId> {
            elements.iter().filter(|e| e.kind == kind).map(|e| &e.id).collect()
        };
        let nodes = ids(ElementKind::Node);
        let connections = ids(ElementKind::Connection);
        let borders = ids(ElementKind::Border);

        Diagram {
            nodes: self
                .nodes
                .iter()
                .filter(|n| !nodes.contains(&n.id))
                .cloned()
                .collect(),
            connections: self
                .connections
                .iter()
                .filter(|c| {
                    !connections.contains(&c.id)
                        && !nodes.contains(&c.from)
                        && !nodes.contains(&c.to)
                })
                .cloned()
                .collect(),
            borders: self
                .borders
                .iter()
                .filter(|b| !borders.contains(&b.id))
                .cloned()
                .collect(),
        }
    }

    /// Remove a node and every connection touching it.
    pub fn remove_node(&mut self, id: &ElementId) -> Option<Node> {
        let index = self.nodes.iter().position(|n| &n.id == id)?;
        self.connections.retain(|c| !c.touches(id));
        Some(self.nodes.remove(index))
    }

    pub fn remove_connection(&mut self, id: &ElementId) -> Option<Connection> {
        let index = self.connections.iter().position(|c| &c.id == id)?;
        Some(self.connections.remove(index))
    }

    pub fn remove_border(&mut self, id: &ElementId) -> Option<Border> {
        let index = self.borders.iter().position(|b| &b.id == id)?;
        Some(self.borders.remove(index))
    }

    /// Both endpoint nodes, or `None` for a dangling connection.
    pub fn endpoints(&self, connection: &Connection) -> Option<(&Node, &Node)> {
        Some((self.node(&connection.from)?, self.node(&connection.to)?))
    }

    /// Routed geometry of a connection, or `None` if an endpoint is missing.
    pub fn route(&self, connection: &Connection) -> Option<ConnectionRoute> {
        let (from, to) = self.endpoints(connection)?;
        let style = connection.resolved_style();
        Some(ConnectionRoute::between_nodes(
            from,
            to,
            connection.style,
            style.curvature,
        ))
    }

    /// Union of node and border bounds. Connections never extend past nodes.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .map(Node::bounds)
            .chain(self.borders.iter().map(Border::bounds))
            .reduce(|acc, r| acc.union(r))
    }

    /// Topmost node containing `point`.
    pub fn node_at(&self, point: Point) -> Option<&Node> {
        self.nodes.iter().rev().find(|n| n.hit_test(point))
    }

    /// Topmost connection within `threshold` of `point`.
    pub fn connection_at(&self, point: Point, threshold: f64) -> Option<&Connection> {
        self.connections.iter().rev().find(|c| {
            self.route(c)
                .is_some_and(|route| route.distance_to(point) < threshold)
        })
    }

    /// Topmost border whose outline is within `threshold` of `point`.
    pub fn border_at(&self, point: Point, threshold: f64) -> Option<&Border> {
        self.borders
            .iter()
            .rev()
            .find(|b| near_rect_edge(b.bounds(), point, threshold))
    }

    /// Element under `point`: nodes first, then connections, then borders.
    pub fn element_at(
        &self,
        point: Point,
        connection_threshold: f64,
        border_threshold: f64,
    ) -> Option<ElementRef> {
        if let Some(node) = self.node_at(point) {
            return Some(ElementRef::node(node.id.clone()));
        }
        if let Some(connection) = self.connection_at(point, connection_threshold) {
            return Some(ElementRef::connection(connection.id.clone()));
        }
        self.border_at(point, border_threshold)
            .map(|b| ElementRef::border(b.id.clone()))
    }

    /// Nodes whose bounds overlap `rect`, in draw order.
    pub fn nodes_in_rect(&self, rect: Rect) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| rects_overlap(n.bounds(), rect))
            .collect()
    }

    /// Find a node by exact id, falling back to a case-insensitive label match.
    pub fn find_node(&self, query: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.id.as_str() == query)
            .or_else(|| {
                let wanted = query.trim().to_lowercase();
                self.nodes.iter().find(|n| n.label.trim().to_lowercase() == wanted)
            })
    }

    /// Check every invariant, collecting all violations.
    pub fn validate(&self) -> Result<(), ValidationReport> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        let ids = self
            .nodes
            .iter()
            .map(|n| &n.id)
            .chain(self.connections.iter().map(|c| &c.id))
            .chain(self.borders.iter().map(|b| &b.id));
        for id in ids {
            if id.is_empty() {
                problems.push(ModelError::EmptyId);
            } else if !seen.insert(id) {
                problems.push(ModelError::DuplicateId(id.clone()));
            }
        }
        problems.extend(self.nodes.iter().filter_map(|n| n.validate().err()));
        problems.extend(self.borders.iter().filter_map(|b| b.validate().err()));
        for connection in &self.connections {
            problems.extend(self.connection_problems(connection));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            log::debug!("diagram validation found {} problem(s)", problems.len());
            Err(ValidationReport(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeKind;
    use crate::model::RoutingStyle;

    fn node(id: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
        Node::new(ShapeKind::Rectangle, Rect::new(x, y, x + w, y + h), id)
            .unwrap()
            .with_id(id)
    }

    fn connection(id: &str, from: &str, to: &str) -> Connection {
        Connection::new(from.into(), to.into(), RoutingStyle::Straight)
            .unwrap()
            .with_id(id)
    }

    fn sample() -> Diagram {
        let mut diagram = Diagram::new();
        diagram.add_node(node("a", 0.0, 0.0, 150.0, 80.0)).unwrap();
        diagram.add_node(node("b", 300.0, 0.0, 150.0, 80.0)).unwrap();
        diagram.add_node(node("c", 0.0, 300.0, 150.0, 80.0)).unwrap();
        diagram.add_connection(connection("ab", "a", "b")).unwrap();
        diagram.add_connection(connection("bc", "b", "c")).unwrap();
        diagram
            .add_border(Border::new(Rect::new(-20.0, -20.0, 500.0, 120.0)).unwrap().with_id("g"))
            .unwrap();
        diagram
    }

    #[test]
    fn test_add_connection_requires_endpoints() {
        let mut diagram = sample();
        let err = diagram.add_connection(connection("ax", "a", "x"));
        assert!(matches!(err, Err(ModelError::DanglingReference { .. })));
        let err = diagram.add_node(node("a", 0.0, 0.0, 10.0, 10.0));
        assert!(matches!(err, Err(ModelError::DuplicateId(_))));
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut diagram = sample();
        diagram.remove_node(&"b".into());
        assert_eq!(diagram.nodes.len(), 2);
        assert!(diagram.connections.is_empty());
    }

    #[test]
    fn test_without_is_pure_and_cascades() {
        let diagram = sample();
        let next = diagram.without(&[ElementRef::node("c"), ElementRef::border("g")]);
        assert_eq!(diagram.nodes.len(), 3);
        assert_eq!(next.nodes.len(), 2);
        assert_eq!(next.connections.len(), 1);
        assert!(next.borders.is_empty());
    }

    #[test]
    fn test_hit_priority() {
        let diagram = sample();
        assert_eq!(
            diagram.element_at(Point::new(10.0, 10.0), 15.0, 10.0),
            Some(ElementRef::node("a"))
        );
        assert_eq!(
            diagram.element_at(Point::new(225.0, 45.0), 15.0, 10.0),
            Some(ElementRef::connection("ab"))
        );
        assert_eq!(
            diagram.element_at(Point::new(480.0, 118.0), 15.0, 10.0),
            Some(ElementRef::border("g"))
        );
        assert_eq!(diagram.element_at(Point::new(700.0, 700.0), 15.0, 10.0), None);
    }

    #[test]
    fn test_content_bounds_includes_borders() {
        let diagram = sample();
        assert_eq!(diagram.content_bounds(), Some(Rect::new(-20.0, -20.0, 500.0, 380.0)));
        assert_eq!(Diagram::new().content_bounds(), None);
    }

    #[test]
    fn test_find_node_by_id_or_label() {
        let mut diagram = sample();
        diagram.nodes[1].label = "Payment Service".to_string();
        assert_eq!(diagram.find_node("a").map(|n| n.id.as_str()), Some("a"));
        assert_eq!(
            diagram.find_node("payment service").map(|n| n.id.as_str()),
            Some("b")
        );
        assert!(diagram.find_node("missing").is_none());
    }

    #[test]
    fn test_validate_reports_dangling_reference() {
        let mut diagram = sample();
        assert!(diagram.validate().is_ok());
        diagram.nodes.retain(|n| n.id.as_str() != "c");
        let report = diagram.validate().unwrap_err();
        assert!(matches!(
            report.problems(),
            [ModelError::DanglingReference { .. }]
        ));
        assert!(diagram.route(&diagram.connections[1]).is_none());
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let mut diagram = sample();
        diagram.nodes.retain(|n| n.id.as_str() != "c");
        diagram.nodes.push(node("a", 600.0, 0.0, 40.0, 40.0));
        let mut flat = node("flat", 0.0, 600.0, 40.0, 40.0);
        flat.height = 0.0;
        diagram.nodes.push(flat);

        let problems = diagram.validate().unwrap_err().0;
        assert_eq!(problems.len(), 3);
        assert!(problems.contains(&ModelError::DuplicateId("a".into())));
        assert!(problems.iter().any(|p| matches!(
            p,
            ModelError::NonPositiveDimension { value, .. } if *value == 0.0
        )));
        assert!(problems.contains(&ModelError::DanglingReference {
            connection: "bc".into(),
            node: "c".into(),
        }));
    }

    #[test]
    fn test_change_sink_replaces_collections() {
        let mut diagram = sample();
        let next = diagram.without(&[ElementRef::connection("ab")]);
        diagram.commit_connections(next.connections);
        assert_eq!(diagram.connections.len(), 1);
        assert_eq!(diagram.connections[0].id.as_str(), "bc");
    }
}
