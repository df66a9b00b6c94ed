//! Connection routing shared by on-screen drawing, hit-testing and export.

use crate::geometry::{BEZIER_SAMPLES, point_to_cubic_dist, point_to_polyline_dist, point_to_segment_dist};
use crate::model::{Node, RoutingStyle};
use kurbo::{BezPath, CubicBez, Line, Point, Rect, Shape};
use std::f64::consts::PI;

/// Half-angle of the arrowhead triangle.
pub const ARROW_SPREAD: f64 = PI / 7.0;

/// Upper bound on the horizontal control-point offset of curved routes.
pub const MAX_CONTROL_OFFSET: f64 = 100.0;

/// Geometry of a routed connection.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePath {
    Line(Line),
    Cubic(CubicBez),
    Polyline(Vec<Point>),
}

/// A connection path plus the direction its arrowhead points.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRoute {
    pub start: Point,
    pub end: Point,
    pub path: RoutePath,
    /// Angle of the arrowhead in radians.
    pub arrow_angle: f64,
}

impl ConnectionRoute {
    /// Route between two explicit endpoints.
    pub fn between(start: Point, end: Point, style: RoutingStyle, curvature: f64) -> Self {
        let chord_angle = (end.y - start.y).atan2(end.x - start.x);
        let (path, arrow_angle) = match style {
            RoutingStyle::Straight => (RoutePath::Line(Line::new(start, end)), chord_angle),
            RoutingStyle::Curved => {
                let offset = ((end.x - start.x).abs() / 2.0).min(MAX_CONTROL_OFFSET) * curvature;
                let curve = CubicBez::new(
                    start,
                    Point::new(start.x + offset, start.y),
                    Point::new(end.x - offset, end.y),
                    end,
                );
                (RoutePath::Cubic(curve), chord_angle)
            }
            RoutingStyle::Orthogonal => {
                let mid_x = (start.x + end.x) / 2.0;
                let points = vec![
                    start,
                    Point::new(mid_x, start.y),
                    Point::new(mid_x, end.y),
                    end,
                ];
                let angle = if start.x < end.x { 0.0 } else { PI };
                (RoutePath::Polyline(points), angle)
            }
        };
        Self {
            start,
            end,
            path,
            arrow_angle,
        }
    }

    /// Route between two nodes, anchored where each faces the other's center.
    pub fn between_nodes(from: &Node, to: &Node, style: RoutingStyle, curvature: f64) -> Self {
        let start = from.edge_point(to.center());
        let end = to.edge_point(from.center());
        Self::between(start, end, style, curvature)
    }

    /// Distance from `point` to the routed path.
    pub fn distance_to(&self, point: Point) -> f64 {
        match &self.path {
            RoutePath::Line(line) => point_to_segment_dist(point, line.p0, line.p1),
            RoutePath::Cubic(curve) => point_to_cubic_dist(point, curve, BEZIER_SAMPLES),
            RoutePath::Polyline(points) => point_to_polyline_dist(point, points),
        }
    }

    pub fn to_bez_path(&self) -> BezPath {
        match &self.path {
            RoutePath::Line(line) => line.to_path(0.1),
            RoutePath::Cubic(curve) => curve.to_path(0.1),
            RoutePath::Polyline(points) => {
                let mut path = BezPath::new();
                if let Some((first, rest)) = points.split_first() {
                    path.move_to(*first);
                    for p in rest {
                        path.line_to(*p);
                    }
                }
                path
            }
        }
    }

    /// Tip and two base corners of the arrowhead triangle at the end point.
    pub fn arrowhead(&self, size: f64) -> [Point; 3] {
        let tip = self.end;
        let corner = |angle: f64| Point::new(tip.x - size * angle.cos(), tip.y - size * angle.sin());
        [
            tip,
            corner(self.arrow_angle - ARROW_SPREAD),
            corner(self.arrow_angle + ARROW_SPREAD),
        ]
    }

    /// Bounding box of the path, including control points for curves.
    pub fn bounding_box(&self) -> Rect {
        self.to_bez_path().bounding_box()
    }
}
