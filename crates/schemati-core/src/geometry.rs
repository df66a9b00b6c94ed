//! Per-shape boundary geometry and distance helpers.
//!
//! All inputs and outputs are in logical (diagram) coordinates, so the
//! thresholds here do not depend on the viewport zoom.

use kurbo::{CubicBez, ParamCurve, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Distance within which a pointer hits a connection.
pub const HIT_THRESHOLD: f64 = 15.0;

/// Distance from a border's outline within which a pointer hits it.
pub const BORDER_HIT_THRESHOLD: f64 = 10.0;

/// Number of segments used to approximate a Bézier curve for distance tests.
pub const BEZIER_SAMPLES: usize = 32;

/// Closed set of node outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Diamond,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Rectangle, ShapeKind::Circle, ShapeKind::Diamond];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Diamond => "diamond",
        }
    }

    /// Size used when a node is created without explicit dimensions.
    pub fn default_size(self) -> Size {
        match self {
            ShapeKind::Rectangle => Size::new(150.0, 80.0),
            ShapeKind::Circle => Size::new(100.0, 100.0),
            ShapeKind::Diamond => Size::new(120.0, 120.0),
        }
    }

    /// Point on this shape's boundary in the direction of `target`.
    ///
    /// Returns `center` when `target` coincides with it.
    pub fn edge_point(self, center: Point, size: Size, target: Point) -> Point {
        let d = target - center;
        if d.x == 0.0 && d.y == 0.0 {
            return center;
        }
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;

        match self {
            ShapeKind::Circle => {
                let radius = hw.min(hh);
                let angle = d.y.atan2(d.x);
                center + Vec2::new(radius * angle.cos(), radius * angle.sin())
            }
            ShapeKind::Rectangle => {
                if d.x == 0.0 {
                    return Point::new(center.x, center.y + hh.copysign(d.y));
                }
                if d.y == 0.0 {
                    return Point::new(center.x + hw.copysign(d.x), center.y);
                }
                // |dy/dx| against hh/hw, cross-multiplied to stay finite.
                if d.y.abs() * hw <= d.x.abs() * hh {
                    let t = hw / d.x.abs();
                    Point::new(center.x + hw.copysign(d.x), center.y + d.y * t)
                } else {
                    let t = hh / d.y.abs();
                    Point::new(center.x + d.x * t, center.y + hh.copysign(d.y))
                }
            }
            ShapeKind::Diamond => {
                // The ray hits the edge pair on its side of the hh/hw slope;
                // |x|/hw + |y|/hh = 1 solves both pairs at once.
                let t = 1.0 / (d.x.abs() / hw + d.y.abs() / hh);
                center + d * t
            }
        }
    }

    /// Whether `point` lies inside (or on) the shape.
    pub fn hit_test(self, center: Point, size: Size, point: Point) -> bool {
        let d = point - center;
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;
        match self {
            ShapeKind::Circle => d.hypot() <= hw.min(hh),
            ShapeKind::Diamond => d.x.abs() / hw + d.y.abs() / hh <= 1.0,
            ShapeKind::Rectangle => d.x.abs() <= hw && d.y.abs() <= hh,
        }
    }
}

/// Corner points of a diamond inscribed in `bounds`: top, right, bottom, left.
pub fn diamond_points(bounds: Rect) -> [Point; 4] {
    let c = bounds.center();
    [
        Point::new(c.x, bounds.y0),
        Point::new(bounds.x1, c.y),
        Point::new(c.x, bounds.y1),
        Point::new(bounds.x0, c.y),
    ]
}

/// Distance from a point to a line segment (clamped projection).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Sampled distance from a point to a cubic Bézier curve.
pub fn point_to_cubic_dist(point: Point, curve: &CubicBez, samples: usize) -> f64 {
    let samples = samples.max(1);
    (0..=samples)
        .map(|i| curve.eval(i as f64 / samples as f64).distance(point))
        .fold(f64::INFINITY, f64::min)
}

/// Whether `point` lies within `threshold` of any of the rectangle's four edges.
pub fn near_rect_edge(rect: Rect, point: Point, threshold: f64) -> bool {
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x0, rect.y0),
    ];
    point_to_polyline_dist(point, &corners) <= threshold
}

/// Whether two rectangles overlap with positive area.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.intersect(b).area() > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn assert_point_eq(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_rectangle_edge_points_face_each_other() {
        let size = Size::new(150.0, 80.0);
        let a = Point::new(75.0, 40.0);
        let b = Point::new(375.0, 40.0);
        assert_point_eq(ShapeKind::Rectangle.edge_point(a, size, b), Point::new(150.0, 40.0));
        assert_point_eq(ShapeKind::Rectangle.edge_point(b, size, a), Point::new(300.0, 40.0));
    }

    #[test]
    fn test_rectangle_axis_aligned_targets() {
        let size = Size::new(100.0, 50.0);
        let c = Point::ZERO;
        let rect = ShapeKind::Rectangle;
        assert_point_eq(rect.edge_point(c, size, Point::new(0.0, 500.0)), Point::new(0.0, 25.0));
        assert_point_eq(rect.edge_point(c, size, Point::new(0.0, -1.0)), Point::new(0.0, -25.0));
        assert_point_eq(rect.edge_point(c, size, Point::new(-3.0, 0.0)), Point::new(-50.0, 0.0));
        // Exact corner direction lands on the corner.
        assert_point_eq(rect.edge_point(c, size, Point::new(100.0, 50.0)), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_diamond_and_circle_cardinal_points() {
        let size = Size::new(120.0, 80.0);
        let c = Point::new(10.0, 10.0);
        assert_point_eq(
            ShapeKind::Diamond.edge_point(c, size, Point::new(10.0, 200.0)),
            Point::new(10.0, 50.0),
        );
        assert_point_eq(
            ShapeKind::Diamond.edge_point(c, size, Point::new(-100.0, 10.0)),
            Point::new(-50.0, 10.0),
        );
        assert_point_eq(
            ShapeKind::Circle.edge_point(c, size, Point::new(100.0, 10.0)),
            Point::new(50.0, 10.0),
        );
    }

    #[test]
    fn test_coincident_target_returns_center() {
        let c = Point::new(5.0, 5.0);
        for shape in ShapeKind::ALL {
            assert_eq!(shape.edge_point(c, Size::new(10.0, 10.0), c), c);
        }
    }

    #[test]
    fn test_hit_tests() {
        let c = Point::new(50.0, 50.0);
        let size = Size::new(100.0, 100.0);
        // Corner region: inside the rectangle only.
        let corner = Point::new(95.0, 95.0);
        assert!(ShapeKind::Rectangle.hit_test(c, size, corner));
        assert!(!ShapeKind::Circle.hit_test(c, size, corner));
        assert!(!ShapeKind::Diamond.hit_test(c, size, corner));
        let near = Point::new(70.0, 70.0);
        assert!(ShapeKind::Circle.hit_test(c, size, near));
        assert!(ShapeKind::Diamond.hit_test(c, size, near));
    }

    #[test]
    fn test_segment_distance_clamps() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-12);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-12);
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_cubic_distance_on_curve_is_small() {
        let curve = CubicBez::new((0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0));
        let on_curve = curve.eval(0.37);
        assert!(point_to_cubic_dist(on_curve, &curve, BEZIER_SAMPLES) < 3.0);
        assert!(point_to_cubic_dist(Point::new(300.0, 300.0), &curve, BEZIER_SAMPLES) > 200.0);
    }

    #[test]
    fn test_near_rect_edge_excludes_interior() {
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert!(near_rect_edge(rect, Point::new(100.0, 5.0), BORDER_HIT_THRESHOLD));
        assert!(near_rect_edge(rect, Point::new(-8.0, 50.0), BORDER_HIT_THRESHOLD));
        assert!(!near_rect_edge(rect, Point::new(100.0, 50.0), BORDER_HIT_THRESHOLD));
        assert!(!near_rect_edge(rect, Point::new(250.0, 50.0), BORDER_HIT_THRESHOLD));
    }

    fn on_boundary(shape: ShapeKind, center: Point, size: Size, p: Point) -> f64 {
        let d = p - center;
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;
        match shape {
            ShapeKind::Circle => d.hypot() / hw.min(hh),
            ShapeKind::Rectangle => (d.x.abs() / hw).max(d.y.abs() / hh),
            ShapeKind::Diamond => d.x.abs() / hw + d.y.abs() / hh,
        }
    }

    proptest! {
        #[test]
        fn edge_point_lies_on_boundary(
            w in 1.0f64..500.0,
            h in 1.0f64..500.0,
            cx in -1000.0f64..1000.0,
            cy in -1000.0f64..1000.0,
            angle in 0.0f64..(2.0 * PI),
            dist in 0.5f64..2000.0,
        ) {
            let center = Point::new(cx, cy);
            let size = Size::new(w, h);
            let target = center + Vec2::new(dist * angle.cos(), dist * angle.sin());
            for shape in ShapeKind::ALL {
                let p = shape.edge_point(center, size, target);
                let ratio = on_boundary(shape, center, size, p);
                prop_assert!((ratio - 1.0).abs() < 1e-9, "{shape:?} ratio {ratio}");
            }
        }

        #[test]
        fn edge_point_is_continuous_over_full_sweep(
            w in 10.0f64..400.0,
            h in 10.0f64..400.0,
        ) {
            let center = Point::ZERO;
            let size = Size::new(w, h);
            let steps = 720;
            let step = 2.0 * PI / steps as f64;
            let hw = w / 2.0;
            let hh = h / 2.0;
            // Boundary speed per radian peaks at a corner: r_corner^2 / r_min.
            let bound = step * (hw * hw + hh * hh) / hw.min(hh) * 1.05 + 1e-9;
            for shape in [ShapeKind::Rectangle, ShapeKind::Diamond] {
                let mut prev: Option<Point> = None;
                for i in 0..=steps {
                    let a = i as f64 * step;
                    let target = Point::new(1000.0 * a.cos(), 1000.0 * a.sin());
                    let p = shape.edge_point(center, size, target);
                    if let Some(q) = prev {
                        prop_assert!(p.distance(q) <= bound, "{shape:?} jump {} > {bound}", p.distance(q));
                    }
                    prev = Some(p);
                }
            }
        }
    }
}
