//! Viewport transform between screen and logical coordinates.

use kurbo::{Affine, Point, Rect, Size, Vec2};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Zoom factor applied per wheel notch.
pub const WHEEL_ZOOM_IN: f64 = 1.1;
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Pan/zoom state of the drawing surface.
///
/// `to_screen(p) = p * zoom + pan` and `to_logical(s) = (s - pan) / zoom`.
/// The viewport is process-local and never stored with the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Screen-space translation.
    pub pan: Vec2,
    /// Scale factor, always within `[min_zoom, max_zoom]`.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Size of the drawing surface in screen pixels.
    pub size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            size: Size::new(1280.0, 800.0),
        }
    }
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Logical-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen-to-logical transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn to_logical(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn to_screen(&self, logical_point: Point) -> Point {
        self.transform() * logical_point
    }

    /// Pan by a delta in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom level, keeping `screen_point` over the same logical point.
    pub fn set_zoom_at(&mut self, screen_point: Point, zoom: f64) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.to_logical(screen_point);
        self.zoom = new_zoom;
        self.pan = screen_point.to_vec2() - anchor.to_vec2() * self.zoom;
    }

    /// Multiply the zoom by `factor`, pivoting around `screen_point`.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.set_zoom_at(screen_point, self.zoom * factor);
    }

    /// Apply one wheel step: positive `delta_y` zooms out.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64) {
        let factor = if delta_y > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
        self.zoom_at(screen_point, factor);
    }

    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    /// The logical rectangle currently visible on screen.
    pub fn visible_rect(&self) -> Rect {
        let top_left = self.to_logical(Point::ZERO);
        let bottom_right = self.to_logical(Point::new(self.size.width, self.size.height));
        Rect::from_points(top_left, bottom_right)
    }

    /// Fit `bounds` into the surface with `padding` screen pixels on each side.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let available = Size::new(
            (self.size.width - padding * 2.0).max(1.0),
            (self.size.height - padding * 2.0).max(1.0),
        );
        let scale_x = available.width / bounds.width();
        let scale_y = available.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let bounds_center = bounds.center();
        let surface_center = Point::new(self.size.width / 2.0, self.size.height / 2.0);
        self.pan = surface_center.to_vec2() - bounds_center.to_vec2() * self.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport_is_identity() {
        let viewport = Viewport::default();
        let screen = Point::new(100.0, 200.0);
        let logical = viewport.to_logical(screen);
        assert!((logical.x - screen.x).abs() < f64::EPSILON);
        assert!((logical.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_logical_with_pan_and_zoom() {
        let mut viewport = Viewport::default();
        viewport.pan = Vec2::new(50.0, 100.0);
        viewport.zoom = 2.0;
        let logical = viewport.to_logical(Point::new(150.0, 300.0));
        assert!((logical.x - 50.0).abs() < f64::EPSILON);
        assert!((logical.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::default();
        viewport.pan = Vec2::new(30.0, -20.0);
        viewport.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = viewport.to_screen(viewport.to_logical(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_pivots_around_pointer() {
        let mut viewport = Viewport::default();
        viewport.pan = Vec2::new(40.0, 25.0);
        let pointer = Point::new(300.0, 200.0);
        let before = viewport.to_logical(pointer);
        viewport.zoom_at(pointer, 1.7);
        let after = viewport.to_screen(before);
        assert!((after.x - pointer.x).abs() < 1e-9);
        assert!((after.y - pointer.y).abs() < 1e-9);
        assert!((viewport.zoom - 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(Point::ZERO, 0.001);
        assert!((viewport.zoom - MIN_ZOOM).abs() < f64::EPSILON);

        viewport.zoom_at(Point::ZERO, 1000.0);
        assert!((viewport.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_direction() {
        let mut viewport = Viewport::default();
        viewport.wheel_zoom(Point::ZERO, 1.0);
        assert!((viewport.zoom - 0.9).abs() < 1e-12);
        viewport.wheel_zoom(Point::ZERO, -1.0);
        assert!((viewport.zoom - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_visible_rect_tracks_pan_and_zoom() {
        let mut viewport = Viewport::new(Size::new(800.0, 600.0));
        viewport.pan = Vec2::new(-100.0, -50.0);
        viewport.zoom = 2.0;
        let visible = viewport.visible_rect();
        assert_eq!(visible, Rect::new(50.0, 25.0, 450.0, 325.0));
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut viewport = Viewport::new(Size::new(800.0, 600.0));
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        viewport.fit_to_bounds(bounds, 0.0);
        assert!((viewport.zoom - 2.0).abs() < 1e-12);
        let center = viewport.to_screen(bounds.center());
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }
}
