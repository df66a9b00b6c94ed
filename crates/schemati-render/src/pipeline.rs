//! Scene construction for live frames and exports.

use crate::export::ExportFrame;
use crate::renderer::{RenderContext, Renderer, SELECTION_COLOR};
use crate::scene::{
    DropShadow, ElementTag, Group, Paint, Primitive, Scene, StrokeStyle, TextRun,
};
use crate::text::{ApproximateMetrics, TextMeasure, layout_label};
use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use schemati_core::geometry::{ShapeKind, diamond_points};
use schemati_core::model::{
    ArrowStyle, Border, Connection, DEFAULT_BORDER_LINE_WIDTH, DEFAULT_NODE_BORDER_WIDTH,
    DEFAULT_NODE_CORNER_RADIUS, ElementKind, ElementRef, Node, Shadow,
};
use schemati_core::routing::RoutePath;
use schemati_core::snap::{GuideAxis, SnapGuide};
use schemati_core::{Diagram, Selection};

const GRID_COLOR: Color = Color::from_rgba8(200, 200, 200, 77);
const PREVIEW_GRAY: Color = Color::from_rgba8(156, 163, 175, 255);
const PREVIEW_NODE_FILL: Color = Color::from_rgba8(59, 130, 246, 26);
const MARQUEE_FILL: Color = Color::from_rgba8(59, 130, 246, 25);
const PREVIEW_DASH: [f64; 2] = [8.0, 4.0];
const SELECTION_DASH: [f64; 2] = [5.0, 3.0];
const SELECTION_OVERLAY_WIDTH: f64 = 2.0;

/// Builds [`Scene`]s from a diagram. Stroke widths that should stay
/// constant on screen are divided by the current zoom.
pub struct SceneRenderer<M: TextMeasure = ApproximateMetrics> {
    scene: Scene,
    measure: M,
    zoom: f64,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::with_measure(ApproximateMetrics::default())
    }
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TextMeasure> SceneRenderer<M> {
    pub fn with_measure(measure: M) -> Self {
        Self {
            scene: Scene::new(Default::default(), Default::default()),
            measure,
            zoom: 1.0,
        }
    }

    /// The scene built by the last [`Renderer::build_scene`] call.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn take_scene(&mut self) -> Scene {
        std::mem::replace(
            &mut self.scene,
            Scene::new(Default::default(), Default::default()),
        )
    }

    /// Build an export scene: borders, connections, then nodes, without
    /// grid, guides or selection styling.
    pub fn build_export_scene(
        &mut self,
        diagram: &Diagram,
        frame: &ExportFrame,
        background: Option<Color>,
    ) -> Scene {
        self.scene = Scene::new(frame.size(), frame.transform());
        self.scene.background = background;
        self.zoom = 1.0;

        self.render_borders(diagram, None);
        self.render_connections(diagram, None);
        self.render_nodes(diagram, None);
        self.take_scene()
    }

    fn render_borders(&mut self, diagram: &Diagram, selection: Option<&Selection>) {
        for border in &diagram.borders {
            let selected = is_selected(selection, ElementRef::border(border.id.clone()));
            self.render_border(border, selected);
        }
    }

    fn render_connections(&mut self, diagram: &Diagram, selection: Option<&Selection>) {
        for connection in &diagram.connections {
            let selected = is_selected(selection, ElementRef::connection(connection.id.clone()));
            self.render_connection(diagram, connection, selected);
        }
    }

    fn render_nodes(&mut self, diagram: &Diagram, selection: Option<&Selection>) {
        for node in &diagram.nodes {
            let selected = is_selected(selection, ElementRef::node(node.id.clone()));
            self.render_node(node, selected);
        }
    }

    fn render_node(&mut self, node: &Node, selected: bool) {
        let style = node.resolved_style();
        let bounds = node.bounds();
        let outline = shape_outline(node.shape, bounds, style.corner_radius);
        let mut group = Group::tagged(ElementTag {
            kind: ElementKind::Node,
            id: node.id.clone(),
            bounds,
        });

        let width = style.stroke_width + if selected { 1.0 } else { 0.0 };
        group.push(
            outline.clone(),
            Paint {
                fill: (!style.fill.is_transparent()).then(|| style.fill.to_color()),
                stroke: Some(StrokeStyle::new(style.stroke.to_color(), width)),
                opacity: style.opacity,
                shadow: drop_shadow(&style.shadow),
            },
        );
        if selected {
            group.push(outline, selection_overlay().with_opacity(style.opacity));
        }

        let (lines, anchor) = layout_label(node, &self.measure);
        let color = style.font_color.to_color();
        for line in lines {
            group.push(
                Primitive::Text(TextRun {
                    text: line.text,
                    position: line.position,
                    anchor,
                    font_size: style.font_size,
                    font_family: style.font_family.clone(),
                    font_weight: style.font_weight.clone(),
                    color,
                }),
                Paint::default().with_opacity(style.opacity),
            );
        }
        self.scene.push_group(group);
    }

    fn render_connection(&mut self, diagram: &Diagram, connection: &Connection, selected: bool) {
        let Some(route) = diagram.route(connection) else {
            log::debug!("skipping connection {} with missing endpoint", connection.id);
            return;
        };
        let style = connection.resolved_style();
        let color = style.color.to_color();
        let width = style.width + if selected { 1.0 } else { 0.0 };

        let mut group = Group::tagged(ElementTag {
            kind: ElementKind::Connection,
            id: connection.id.clone(),
            bounds: route.bounding_box(),
        });
        let line = match &route.path {
            RoutePath::Polyline(points) => Primitive::Polyline(points.clone()),
            _ => Primitive::Path(route.to_bez_path()),
        };
        let stroke = StrokeStyle::new(color, width)
            .with_dash(style.dash_pattern().map(|d| d.to_vec()))
            .rounded();
        group.push(line, Paint::stroke(stroke).with_opacity(style.opacity));

        let head = Primitive::Polygon(route.arrowhead(style.arrow_size).to_vec());
        match style.arrow_style {
            ArrowStyle::Filled => {
                group.push(head, Paint::fill(color).with_opacity(style.opacity));
            }
            ArrowStyle::Outlined => {
                let outline = StrokeStyle::new(color, width).rounded();
                group.push(head, Paint::stroke(outline).with_opacity(style.opacity));
            }
            ArrowStyle::None => {}
        }
        self.scene.push_group(group);
    }

    fn render_border(&mut self, border: &Border, selected: bool) {
        let style = border.resolved_style();
        let bounds = border.bounds();
        let outline = Primitive::Rect {
            rect: bounds,
            radius: style.corner_radius,
        };
        let mut group = Group::tagged(ElementTag {
            kind: ElementKind::Border,
            id: border.id.clone(),
            bounds,
        });

        if !style.fill.is_transparent() && style.fill_opacity > 0.0 {
            group.push(
                outline.clone(),
                Paint::fill(style.fill.to_color())
                    .with_opacity(style.fill_opacity)
                    .with_shadow(drop_shadow(&style.shadow)),
            );
        }
        let width = style.line_width + if selected { 1.0 } else { 0.0 };
        group.push(
            outline.clone(),
            Paint::stroke(StrokeStyle::new(style.stroke.to_color(), width))
                .with_opacity(style.opacity),
        );
        if selected {
            group.push(outline, selection_overlay().with_opacity(style.opacity));
        }
        self.scene.push_group(group);
    }

    fn render_grid(&mut self, visible: Rect, grid_size: f64) {
        if grid_size <= 0.0 {
            return;
        }
        let (start_x, start_y, end_x, end_y) = grid_bounds(visible, grid_size);

        let mut path = BezPath::new();
        let mut x = start_x;
        while x <= end_x {
            path.move_to(Point::new(x, start_y));
            path.line_to(Point::new(x, end_y));
            x += grid_size;
        }
        let mut y = start_y;
        while y <= end_y {
            path.move_to(Point::new(start_x, y));
            path.line_to(Point::new(end_x, y));
            y += grid_size;
        }
        self.scene.push(
            Primitive::Path(path),
            Paint::stroke(StrokeStyle::new(GRID_COLOR, 1.0 / self.zoom)),
        );
    }

    fn render_guides(&mut self, guides: &[SnapGuide], visible: Rect) {
        for guide in guides {
            let s = guide.strength.clamp(0.0, 1.0);
            let points = match guide.axis {
                GuideAxis::Vertical => vec![
                    Point::new(guide.position, visible.y0),
                    Point::new(guide.position, visible.y1),
                ],
                GuideAxis::Horizontal => vec![
                    Point::new(visible.x0, guide.position),
                    Point::new(visible.x1, guide.position),
                ],
            };
            let stroke = StrokeStyle::new(
                SELECTION_COLOR.with_alpha((0.4 + 0.6 * s) as f32),
                (1.5 + 1.5 * s) / self.zoom,
            )
            .with_dash(Some(self.screen_dash(PREVIEW_DASH)));
            let glow = DropShadow {
                color: SELECTION_COLOR.with_alpha((s * 0.4) as f32),
                blur: 6.0 * s,
                offset: Vec2::ZERO,
            };
            self.scene.push(
                Primitive::Polyline(points),
                Paint::stroke(stroke).with_shadow((s > 0.0).then_some(glow)),
            );
        }
    }

    fn render_node_preview(&mut self, bounds: Rect, shape: ShapeKind) {
        let stroke = StrokeStyle::new(SELECTION_COLOR, DEFAULT_NODE_BORDER_WIDTH)
            .with_dash(Some(PREVIEW_DASH.to_vec()));
        self.scene.push(
            shape_outline(shape, bounds, DEFAULT_NODE_CORNER_RADIUS),
            Paint::stroke(stroke).with_fill(PREVIEW_NODE_FILL),
        );
    }

    fn render_border_preview(&mut self, bounds: Rect) {
        let stroke = StrokeStyle::new(PREVIEW_GRAY, DEFAULT_BORDER_LINE_WIDTH)
            .with_dash(Some(PREVIEW_DASH.to_vec()));
        self.scene.push(
            Primitive::Rect {
                rect: bounds,
                radius: 0.0,
            },
            Paint::stroke(stroke),
        );
    }

    fn render_connection_preview(&mut self, from: Point, to: Point) {
        let stroke = StrokeStyle::new(PREVIEW_GRAY, 2.0)
            .with_dash(Some(PREVIEW_DASH.to_vec()))
            .rounded();
        self.scene
            .push(Primitive::Polyline(vec![from, to]), Paint::stroke(stroke));
    }

    fn render_marquee(&mut self, rect: Rect) {
        let stroke = StrokeStyle::new(SELECTION_COLOR, 1.0 / self.zoom)
            .with_dash(Some(self.screen_dash([4.0, 4.0])));
        self.scene.push(
            Primitive::Rect { rect, radius: 0.0 },
            Paint::stroke(stroke).with_fill(MARQUEE_FILL),
        );
    }

    fn screen_dash(&self, dash: [f64; 2]) -> Vec<f64> {
        dash.iter().map(|d| d / self.zoom).collect()
    }
}

impl<M: TextMeasure + Send + Sync> Renderer for SceneRenderer<M> {
    fn build_scene(&mut self, ctx: &RenderContext) {
        use schemati_core::interaction::Preview;

        self.scene = Scene::new(ctx.viewport.size, ctx.viewport.transform());
        self.scene.background = Some(self.background_color(ctx));
        self.zoom = ctx.viewport.zoom;
        let visible = ctx.viewport.visible_rect();

        if ctx.show_grid {
            self.render_grid(visible, ctx.grid_size);
        }
        self.render_guides(ctx.guides, visible);

        self.render_borders(ctx.diagram, ctx.selection);
        if let Some(Preview::Border { bounds }) = &ctx.preview {
            self.render_border_preview(*bounds);
        }

        self.render_connections(ctx.diagram, ctx.selection);
        if let Some(Preview::Connection { from, to }) = &ctx.preview {
            self.render_connection_preview(*from, *to);
        }

        self.render_nodes(ctx.diagram, ctx.selection);
        if let Some(Preview::Node { bounds, shape }) = &ctx.preview {
            self.render_node_preview(*bounds, *shape);
        }

        if let Some(rect) = ctx.marquee {
            self.render_marquee(rect);
        }
    }
}

fn is_selected(selection: Option<&Selection>, element: ElementRef) -> bool {
    selection.is_some_and(|s| s.contains(&element))
}

/// Outline primitive for a node shape within `bounds`.
fn shape_outline(shape: ShapeKind, bounds: Rect, radius: f64) -> Primitive {
    match shape {
        ShapeKind::Rectangle => Primitive::Rect {
            rect: bounds,
            radius,
        },
        ShapeKind::Circle => {
            let r = bounds.width().min(bounds.height()) / 2.0;
            Primitive::Ellipse {
                center: bounds.center(),
                radii: Vec2::new(r, r),
            }
        }
        ShapeKind::Diamond => Primitive::Polygon(diamond_points(bounds).to_vec()),
    }
}

fn selection_overlay() -> Paint {
    Paint::stroke(
        StrokeStyle::new(SELECTION_COLOR, SELECTION_OVERLAY_WIDTH)
            .with_dash(Some(SELECTION_DASH.to_vec())),
    )
}

fn drop_shadow(shadow: &Shadow) -> Option<DropShadow> {
    shadow.is_visible().then(|| DropShadow {
        color: shadow.color.to_color(),
        blur: shadow.blur,
        offset: shadow.offset,
    })
}

/// Grid-aligned extent covering `visible`.
fn grid_bounds(visible: Rect, grid_size: f64) -> (f64, f64, f64, f64) {
    let start_x = (visible.x0 / grid_size).floor() * grid_size;
    let start_y = (visible.y0 / grid_size).floor() * grid_size;
    let end_x = (visible.x1 / grid_size).ceil() * grid_size;
    let end_y = (visible.y1 / grid_size).ceil() * grid_size;
    (start_x, start_y, end_x, end_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportOptions, export_frame};
    use crate::scene::Item;
    use schemati_core::interaction::Preview;
    use schemati_core::model::{RoutingStyle, ColorRgba};
    use schemati_core::{Viewport, snap::GRID_SIZE};

    fn diagram() -> Diagram {
        let mut d = Diagram::new();
        d.add_node(
            Node::new(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 150.0, 80.0), "Start")
                .unwrap()
                .with_id("a"),
        )
        .unwrap();
        d.add_node(
            Node::new(ShapeKind::Diamond, Rect::new(300.0, 0.0, 420.0, 100.0), "Check")
                .unwrap()
                .with_id("b"),
        )
        .unwrap();
        d.add_connection(
            Connection::new("a".into(), "b".into(), RoutingStyle::Curved)
                .unwrap()
                .with_id("ab"),
        )
        .unwrap();
        d.add_border(
            Border::new(Rect::new(-20.0, -20.0, 450.0, 130.0))
                .unwrap()
                .with_id("frame"),
        )
        .unwrap();
        d
    }

    fn kinds(scene: &Scene) -> Vec<Option<ElementKind>> {
        scene
            .groups
            .iter()
            .map(|g| g.tag.as_ref().map(|t| t.kind))
            .collect()
    }

    fn dashes(items: &[Item]) -> Vec<Option<Vec<f64>>> {
        items
            .iter()
            .filter_map(|i| i.paint.stroke.as_ref().map(|s| s.dash.clone()))
            .collect()
    }

    #[test]
    fn test_build_empty_scene() {
        let diagram = Diagram::new();
        let viewport = Viewport::default();
        let mut renderer = SceneRenderer::new();

        renderer.build_scene(&RenderContext::new(&diagram, &viewport));
        // Grid only.
        assert_eq!(renderer.scene().groups.len(), 1);
        assert_eq!(renderer.scene().background, Some(Color::WHITE));

        renderer.build_scene(&RenderContext::new(&diagram, &viewport).with_grid(false, GRID_SIZE));
        assert!(renderer.scene().is_empty());
    }

    #[test]
    fn test_frame_draw_order() {
        let diagram = diagram();
        let viewport = Viewport::default();
        let mut renderer = SceneRenderer::new();
        let ctx = RenderContext::new(&diagram, &viewport)
            .with_grid(false, GRID_SIZE)
            .with_preview(Some(Preview::Connection {
                from: Point::new(75.0, 40.0),
                to: Point::new(200.0, 200.0),
            }))
            .with_marquee(Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        renderer.build_scene(&ctx);

        assert_eq!(
            kinds(renderer.scene()),
            vec![
                Some(ElementKind::Border),
                Some(ElementKind::Connection),
                None,
                Some(ElementKind::Node),
                Some(ElementKind::Node),
                None,
            ]
        );
    }

    #[test]
    fn test_selected_node_gets_overlay() {
        let diagram = diagram();
        let viewport = Viewport::default();
        let mut selection = Selection::new();
        selection.select_only(ElementRef::node("a"));
        let mut renderer = SceneRenderer::new();
        renderer.build_scene(
            &RenderContext::new(&diagram, &viewport).with_selection(Some(&selection)),
        );

        let scene = renderer.scene();
        let nodes: Vec<&Group> = scene.tagged(ElementKind::Node).collect();
        let selected = &nodes[0].items;
        let body = selected[0].paint.stroke.as_ref().unwrap();
        assert_eq!(body.width, DEFAULT_NODE_BORDER_WIDTH + 1.0);
        assert_eq!(dashes(selected)[1], Some(vec![5.0, 3.0]));
        assert_eq!(selected[1].paint.stroke.as_ref().unwrap().color, SELECTION_COLOR);

        let plain = &nodes[1].items;
        assert_eq!(
            plain[0].paint.stroke.as_ref().unwrap().width,
            DEFAULT_NODE_BORDER_WIDTH
        );
        assert!(matches!(plain[0].primitive, Primitive::Polygon(ref p) if p.len() == 4));
        assert!(matches!(plain[1].primitive, Primitive::Text(_)));
    }

    #[test]
    fn test_export_scene_skips_selection_and_grid() {
        let diagram = diagram();
        let frame = export_frame(
            &diagram,
            Viewport::default().visible_rect(),
            &ExportOptions::default(),
        )
        .unwrap();
        let mut renderer = SceneRenderer::new();
        let scene = renderer.build_export_scene(&diagram, &frame, Some(Color::WHITE));

        assert_eq!(
            kinds(&scene),
            vec![
                Some(ElementKind::Border),
                Some(ElementKind::Connection),
                Some(ElementKind::Node),
                Some(ElementKind::Node),
            ]
        );
        let origin = scene.transform * Point::new(-20.0, -20.0);
        assert!((origin.x - 50.0).abs() < 1e-9 && (origin.y - 50.0).abs() < 1e-9);
        assert_eq!(scene.size.width, 470.0 + 100.0);
    }

    #[test]
    fn test_missing_endpoint_is_skipped() {
        let mut diagram = diagram();
        diagram.nodes.retain(|n| n.id.as_str() != "b");
        let viewport = Viewport::default();
        let mut renderer = SceneRenderer::new();
        renderer.build_scene(&RenderContext::new(&diagram, &viewport).with_grid(false, GRID_SIZE));
        assert_eq!(renderer.scene().tagged(ElementKind::Connection).count(), 0);
        assert_eq!(renderer.scene().tagged(ElementKind::Node).count(), 1);
    }

    #[test]
    fn test_guide_alpha_tracks_strength() {
        let diagram = Diagram::new();
        let viewport = Viewport::default();
        let guides = [
            SnapGuide {
                axis: GuideAxis::Vertical,
                position: 200.0,
                strength: 1.0,
            },
            SnapGuide {
                axis: GuideAxis::Horizontal,
                position: 100.0,
                strength: 0.0,
            },
        ];
        let mut renderer = SceneRenderer::new();
        renderer.build_scene(
            &RenderContext::new(&diagram, &viewport)
                .with_grid(false, GRID_SIZE)
                .with_guides(&guides),
        );

        let strokes: Vec<&StrokeStyle> = renderer
            .scene()
            .groups
            .iter()
            .filter_map(|g| g.items[0].paint.stroke.as_ref())
            .collect();
        assert_eq!(ColorRgba::from(strokes[0].color).a, 255);
        assert_eq!(strokes[0].width, 3.0);
        assert_eq!(ColorRgba::from(strokes[1].color).a, 102);
        assert_eq!(strokes[1].width, 1.5);
    }

    #[test]
    fn test_grid_bounds_snap_outward() {
        let (x0, y0, x1, y1) = grid_bounds(Rect::new(-15.0, 5.0, 41.0, 59.0), 20.0);
        assert_eq!((x0, y0, x1, y1), (-20.0, 0.0, 60.0, 60.0));
    }
}
