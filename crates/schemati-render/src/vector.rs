//! Standalone SVG documents from a [`Scene`].
//!
//! Element groups carry their logical bounds as `data-*` attributes so a
//! document can be mapped back onto the diagram it came from.

use crate::scene::{DropShadow, Item, Paint, Primitive, Scene, TextAnchor};
use kurbo::{Affine, Point};
use peniko::Color;
use schemati_core::model::{ColorRgba, ElementKind};
use svg::node::Value;
use svg::{Document, Node, node::element as svg_element};

/// Attach a list of attributes to any element type.
macro_rules! with_attributes {
    ($element:expr, $attributes:expr) => {{
        let mut element = $element;
        for (name, value) in $attributes {
            element = element.set(name, value);
        }
        element
    }};
}

type Attributes = Vec<(&'static str, Value)>;

pub fn scene_to_document(scene: &Scene) -> Document {
    let (width, height) = (scene.size.width, scene.size.height);
    let mut doc = Document::new()
        .set("viewBox", format!("0 0 {width} {height}"))
        .set("width", width)
        .set("height", height);

    if let Some(background) = scene.background {
        doc = doc.add(with_attributes!(
            svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height),
            fill_attributes(background)
        ));
    }

    let mut defs = svg_element::Definitions::new();
    let mut filter_count = 0usize;
    let mut root = svg_element::Group::new().set("transform", matrix(scene.transform));

    for group in &scene.groups {
        let mut element = svg_element::Group::new();
        if let Some(tag) = &group.tag {
            element = element
                .set("class", kind_class(tag.kind))
                .set("data-id", tag.id.as_str())
                .set("data-x", tag.bounds.x0)
                .set("data-y", tag.bounds.y0)
                .set("data-width", tag.bounds.width())
                .set("data-height", tag.bounds.height());
        }
        for item in &group.items {
            let filter = item.paint.shadow.as_ref().map(|shadow| {
                let id = format!("shadow-{filter_count}");
                filter_count += 1;
                defs.append(shadow_filter(&id, shadow));
                id
            });
            element = element.add(item_node(item, filter.as_deref()));
        }
        root = root.add(element);
    }

    if filter_count > 0 {
        doc = doc.add(defs);
    }
    doc.add(root)
}

pub fn to_svg_string(scene: &Scene) -> String {
    scene_to_document(scene).to_string()
}

fn item_node(item: &Item, filter: Option<&str>) -> Box<dyn Node> {
    let mut attributes = paint_attributes(&item.paint);
    if let Some(id) = filter {
        attributes.push(("filter", format!("url(#{id})").into()));
    }

    match &item.primitive {
        Primitive::Rect { rect, radius } => {
            let mut element = svg_element::Rectangle::new()
                .set("x", rect.x0)
                .set("y", rect.y0)
                .set("width", rect.width())
                .set("height", rect.height());
            if *radius > 0.0 {
                element = element.set("rx", *radius).set("ry", *radius);
            }
            Box::new(with_attributes!(element, attributes))
        }
        Primitive::Ellipse { center, radii } => Box::new(with_attributes!(
            svg_element::Ellipse::new()
                .set("cx", center.x)
                .set("cy", center.y)
                .set("rx", radii.x)
                .set("ry", radii.y),
            attributes
        )),
        Primitive::Polygon(points) => Box::new(with_attributes!(
            svg_element::Polygon::new().set("points", points_value(points)),
            attributes
        )),
        Primitive::Polyline(points) => Box::new(with_attributes!(
            svg_element::Polyline::new().set("points", points_value(points)),
            attributes
        )),
        Primitive::Path(path) => Box::new(with_attributes!(
            svg_element::Path::new().set("d", path.to_svg()),
            attributes
        )),
        Primitive::Text(run) => {
            let anchor = match run.anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let text = svg_element::Text::new(run.text.clone())
                .set("x", run.position.x)
                .set("y", run.position.y)
                .set("text-anchor", anchor)
                .set("dominant-baseline", "central")
                .set("font-size", run.font_size)
                .set("font-family", run.font_family.clone())
                .set("font-weight", run.font_weight.clone());
            Box::new(with_attributes!(
                with_attributes!(text, fill_attributes(run.color)),
                attributes.into_iter().filter(|(name, _)| *name != "fill")
            ))
        }
    }
}

fn paint_attributes(paint: &Paint) -> Attributes {
    let mut attributes = match paint.fill {
        Some(color) => fill_attributes(color),
        None => vec![("fill", "none".into())],
    };
    if let Some(stroke) = &paint.stroke {
        let rgba = ColorRgba::from(stroke.color);
        attributes.push(("stroke", rgba.to_hex().into()));
        if rgba.a < 255 {
            attributes.push(("stroke-opacity", rgba.alpha().into()));
        }
        attributes.push(("stroke-width", stroke.width.into()));
        if let Some(dash) = &stroke.dash {
            let pattern: Vec<String> = dash.iter().map(f64::to_string).collect();
            attributes.push(("stroke-dasharray", pattern.join(",").into()));
        }
        if stroke.round {
            attributes.push(("stroke-linecap", "round".into()));
            attributes.push(("stroke-linejoin", "round".into()));
        }
    }
    if paint.opacity < 1.0 {
        attributes.push(("opacity", paint.opacity.into()));
    }
    attributes
}

fn fill_attributes(color: Color) -> Attributes {
    let rgba = ColorRgba::from(color);
    let mut attributes: Attributes = vec![("fill", rgba.to_hex().into())];
    if rgba.a < 255 {
        attributes.push(("fill-opacity", rgba.alpha().into()));
    }
    attributes
}

fn shadow_filter(id: &str, shadow: &DropShadow) -> svg_element::Filter {
    let rgba = ColorRgba::from(shadow.color);
    svg_element::Filter::new()
        .set("id", id)
        .set("x", "-50%")
        .set("y", "-50%")
        .set("width", "200%")
        .set("height", "200%")
        .add(
            svg_element::FilterEffectDropShadow::new()
                .set("dx", shadow.offset.x)
                .set("dy", shadow.offset.y)
                // Canvas blur radius is roughly twice the Gaussian deviation.
                .set("stdDeviation", shadow.blur / 2.0)
                .set("flood-color", rgba.to_hex())
                .set("flood-opacity", rgba.alpha()),
        )
}

fn kind_class(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Node => "node",
        ElementKind::Connection => "connection",
        ElementKind::Border => "border",
    }
}

fn matrix(transform: Affine) -> String {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

fn points_value(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportOptions, render_svg};
    use kurbo::Rect;
    use proptest::prelude::*;
    use schemati_core::Diagram;
    use schemati_core::geometry::ShapeKind;
    use schemati_core::model::{Connection, Node, RoutingStyle};

    fn attribute(svg: &str, id: &str, name: &str) -> f64 {
        let marker = svg.find(&format!(r#"data-id="{id}""#)).unwrap();
        let open = svg[..marker].rfind('<').unwrap();
        let close = marker + svg[marker..].find('>').unwrap();
        let group = &svg[open..close];
        let key = format!(r#"{name}=""#);
        let start = group.find(&key).unwrap() + key.len();
        let len = group[start..].find('"').unwrap();
        group[start..start + len].parse().unwrap()
    }

    fn diagram() -> Diagram {
        let mut d = Diagram::new();
        d.add_node(
            Node::new(ShapeKind::Circle, Rect::new(10.0, 20.0, 110.0, 120.0), "Hub")
                .unwrap()
                .with_id("hub"),
        )
        .unwrap();
        d.add_node(
            Node::new(ShapeKind::Diamond, Rect::new(300.0, 40.0, 420.0, 140.0), "Fork")
                .unwrap()
                .with_id("fork"),
        )
        .unwrap();
        d.add_connection(
            Connection::new("hub".into(), "fork".into(), RoutingStyle::Orthogonal)
                .unwrap()
                .with_id("c1"),
        )
        .unwrap();
        d
    }

    #[test]
    fn test_scene_document_frame() {
        let mut scene = Scene::new(kurbo::Size::new(40.0, 20.0), Affine::scale(2.0));
        scene.push(
            Primitive::Rect {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                radius: 4.0,
            },
            Paint::fill(Color::from_rgba8(255, 0, 0, 255)),
        );
        let svg = scene_to_document(&scene).to_string();
        assert!(svg.contains(r#"viewBox="0 0 40 20""#));
        assert!(svg.contains(r#"transform="matrix(2 0 0 2 0 0)""#));
        assert!(svg.contains(r#"rx="4""#));
        assert!(!svg.contains("<defs"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn test_document_elements() {
        let svg = render_svg(&diagram(), Rect::ZERO, &ExportOptions::default()).unwrap();
        assert!(svg.contains("<ellipse"));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("<text"));
        assert!(svg.contains("feDropShadow"));
        assert!(svg.contains(r#"class="connection""#));
    }

    #[test]
    fn test_transparent_background_has_no_backdrop() {
        let options = ExportOptions {
            transparent_background: true,
            ..Default::default()
        };
        let svg = render_svg(&diagram(), Rect::ZERO, &options).unwrap();
        let opaque = render_svg(&diagram(), Rect::ZERO, &ExportOptions::default()).unwrap();
        assert!(opaque.matches("<rect").count() > svg.matches("<rect").count());
    }

    #[test]
    fn test_dash_and_caps() {
        let mut d = diagram();
        d.connections[0].stroke.line_style = Some(schemati_core::model::LineStyle::Dashed);
        let svg = render_svg(&d, Rect::ZERO, &ExportOptions::default()).unwrap();
        assert!(svg.contains(r#"stroke-dasharray="8,4""#));
        assert!(svg.contains(r#"stroke-linecap="round""#));
    }

    proptest! {
        #[test]
        fn prop_node_coordinates_round_trip(
            x in -5000.0f64..5000.0,
            y in -5000.0f64..5000.0,
            w in 20.0f64..800.0,
            h in 20.0f64..800.0,
        ) {
            let mut d = Diagram::new();
            d.add_node(
                Node::new(ShapeKind::Rectangle, Rect::new(x, y, x + w, y + h), "n")
                    .unwrap()
                    .with_id("n"),
            )
            .unwrap();
            let svg = render_svg(&d, Rect::ZERO, &ExportOptions::default()).unwrap();
            prop_assert!((attribute(&svg, "n", "data-x") - x).abs() < 1e-3);
            prop_assert!((attribute(&svg, "n", "data-y") - y).abs() < 1e-3);
            prop_assert!((attribute(&svg, "n", "data-width") - w).abs() < 1e-3);
            prop_assert!((attribute(&svg, "n", "data-height") - h).abs() < 1e-3);
        }
    }
}
