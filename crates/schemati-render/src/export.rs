//! PNG and SVG export.

use crate::pipeline::SceneRenderer;
use crate::raster::{encode_png, rasterize};
use crate::renderer::RendererError;
use crate::scene::Scene;
use crate::vector::to_svg_string;
use kurbo::{Affine, Rect, Size};
use peniko::Color;
use schemati_core::Diagram;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_FILENAME: &str = "schemati-diagram";
pub const MIN_EXPORT_SCALE: f64 = 0.5;
pub const MAX_EXPORT_SCALE: f64 = 4.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("render failed: {0}")]
    Render(#[from] RendererError),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Export settings. Partial JSON fills the rest from defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    pub filename: String,
    pub transparent_background: bool,
    pub crop_to_content: bool,
    /// Logical units around the content when cropping.
    pub padding: f64,
    pub scale: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            transparent_background: false,
            crop_to_content: true,
            padding: 50.0,
            scale: 1.0,
        }
    }
}

impl ExportOptions {
    pub fn clamped_scale(&self) -> f64 {
        self.scale.clamp(MIN_EXPORT_SCALE, MAX_EXPORT_SCALE)
    }

    /// `filename` with `extension` appended unless it already ends with it.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        let suffix = format!(".{extension}");
        if self.filename.to_ascii_lowercase().ends_with(&suffix) {
            PathBuf::from(&self.filename)
        } else {
            PathBuf::from(format!("{}{suffix}", self.filename))
        }
    }

    fn background(&self) -> Option<Color> {
        (!self.transparent_background).then_some(Color::WHITE)
    }
}

/// The logical region being exported and its pixel scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportFrame {
    pub bounds: Rect,
    pub scale: f64,
}

impl ExportFrame {
    /// Output surface size in pixels.
    pub fn size(&self) -> Size {
        Size::new(
            (self.bounds.width() * self.scale).round(),
            (self.bounds.height() * self.scale).round(),
        )
    }

    /// Logical to surface transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale) * Affine::translate((-self.bounds.x0, -self.bounds.y0))
    }
}

/// Region to export: padded content bounds when cropping, else the
/// visible area. `None` when there is nothing to draw onto.
pub fn export_frame(diagram: &Diagram, visible: Rect, options: &ExportOptions) -> Option<ExportFrame> {
    let bounds = if options.crop_to_content {
        diagram
            .content_bounds()?
            .inflate(options.padding, options.padding)
    } else {
        visible
    };
    let frame = ExportFrame {
        bounds,
        scale: options.clamped_scale(),
    };
    let size = frame.size();
    (size.width >= 1.0 && size.height >= 1.0).then_some(frame)
}

fn export_scene(diagram: &Diagram, visible: Rect, options: &ExportOptions) -> Option<Scene> {
    let Some(frame) = export_frame(diagram, visible, options) else {
        log::warn!("nothing to export: no content or zero-sized output");
        return None;
    };
    Some(SceneRenderer::new().build_export_scene(diagram, &frame, options.background()))
}

/// Encode the diagram as PNG bytes.
pub fn render_png(diagram: &Diagram, visible: Rect, options: &ExportOptions) -> ExportResult<Option<Vec<u8>>> {
    let Some(scene) = export_scene(diagram, visible, options) else {
        return Ok(None);
    };
    let pixmap = rasterize(&scene)?;
    Ok(Some(encode_png(&pixmap)?))
}

/// Serialize the diagram as a standalone SVG document. Scale is fixed at 1.
pub fn render_svg(diagram: &Diagram, visible: Rect, options: &ExportOptions) -> Option<String> {
    let options = ExportOptions {
        scale: 1.0,
        ..options.clone()
    };
    export_scene(diagram, visible, &options).map(|scene| to_svg_string(&scene))
}

/// Write a PNG to `options.filename` (".png" appended when missing).
pub fn export_raster(diagram: &Diagram, visible: Rect, options: &ExportOptions) -> ExportResult<Option<PathBuf>> {
    let Some(bytes) = render_png(diagram, visible, options)? else {
        return Ok(None);
    };
    let path = options.output_path("png");
    write_file(&path, &bytes)?;
    log::info!("exported PNG to {} ({} bytes)", path.display(), bytes.len());
    Ok(Some(path))
}

/// Write an SVG to `options.filename` (".svg" appended when missing).
pub fn export_vector(diagram: &Diagram, visible: Rect, options: &ExportOptions) -> ExportResult<Option<PathBuf>> {
    let Some(svg) = render_svg(diagram, visible, options) else {
        return Ok(None);
    };
    let path = options.output_path("svg");
    write_file(&path, svg.as_bytes())?;
    log::info!("exported SVG to {}", path.display());
    Ok(Some(path))
}

fn write_file(path: &Path, bytes: &[u8]) -> ExportResult<()> {
    std::fs::write(path, bytes).map_err(|source| {
        log::error!("failed to write {}: {source}", path.display());
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemati_core::geometry::ShapeKind;
    use schemati_core::model::{Border, Node};

    fn diagram() -> Diagram {
        let mut d = Diagram::new();
        d.add_node(
            Node::new(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 150.0, 80.0), "Start")
                .unwrap()
                .with_id("a"),
        )
        .unwrap();
        d.add_border(Border::new(Rect::new(200.0, 100.0, 300.0, 200.0)).unwrap())
            .unwrap();
        d
    }

    #[test]
    fn test_frame_crops_to_padded_content() {
        let options = ExportOptions {
            scale: 2.0,
            ..Default::default()
        };
        let frame = export_frame(&diagram(), Rect::ZERO, &options).unwrap();
        assert_eq!(frame.bounds, Rect::new(-50.0, -50.0, 350.0, 250.0));
        assert_eq!(frame.size(), Size::new(800.0, 600.0));
        let origin = frame.transform() * kurbo::Point::new(0.0, 0.0);
        assert_eq!(origin, kurbo::Point::new(100.0, 100.0));
    }

    #[test]
    fn test_frame_without_crop_uses_visible_area() {
        let options = ExportOptions {
            crop_to_content: false,
            ..Default::default()
        };
        let visible = Rect::new(10.0, 20.0, 650.0, 420.0);
        let frame = export_frame(&Diagram::new(), visible, &options).unwrap();
        assert_eq!(frame.bounds, visible);
        assert_eq!(frame.size(), Size::new(640.0, 400.0));
    }

    #[test]
    fn test_empty_crop_is_noop() {
        assert!(export_frame(&Diagram::new(), Rect::new(0.0, 0.0, 100.0, 100.0), &ExportOptions::default()).is_none());
        let none = render_png(&Diagram::new(), Rect::ZERO, &ExportOptions::default()).unwrap();
        assert!(none.is_none());
        let zero = ExportOptions {
            crop_to_content: false,
            ..Default::default()
        };
        assert!(render_svg(&diagram(), Rect::ZERO, &zero).is_none());
    }

    #[test]
    fn test_scale_clamped_and_extension_appended() {
        let mut options = ExportOptions {
            scale: 10.0,
            ..Default::default()
        };
        assert_eq!(options.clamped_scale(), MAX_EXPORT_SCALE);
        options.scale = 0.1;
        assert_eq!(options.clamped_scale(), MIN_EXPORT_SCALE);
        assert_eq!(options.output_path("png"), PathBuf::from("schemati-diagram.png"));
        options.filename = "flow.PNG".into();
        assert_eq!(options.output_path("png"), PathBuf::from("flow.PNG"));
    }

    #[test]
    fn test_partial_options_json() {
        let options: ExportOptions =
            serde_json::from_str(r#"{"padding": 10, "transparentBackground": true}"#).unwrap();
        assert_eq!(options.padding, 10.0);
        assert!(options.transparent_background);
        assert!(options.crop_to_content);
        assert_eq!(options.filename, DEFAULT_FILENAME);
    }

    #[test]
    fn test_export_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            filename: dir.path().join("out").to_string_lossy().into_owned(),
            ..Default::default()
        };
        let png = export_raster(&diagram(), Rect::ZERO, &options).unwrap().unwrap();
        assert_eq!(png, dir.path().join("out.png"));
        let bytes = std::fs::read(&png).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let svg = export_vector(&diagram(), Rect::ZERO, &options).unwrap().unwrap();
        let text = std::fs::read_to_string(svg).unwrap();
        assert!(text.starts_with("<svg"));
        assert!(text.contains(r#"data-id="a""#));
    }

    #[test]
    fn test_io_error_reported() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            filename: dir.path().join("missing").join("out").to_string_lossy().into_owned(),
            ..Default::default()
        };
        let err = export_vector(&diagram(), Rect::ZERO, &options).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
