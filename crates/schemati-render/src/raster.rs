//! Raster output: the SVG of a scene rendered with resvg, encoded as PNG.

use crate::renderer::{RenderResult, RendererError};
use crate::scene::Scene;
use crate::vector::to_svg_string;
use std::sync::{Arc, OnceLock};
use tiny_skia::Pixmap;

/// System fonts, loaded once per process.
fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            log::debug!("loaded {} font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Render a scene into a pixmap of `scene.size` pixels.
pub fn rasterize(scene: &Scene) -> RenderResult<Pixmap> {
    let width = scene.size.width.round();
    let height = scene.size.height.round();
    let invalid = || RendererError::InvalidSize {
        width: scene.size.width,
        height: scene.size.height,
    };
    if !(width >= 1.0 && height >= 1.0) {
        return Err(invalid());
    }
    let mut pixmap = Pixmap::new(width as u32, height as u32).ok_or_else(invalid)?;

    let svg = to_svg_string(scene);
    let mut options = usvg::Options::default();
    options.fontdb = font_database();
    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)?;

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Encode a pixmap as 8-bit RGBA PNG.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, png::EncodingError> {
    // Pixmap data is premultiplied; PNG wants straight alpha.
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let mut png_data = Vec::new();
    let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgba)?;
    writer.finish()?;
    Ok(png_data)
}
