//! Renderer trait abstraction.

use kurbo::Rect;
use peniko::Color;
use schemati_core::interaction::{Editor, Preview};
use schemati_core::snap::{GRID_SIZE, SnapGuide};
use schemati_core::{Diagram, Selection, Viewport};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("SVG parse failed: {0}")]
    Svg(#[from] usvg::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Selection highlight blue, shared by overlays, marquee and guides.
pub const SELECTION_COLOR: Color = Color::from_rgba8(59, 130, 246, 255);

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The diagram to render.
    pub diagram: &'a Diagram,
    /// Pan, zoom and surface size.
    pub viewport: &'a Viewport,
    /// Elements drawn with selection styling.
    pub selection: Option<&'a Selection>,
    /// Background color.
    pub background_color: Color,
    /// Whether to draw the grid.
    pub show_grid: bool,
    /// Grid spacing in logical units.
    pub grid_size: f64,
    /// Active alignment guides.
    pub guides: &'a [SnapGuide],
    /// Creation preview (node, border or connection).
    pub preview: Option<Preview>,
    /// Selection rectangle (marquee) in logical coordinates.
    pub marquee: Option<Rect>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(diagram: &'a Diagram, viewport: &'a Viewport) -> Self {
        Self {
            diagram,
            viewport,
            selection: None,
            background_color: Color::WHITE,
            show_grid: true,
            grid_size: GRID_SIZE,
            guides: &[],
            preview: None,
            marquee: None,
        }
    }

    /// Everything the editor currently shows on top of the diagram.
    pub fn from_editor(diagram: &'a Diagram, editor: &'a Editor) -> Self {
        Self::new(diagram, &editor.viewport)
            .with_selection(Some(&editor.selection))
            .with_grid(editor.config.grid_enabled, editor.config.grid_size)
            .with_guides(editor.guides())
            .with_preview(editor.preview(diagram))
            .with_marquee(editor.marquee())
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set grid visibility and spacing.
    pub fn with_grid(mut self, enabled: bool, size: f64) -> Self {
        self.show_grid = enabled;
        self.grid_size = size;
        self
    }

    pub fn with_selection(mut self, selection: Option<&'a Selection>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_guides(mut self, guides: &'a [SnapGuide]) -> Self {
        self.guides = guides;
        self
    }

    pub fn with_preview(mut self, preview: Option<Preview>) -> Self {
        self.preview = preview;
        self
    }

    /// Set the selection rectangle.
    pub fn with_marquee(mut self, rect: Option<Rect>) -> Self {
        self.marquee = rect;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the display list for a frame.
    ///
    /// Called once per frame; must not mutate the diagram.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
