//! Schemati Render Library
//!
//! Turns a diagram into a backend-agnostic [`Scene`], then into SVG
//! documents or PNG images.

pub mod commands;
pub mod export;
pub mod pipeline;
pub mod raster;
mod renderer;
pub mod scene;
pub mod vector;
pub mod text;

pub use commands::DiagramCommands;
pub use export::{ExportError, ExportFrame, ExportOptions, ExportResult};
pub use pipeline::SceneRenderer;
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, SELECTION_COLOR};
pub use scene::Scene;
pub use text::{ApproximateMetrics, TextMeasure};
