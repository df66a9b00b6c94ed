//! Command surface exposed to the host shell.

use crate::export::{ExportOptions, ExportResult, export_raster, export_vector};
use schemati_core::arrange::{AlignDirection, DistributeDirection, ZOrderAction};
use schemati_core::{ChangeSink, Diagram, Editor};
use std::path::PathBuf;

/// Export and bulk-edit commands over a diagram snapshot.
///
/// Edits are committed through `sink`; `diagram` is never mutated.
pub struct DiagramCommands<'a, S: ChangeSink> {
    diagram: &'a Diagram,
    editor: &'a Editor,
    sink: &'a mut S,
}

impl<'a, S: ChangeSink> DiagramCommands<'a, S> {
    pub fn new(diagram: &'a Diagram, editor: &'a Editor, sink: &'a mut S) -> Self {
        Self {
            diagram,
            editor,
            sink,
        }
    }

    /// Write a PNG. `Ok(None)` when there is nothing to export.
    pub fn export_raster(
        &self,
        filename: &str,
        transparent_background: bool,
        crop_to_content: bool,
        padding: f64,
        scale: f64,
    ) -> ExportResult<Option<PathBuf>> {
        let options = ExportOptions {
            filename: filename.to_string(),
            transparent_background,
            crop_to_content,
            padding,
            scale,
        };
        export_raster(self.diagram, self.editor.viewport.visible_rect(), &options)
    }

    /// Write an SVG. `Ok(None)` when there is nothing to export.
    pub fn export_vector(
        &self,
        filename: &str,
        crop_to_content: bool,
        padding: f64,
    ) -> ExportResult<Option<PathBuf>> {
        let options = ExportOptions {
            filename: filename.to_string(),
            crop_to_content,
            padding,
            ..Default::default()
        };
        export_vector(self.diagram, self.editor.viewport.visible_rect(), &options)
    }

    /// Returns false when fewer than two nodes are selected.
    pub fn align_selected_elements(&mut self, direction: AlignDirection) -> bool {
        self.editor.align_selected(direction, self.diagram, &mut *self.sink)
    }

    /// Returns false when fewer than three nodes are selected.
    pub fn distribute_selected_elements(&mut self, direction: DistributeDirection) -> bool {
        self.editor
            .distribute_selected(direction, self.diagram, &mut *self.sink)
    }

    /// Returns false when the selection is empty.
    pub fn change_z_order(&mut self, action: ZOrderAction) -> bool {
        self.editor.change_z_order(action, self.diagram, &mut *self.sink)
    }
}
