//! Editor tuning values and the default styles supplied by the property panel.

use crate::geometry::{BORDER_HIT_THRESHOLD, HIT_THRESHOLD, ShapeKind};
use crate::model::{BorderStyle, ConnectionStyle, NodeSizePreset, NodeStyle, RoutingStyle};
use crate::snap::{GRID_SIZE, SNAP_LOCK_FRACTION, SNAP_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Interaction tuning. Every field has a default, so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Magnetic snap distance in logical units.
    pub snap_threshold: f64,
    /// Fraction of the threshold inside which a snap lands exactly.
    pub snap_lock_fraction: f64,
    pub magnetic_snap: bool,
    /// Keep dragged nodes inside the visible area.
    pub clamp_to_viewport: bool,
    pub connection_hit_threshold: f64,
    pub border_hit_threshold: f64,
    pub grid_enabled: bool,
    pub grid_size: f64,
    /// New nodes must be strictly larger than this on both sides.
    pub min_node_size: f64,
    /// New borders must be strictly larger than this on both sides.
    pub min_border_size: f64,
    /// Offset applied to pasted and duplicated nodes.
    pub paste_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            snap_lock_fraction: SNAP_LOCK_FRACTION,
            magnetic_snap: true,
            clamp_to_viewport: true,
            connection_hit_threshold: HIT_THRESHOLD,
            border_hit_threshold: BORDER_HIT_THRESHOLD,
            grid_enabled: false,
            grid_size: GRID_SIZE,
            min_node_size: 20.0,
            min_border_size: 10.0,
            paste_offset: 50.0,
        }
    }
}

/// Style values applied to newly created elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleDefaults {
    pub node_shape: ShapeKind,
    pub node_size: NodeSizePreset,
    pub node: NodeStyle,
    pub connection_routing: RoutingStyle,
    pub connection: ConnectionStyle,
    pub border: BorderStyle,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            node_shape: ShapeKind::Rectangle,
            node_size: NodeSizePreset::Medium,
            node: NodeStyle::default(),
            connection_routing: RoutingStyle::Curved,
            connection: ConnectionStyle::default(),
            border: BorderStyle::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"snap_threshold": 20.0, "grid_enabled": true}"#).unwrap();
        assert!((config.snap_threshold - 20.0).abs() < f64::EPSILON);
        assert!(config.grid_enabled);
        assert!((config.connection_hit_threshold - HIT_THRESHOLD).abs() < f64::EPSILON);
    }

    #[test]
    fn test_style_defaults_from_panel_json() {
        let json = r##"{"nodeShape":"circle","connectionRouting":"straight","node":{"backgroundColor":"#fef3c7"}}"##;
        let defaults: StyleDefaults = serde_json::from_str(json).unwrap();
        assert_eq!(defaults.node_shape, ShapeKind::Circle);
        assert_eq!(defaults.connection_routing, RoutingStyle::Straight);
        assert_eq!(defaults.node.background_color.as_ref().map(|c| c.as_str()), Some("#fef3c7"));
    }
}
