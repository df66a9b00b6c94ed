//! Diagram entities: nodes, connections and borders.

mod border;
mod color;
mod connection;
mod id;
mod node;

pub use border::{
    Border, BorderStyle, DEFAULT_BORDER_COLOR, DEFAULT_BORDER_LINE_WIDTH, ResolvedBorderStyle,
};
pub use color::{ColorRgba, CssColor};
pub use connection::{
    ArrowStyle, Connection, ConnectionStyle, LineStyle, ResolvedConnectionStyle, RoutingStyle,
};
pub use id::{ElementId, ElementKind, ElementRef};
pub use node::{
    DEFAULT_NODE_BORDER_WIDTH, DEFAULT_NODE_COLOR, DEFAULT_NODE_CORNER_RADIUS, Node, NodeSizePreset,
    NodeStyle, ResolvedNodeStyle, Shadow, TextAlign,
};

use thiserror::Error;

/// Validation failures raised when an entity is created or updated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{what} must be positive, got {value}")]
    NonPositiveDimension { what: &'static str, value: f64 },
    #[error("{what} must be finite, got {value}")]
    NonFiniteCoordinate { what: &'static str, value: f64 },
    #[error("element id must not be empty")]
    EmptyId,
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
    #[error("connection {0} starts and ends at the same node")]
    SelfLoop(ElementId),
    #[error("connection {connection} references missing node {node}")]
    DanglingReference {
        connection: ElementId,
        node: ElementId,
    },
    #[error("element not found: {0}")]
    NotFound(ElementId),
}

/// Result type for model validation.
pub type ModelResult<T> = Result<T, ModelError>;

/// Every violation found by a whole-diagram check. Never empty.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} problem(s): {}", .0.len(), join_problems(.0))]
pub struct ValidationReport(pub Vec<ModelError>);

impl ValidationReport {
    pub fn problems(&self) -> &[ModelError] {
        &self.0
    }
}

fn join_problems(problems: &[ModelError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn check_finite(what: &'static str, value: f64) -> ModelResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::NonFiniteCoordinate { what, value })
    }
}

pub(crate) fn check_positive(what: &'static str, value: f64) -> ModelResult<()> {
    check_finite(what, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::NonPositiveDimension { what, value })
    }
}

/// Validate a top-left/size rectangle as used by nodes and borders.
pub(crate) fn check_rect(x: f64, y: f64, width: f64, height: f64) -> ModelResult<()> {
    check_finite("x", x)?;
    check_finite("y", y)?;
    check_positive("width", width)?;
    check_positive("height", height)
}
