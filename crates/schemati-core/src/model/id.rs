use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of diagram element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Connection,
    Border,
}

impl ElementKind {
    /// Prefix used for generated ids.
    pub fn prefix(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Connection => "connection",
            ElementKind::Border => "border",
        }
    }
}

/// Opaque element identifier.
///
/// Generated ids look like `node-<uuid>`; imported ids are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id for the given element kind.
    pub fn generate(kind: ElementKind) -> Self {
        Self(format!("{}-{}", kind.prefix(), Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A typed reference to an element, as held by the selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: ElementId,
}

impl ElementRef {
    pub fn new(kind: ElementKind, id: impl Into<ElementId>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn node(id: impl Into<ElementId>) -> Self {
        Self::new(ElementKind::Node, id)
    }

    pub fn connection(id: impl Into<ElementId>) -> Self {
        Self::new(ElementKind::Connection, id)
    }

    pub fn border(id: impl Into<ElementId>) -> Self {
        Self::new(ElementKind::Border, id)
    }
}
