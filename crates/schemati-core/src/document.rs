//! JSON document format for saving and loading diagrams.

use crate::diagram::Diagram;
use crate::model::{Border, Connection, Node, ValidationReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DOCUMENT_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid diagram: {0}")]
    Invalid(#[from] ValidationReport),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub version: String,
    pub created: DateTime<Utc>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            created: Utc::now(),
        }
    }
}

/// On-disk representation. `borders` and `metadata` may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub borders: Vec<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
}

impl DiagramDocument {
    /// Snapshot a diagram, stamped with the current time.
    pub fn from_diagram(diagram: &Diagram) -> Self {
        Self {
            nodes: diagram.nodes.clone(),
            connections: diagram.connections.clone(),
            borders: diagram.borders.clone(),
            metadata: Some(DocumentMetadata::default()),
        }
    }

    /// Validate and convert into a diagram.
    pub fn into_diagram(self) -> DocumentResult<Diagram> {
        let diagram = Diagram {
            nodes: self.nodes,
            connections: self.connections,
            borders: self.borders,
        };
        diagram.validate()?;
        Ok(diagram)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parse and validate a document. The caller's current diagram is untouched on error.
pub fn import_json(json: &str) -> DocumentResult<Diagram> {
    let diagram = DiagramDocument::from_json(json)?.into_diagram()?;
    log::debug!(
        "imported {} nodes, {} connections, {} borders",
        diagram.nodes.len(),
        diagram.connections.len(),
        diagram.borders.len()
    );
    Ok(diagram)
}

pub fn export_json(diagram: &Diagram) -> DocumentResult<String> {
    DiagramDocument::from_diagram(diagram).to_json()
}

pub fn load(path: impl AsRef<Path>) -> DocumentResult<Diagram> {
    let json = std::fs::read_to_string(path.as_ref())?;
    import_json(&json)
}

pub fn save(diagram: &Diagram, path: impl AsRef<Path>) -> DocumentResult<()> {
    std::fs::write(path.as_ref(), export_json(diagram)?)?;
    Ok(())
}
