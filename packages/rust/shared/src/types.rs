//! Core domain types for loaded Markdown documents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied key/value annotations attached verbatim to documents.
pub type Metadata = HashMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// One unit of loaded text, ready for an indexing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier. The file path in single-document mode,
    /// a UUID v7 string otherwise.
    pub id: String,
    /// Textual content.
    pub text: String,
    /// Metadata copied from the caller's `extra_info`.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Create a document with an explicit identifier.
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }

    /// Create a document with a freshly generated, time-sortable identifier.
    pub fn with_generated_id(text: impl Into<String>, metadata: Metadata) -> Self {
        Self::new(Uuid::now_v7().to_string(), text, metadata)
    }
}
