//! File entry model.

use chrono::{DateTime, Utc};
use leaddocs_core::types::FileId;
use serde::{Deserialize, Serialize};

/// A file stored for a lead, either at the root of the tree or inside a
/// folder. Ownership is by containment; entries carry no parent reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Unique file identifier.
    pub id: FileId,
    /// The file name (including extension).
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
    /// MIME type reported by the server, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileEntry {
    /// Create an entry stamped with the current time.
    pub fn new(id: impl Into<FileId>, name: impl Into<String>, size: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size,
            uploaded_at: Utc::now(),
            mime_type: None,
        }
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}
