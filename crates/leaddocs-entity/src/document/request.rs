//! Request payloads sent to the Documents API.

use bytes::Bytes;
use leaddocs_core::types::{FileId, FolderId};
use serde::{Deserialize, Serialize};

/// Request to create a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder (None for root level).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FolderId>,
}

impl CreateFolderRequest {
    /// Request a root-level folder.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
        }
    }

    /// Request a folder nested under `parent_id`.
    pub fn nested(name: impl Into<String>, parent_id: impl Into<FolderId>) -> Self {
        Self {
            name: name.into(),
            parent_id: Some(parent_id.into()),
        }
    }
}

/// One file to upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// File name as it should appear in the tree.
    pub name: String,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// File content.
    pub content: Bytes,
}

impl UploadFile {
    /// Create an upload from raw bytes.
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            content: content.into(),
        }
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Request to upload files into a folder or the root.
#[derive(Debug, Clone, Default)]
pub struct UploadFilesRequest {
    /// Target folder (None for root level).
    pub folder_id: Option<FolderId>,
    /// Files to upload.
    pub files: Vec<UploadFile>,
}

/// Request to relocate a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFileRequest {
    /// The file to move.
    pub file_id: FileId,
    /// Destination folder (None for root level).
    #[serde(default)]
    pub target_folder_id: Option<FolderId>,
}
