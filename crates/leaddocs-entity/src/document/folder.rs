//! Folder model.

use chrono::{DateTime, Utc};
use leaddocs_core::types::{FileId, FolderId};
use serde::{Deserialize, Serialize};

use super::file::FileEntry;

/// A folder in a lead's document tree.
///
/// `file_count` and `total_size` describe this folder's own `files` only;
/// content of nested subfolders is not rolled up into them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// When the folder was created, if the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Files directly inside this folder.
    #[serde(default)]
    pub files: Vec<FileEntry>,
    /// Child folders.
    #[serde(default)]
    pub subfolders: Vec<Folder>,
    /// Number of entries in `files`.
    #[serde(default)]
    pub file_count: u64,
    /// Sum of `size` over `files`, in bytes.
    #[serde(default)]
    pub total_size: u64,
}

impl Folder {
    /// Create an empty folder.
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: None,
            files: Vec::new(),
            subfolders: Vec::new(),
            file_count: 0,
            total_size: 0,
        }
    }

    /// Add a file and bump the local counters.
    pub fn with_file(mut self, file: FileEntry) -> Self {
        self.file_count += 1;
        self.total_size += file.size;
        self.files.push(file);
        self
    }

    /// Add a child folder.
    pub fn with_subfolder(mut self, folder: Folder) -> Self {
        self.subfolders.push(folder);
        self
    }

    /// Depth-first search for a folder by id, starting with this one.
    pub fn find_folder(&self, id: &FolderId) -> Option<&Folder> {
        if &self.id == id {
            return Some(self);
        }
        self.subfolders.iter().find_map(|sub| sub.find_folder(id))
    }

    /// Depth-first search for a file by id in this folder and below.
    pub fn find_file(&self, id: &FileId) -> Option<&FileEntry> {
        self.files
            .iter()
            .find(|f| &f.id == id)
            .or_else(|| self.subfolders.iter().find_map(|sub| sub.find_file(id)))
    }

    /// Number of folders below this one (not counting itself).
    pub fn descendant_count(&self) -> u64 {
        self.subfolders
            .iter()
            .map(|sub| 1 + sub.descendant_count())
            .sum()
    }

    /// Files in this folder and every descendant, depth-first.
    pub fn all_files(&self) -> Vec<&FileEntry> {
        let mut out: Vec<&FileEntry> = self.files.iter().collect();
        for sub in &self.subfolders {
            out.extend(sub.all_files());
        }
        out
    }
}
