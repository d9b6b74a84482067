//! Document tree root.

use leaddocs_core::types::{FileId, FolderId};
use serde::{Deserialize, Serialize};

use super::file::FileEntry;
use super::folder::Folder;

/// The full document hierarchy of one lead.
///
/// `total_files`, `total_folders` and `total_size` count the whole tree at
/// every depth and are maintained independently of the per-folder counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStructure {
    /// Root-level files.
    #[serde(default)]
    pub files: Vec<FileEntry>,
    /// Root-level folders.
    #[serde(default)]
    pub folders: Vec<Folder>,
    /// Number of files in the whole tree.
    #[serde(default)]
    pub total_files: u64,
    /// Number of folders in the whole tree.
    #[serde(default)]
    pub total_folders: u64,
    /// Bytes across the whole tree.
    #[serde(default)]
    pub total_size: u64,
}

impl DocumentStructure {
    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Depth-first search for a folder by id.
    pub fn find_folder(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find_map(|f| f.find_folder(id))
    }

    /// Search root files first, then every folder depth-first.
    pub fn find_file(&self, id: &FileId) -> Option<&FileEntry> {
        self.files
            .iter()
            .find(|f| &f.id == id)
            .or_else(|| self.folders.iter().find_map(|f| f.find_file(id)))
    }

    /// Every file in the tree, root files first, then folders depth-first.
    pub fn all_files(&self) -> Vec<&FileEntry> {
        let mut out: Vec<&FileEntry> = self.files.iter().collect();
        for folder in &self.folders {
            out.extend(folder.all_files());
        }
        out
    }

    /// Number of folders actually present in the tree, at every depth.
    pub fn folder_count(&self) -> u64 {
        self.folders
            .iter()
            .map(|f| 1 + f.descendant_count())
            .sum()
    }

    /// Recompute the root totals from the tree's contents.
    pub fn recount(&mut self) {
        let files = self.all_files();
        let total_files = files.len() as u64;
        let total_size = files.iter().map(|f| f.size).sum();
        self.total_files = total_files;
        self.total_size = total_size;
        self.total_folders = self.folder_count();
    }
}
