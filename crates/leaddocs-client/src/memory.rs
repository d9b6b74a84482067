//! In-memory Documents API backend using a Tokio mutex.
//!
//! Keeps one tree per lead plus the uploaded bytes. Unlike the client-side
//! store, this backend recomputes every aggregate after each mutation, so a
//! refetch always returns exact counts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use leaddocs_core::error::AppError;
use leaddocs_core::result::AppResult;
use leaddocs_core::types::{FileId, FolderId, LeadId};
use leaddocs_entity::document::{
    CreateFolderRequest, DocumentStats, DocumentStructure, FileEntry, Folder, MoveFileRequest,
    UploadFilesRequest,
};

use crate::api::DocumentsApi;

/// Internal state for the in-memory backend.
#[derive(Debug, Default)]
struct InnerState {
    /// Document tree per lead.
    trees: HashMap<LeadId, DocumentStructure>,
    /// Stored file content.
    contents: HashMap<FileId, Bytes>,
}

impl InnerState {
    /// The lead whose tree contains the given folder.
    fn lead_of_folder(&self, folder_id: &FolderId) -> Option<LeadId> {
        self.trees
            .iter()
            .find(|(_, tree)| tree.find_folder(folder_id).is_some())
            .map(|(lead, _)| lead.clone())
    }

    /// The lead whose tree contains the given file.
    fn lead_of_file(&self, file_id: &FileId) -> Option<LeadId> {
        self.trees
            .iter()
            .find(|(_, tree)| tree.find_file(file_id).is_some())
            .map(|(lead, _)| lead.clone())
    }
}

/// Documents API backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentsApi {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl InMemoryDocumentsApi {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a lead's tree. Aggregates are recomputed from the contents.
    pub async fn seed(&self, lead_id: &LeadId, mut tree: DocumentStructure) {
        normalize(&mut tree);
        self.state.lock().await.trees.insert(lead_id.clone(), tree);
    }

    /// Store content for an existing file so it can be downloaded.
    pub async fn put_content(&self, file_id: &FileId, data: impl Into<Bytes>) {
        self.state
            .lock()
            .await
            .contents
            .insert(file_id.clone(), data.into());
    }

    /// A copy of the tree the backend currently holds for a lead.
    pub async fn documents(&self, lead_id: &LeadId) -> DocumentStructure {
        self.state
            .lock()
            .await
            .trees
            .get(lead_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::now_v7().simple())
}

/// Depth-first lookup of a mutable folder.
fn folder_mut<'a>(folders: &'a mut [Folder], id: &FolderId) -> Option<&'a mut Folder> {
    folders.iter_mut().find_map(|f| {
        if &f.id == id {
            Some(f)
        } else {
            folder_mut(&mut f.subfolders, id)
        }
    })
}

/// Detach a folder from wherever it sits in the hierarchy.
fn detach_folder(folders: &mut Vec<Folder>, id: &FolderId) -> Option<Folder> {
    if let Some(pos) = folders.iter().position(|f| &f.id == id) {
        return Some(folders.remove(pos));
    }
    folders
        .iter_mut()
        .find_map(|f| detach_folder(&mut f.subfolders, id))
}

/// Detach a file from a folder or any of its descendants.
fn detach_file_in(folder: &mut Folder, id: &FileId) -> Option<FileEntry> {
    if let Some(pos) = folder.files.iter().position(|f| &f.id == id) {
        return Some(folder.files.remove(pos));
    }
    folder
        .subfolders
        .iter_mut()
        .find_map(|sub| detach_file_in(sub, id))
}

/// Detach a file from the root or any folder.
fn detach_file(tree: &mut DocumentStructure, id: &FileId) -> Option<FileEntry> {
    if let Some(pos) = tree.files.iter().position(|f| &f.id == id) {
        return Some(tree.files.remove(pos));
    }
    tree.folders
        .iter_mut()
        .find_map(|folder| detach_file_in(folder, id))
}

fn normalize_folder(folder: &mut Folder) {
    folder.file_count = folder.files.len() as u64;
    folder.total_size = folder.files.iter().map(|f| f.size).sum();
    folder.subfolders.iter_mut().for_each(normalize_folder);
}

/// Recompute every per-folder counter and the root totals.
fn normalize(tree: &mut DocumentStructure) {
    tree.folders.iter_mut().for_each(normalize_folder);
    tree.recount();
}

fn collect_folder_ids(folder: &Folder, out: &mut Vec<FileId>) {
    out.extend(folder.files.iter().map(|f| f.id.clone()));
    for sub in &folder.subfolders {
        collect_folder_ids(sub, out);
    }
}

#[async_trait]
impl DocumentsApi for InMemoryDocumentsApi {
    async fn get_documents(&self, lead_id: &LeadId) -> AppResult<DocumentStructure> {
        Ok(self.documents(lead_id).await)
    }

    async fn create_folder(
        &self,
        lead_id: &LeadId,
        request: &CreateFolderRequest,
    ) -> AppResult<Folder> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }

        let mut state = self.state.lock().await;
        let tree = state.trees.entry(lead_id.clone()).or_default();

        let mut folder = Folder::new(new_id("fld"), name);
        folder.created_at = Some(Utc::now());

        match &request.parent_id {
            Some(parent_id) => {
                let parent = folder_mut(&mut tree.folders, parent_id).ok_or_else(|| {
                    AppError::not_found(format!("Parent folder {parent_id} not found"))
                })?;
                parent.subfolders.push(folder.clone());
            }
            None => tree.folders.push(folder.clone()),
        }
        normalize(tree);

        debug!(lead_id = %lead_id, folder_id = %folder.id, "Stored folder");
        Ok(folder)
    }

    async fn delete_folder(&self, folder_id: &FolderId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let lead_id = state
            .lead_of_folder(folder_id)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        let mut removed_files = Vec::new();
        if let Some(tree) = state.trees.get_mut(&lead_id) {
            if let Some(removed) = detach_folder(&mut tree.folders, folder_id) {
                collect_folder_ids(&removed, &mut removed_files);
            }
            normalize(tree);
        }
        for file_id in &removed_files {
            state.contents.remove(file_id);
        }

        debug!(
            folder_id = %folder_id,
            removed_files = removed_files.len(),
            "Deleted folder"
        );
        Ok(())
    }

    async fn upload_files(
        &self,
        lead_id: &LeadId,
        request: &UploadFilesRequest,
    ) -> AppResult<Vec<FileEntry>> {
        let mut state = self.state.lock().await;

        let now = Utc::now();
        let entries: Vec<FileEntry> = request
            .files
            .iter()
            .map(|upload| FileEntry {
                id: FileId::new(new_id("file")),
                name: upload.name.clone(),
                size: upload.size(),
                uploaded_at: now,
                mime_type: upload.mime_type.clone(),
            })
            .collect();

        let tree = state.trees.entry(lead_id.clone()).or_default();
        let target = match &request.folder_id {
            Some(folder_id) => {
                let folder = folder_mut(&mut tree.folders, folder_id).ok_or_else(|| {
                    AppError::not_found(format!("Folder {folder_id} not found"))
                })?;
                &mut folder.files
            }
            None => &mut tree.files,
        };
        target.extend(entries.iter().cloned());
        normalize(tree);

        for (entry, upload) in entries.iter().zip(&request.files) {
            state
                .contents
                .insert(entry.id.clone(), upload.content.clone());
        }

        debug!(lead_id = %lead_id, file_count = entries.len(), "Stored uploads");
        Ok(entries)
    }

    async fn delete_file(&self, file_id: &FileId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let lead_id = state
            .lead_of_file(file_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        if let Some(tree) = state.trees.get_mut(&lead_id) {
            detach_file(tree, file_id);
            normalize(tree);
        }
        state.contents.remove(file_id);

        debug!(file_id = %file_id, "Deleted file");
        Ok(())
    }

    async fn download_file(&self, file_id: &FileId) -> AppResult<Bytes> {
        self.state
            .lock()
            .await
            .contents
            .get(file_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Content of file {file_id} not found")))
    }

    async fn move_file(&self, request: &MoveFileRequest) -> AppResult<FileEntry> {
        let mut state = self.state.lock().await;
        let lead_id = state
            .lead_of_file(&request.file_id)
            .ok_or_else(|| AppError::not_found(format!("File {} not found", request.file_id)))?;

        let tree = state
            .trees
            .get_mut(&lead_id)
            .ok_or_else(|| AppError::internal("Lead tree disappeared during move"))?;

        if let Some(target_id) = &request.target_folder_id {
            if tree.find_folder(target_id).is_none() {
                return Err(AppError::not_found(format!(
                    "Target folder {target_id} not found"
                )));
            }
        }

        let entry = detach_file(tree, &request.file_id)
            .ok_or_else(|| AppError::not_found(format!("File {} not found", request.file_id)))?;

        match &request.target_folder_id {
            Some(target_id) => {
                let folder = folder_mut(&mut tree.folders, target_id).ok_or_else(|| {
                    AppError::not_found(format!("Target folder {target_id} not found"))
                })?;
                folder.files.push(entry.clone());
            }
            None => tree.files.push(entry.clone()),
        }
        normalize(tree);

        debug!(file_id = %entry.id, "Moved file");
        Ok(entry)
    }

    async fn get_document_stats(&self, lead_id: &LeadId) -> AppResult<DocumentStats> {
        let tree = self.documents(lead_id).await;
        let mut stats = DocumentStats {
            total_files: tree.total_files,
            total_folders: tree.total_folders,
            total_size: tree.total_size,
            ..DocumentStats::default()
        };
        for file in tree.all_files() {
            let ext = file.extension().unwrap_or_else(|| "other".to_string());
            *stats.file_types.entry(ext).or_insert(0) += 1;
            if stats.last_upload_at.is_none_or(|last| file.uploaded_at > last) {
                stats.last_upload_at = Some(file.uploaded_at);
            }
        }
        Ok(stats)
    }
}
