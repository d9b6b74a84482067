//! Documents API trait.

use async_trait::async_trait;
use bytes::Bytes;

use leaddocs_core::result::AppResult;
use leaddocs_core::types::{FileId, FolderId, LeadId};
use leaddocs_entity::document::{
    CreateFolderRequest, DocumentStats, DocumentStructure, FileEntry, Folder, MoveFileRequest,
    UploadFilesRequest,
};

/// Remote operations on a lead's documents.
///
/// Every call is a durable mutation or read on the server; nothing here
/// touches the client-held tree.
#[async_trait]
pub trait DocumentsApi: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the full document hierarchy of a lead.
    async fn get_documents(&self, lead_id: &LeadId) -> AppResult<DocumentStructure>;

    /// Create a folder and return the stored record.
    async fn create_folder(
        &self,
        lead_id: &LeadId,
        request: &CreateFolderRequest,
    ) -> AppResult<Folder>;

    /// Delete a folder together with everything below it.
    async fn delete_folder(&self, folder_id: &FolderId) -> AppResult<()>;

    /// Upload files and return their stored entries, in request order.
    async fn upload_files(
        &self,
        lead_id: &LeadId,
        request: &UploadFilesRequest,
    ) -> AppResult<Vec<FileEntry>>;

    /// Delete a file.
    async fn delete_file(&self, file_id: &FileId) -> AppResult<()>;

    /// Retrieve the raw content of a file.
    async fn download_file(&self, file_id: &FileId) -> AppResult<Bytes>;

    /// Relocate a file and return its updated entry.
    async fn move_file(&self, request: &MoveFileRequest) -> AppResult<FileEntry>;

    /// Fetch the server-computed summary for a lead.
    async fn get_document_stats(&self, lead_id: &LeadId) -> AppResult<DocumentStats>;
}
