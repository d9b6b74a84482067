//! Shared test helpers for store integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{Mutex, Notify};

use leaddocs_client::{DocumentsApi, InMemoryDocumentsApi};
use leaddocs_core::error::AppError;
use leaddocs_core::result::AppResult;
use leaddocs_core::traits::FileSaver;
use leaddocs_core::types::{FileId, FolderId, LeadId};
use leaddocs_entity::document::{
    CreateFolderRequest, DocumentStats, DocumentStructure, FileEntry, Folder, MoveFileRequest,
    UploadFile, UploadFilesRequest,
};
use leaddocs_store::DocumentStore;

/// Saver that keeps downloads in memory.
#[derive(Debug, Default)]
pub struct RecordingSaver {
    /// Saved `(name, content)` pairs in call order.
    pub saved: Mutex<Vec<(String, Bytes)>>,
    /// When set, every save fails.
    pub failing: AtomicBool,
}

#[async_trait]
impl FileSaver for RecordingSaver {
    async fn save(&self, file_name: &str, data: Bytes) -> AppResult<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::storage("Disk full"));
        }
        self.saved.lock().await.push((file_name.to_string(), data));
        Ok(format!("memory://{file_name}"))
    }
}

/// In-memory backend that can be switched to fail, or paused so a test can
/// observe the store while a request is in flight.
#[derive(Debug, Default)]
pub struct ControlledApi {
    /// The backend doing the real work.
    pub inner: InMemoryDocumentsApi,
    /// When set, every call fails before reaching the backend.
    failing: AtomicBool,
    /// When set, every call waits for [`ControlledApi::release`].
    paused: AtomicBool,
    /// Wakes one paused call.
    gate: Notify,
}

impl ControlledApi {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Let one paused call through and stop pausing new ones.
    pub fn release(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.gate.notify_one();
    }

    async fn enter(&self) -> AppResult<()> {
        if self.paused.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Service unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentsApi for ControlledApi {
    async fn get_documents(&self, lead_id: &LeadId) -> AppResult<DocumentStructure> {
        self.enter().await?;
        self.inner.get_documents(lead_id).await
    }

    async fn create_folder(
        &self,
        lead_id: &LeadId,
        request: &CreateFolderRequest,
    ) -> AppResult<Folder> {
        self.enter().await?;
        self.inner.create_folder(lead_id, request).await
    }

    async fn delete_folder(&self, folder_id: &FolderId) -> AppResult<()> {
        self.enter().await?;
        self.inner.delete_folder(folder_id).await
    }

    async fn upload_files(
        &self,
        lead_id: &LeadId,
        request: &UploadFilesRequest,
    ) -> AppResult<Vec<FileEntry>> {
        self.enter().await?;
        self.inner.upload_files(lead_id, request).await
    }

    async fn delete_file(&self, file_id: &FileId) -> AppResult<()> {
        self.enter().await?;
        self.inner.delete_file(file_id).await
    }

    async fn download_file(&self, file_id: &FileId) -> AppResult<Bytes> {
        self.enter().await?;
        self.inner.download_file(file_id).await
    }

    async fn move_file(&self, request: &MoveFileRequest) -> AppResult<FileEntry> {
        self.enter().await?;
        self.inner.move_file(request).await
    }

    async fn get_document_stats(&self, lead_id: &LeadId) -> AppResult<DocumentStats> {
        self.enter().await?;
        self.inner.get_document_stats(lead_id).await
    }
}

/// Store wired to a controllable backend and a recording saver.
pub struct TestStore {
    pub store: Arc<DocumentStore>,
    pub api: Arc<ControlledApi>,
    pub saver: Arc<RecordingSaver>,
}

impl TestStore {
    pub fn new() -> Self {
        let api = Arc::new(ControlledApi::default());
        let saver = Arc::new(RecordingSaver::default());
        let store = Arc::new(DocumentStore::new(api.clone(), saver.clone()));
        Self { store, api, saver }
    }

    /// Seed the backend for `lead_id` and load it into the store.
    pub async fn loaded(lead_id: &LeadId, tree: DocumentStructure) -> Self {
        let this = Self::new();
        this.api.inner.seed(lead_id, tree).await;
        this.store.fetch_documents(lead_id).await;
        assert!(this.store.error().is_none(), "seed fetch failed");
        this
    }

    /// The loaded tree; panics when none is loaded.
    pub fn tree(&self) -> Arc<DocumentStructure> {
        self.store.documents().expect("tree loaded")
    }
}

pub fn lead() -> LeadId {
    LeadId::new("lead-42")
}

pub fn upload(name: &str, size: usize) -> UploadFile {
    UploadFile::new(name, vec![b'x'; size])
}
