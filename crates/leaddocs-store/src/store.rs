//! The document tree store.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use leaddocs_client::DocumentsApi;
use leaddocs_core::error::AppError;
use leaddocs_core::traits::FileSaver;
use leaddocs_core::types::{FileId, FolderId, LeadId};
use leaddocs_entity::document::{
    CreateFolderRequest, DocumentStats, DocumentStructure, MoveFileRequest, UploadFilesRequest,
};

use crate::state::StoreState;
use crate::tree::{self, LocalUpdate};

/// Which in-flight flag an operation raises.
#[derive(Debug, Clone, Copy)]
enum Busy {
    Loading,
    Uploading,
}

/// Client-held copy of one lead's document tree.
///
/// Every operation calls the Documents API first and touches local state
/// only after the call succeeds. Failures never surface as `Err`: the
/// message is stored in [`StoreState::error`] and the previous state stays
/// in place. Observers can follow changes through [`DocumentStore::subscribe`].
pub struct DocumentStore {
    /// Remote collaborator performing the durable mutations.
    api: Arc<dyn DocumentsApi>,
    /// Where downloads are handed off.
    saver: Arc<dyn FileSaver>,
    /// Current state, broadcast to subscribers on every change.
    state: watch::Sender<StoreState>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("api", &self.api)
            .field("saver", &self.saver)
            .finish()
    }
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new(api: Arc<dyn DocumentsApi>, saver: Arc<dyn FileSaver>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { api, saver, state }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// The current tree, if one is loaded.
    pub fn documents(&self) -> Option<Arc<DocumentStructure>> {
        self.state.borrow().documents.clone()
    }

    /// The most recent failure message.
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Drop the tree, stats, flags and error.
    pub fn reset(&self) {
        self.state.send_replace(StoreState::default());
    }

    /// Forget the last failure.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Raise a busy flag and clear the previous error.
    fn begin(&self, busy: Busy) {
        self.state.send_modify(|state| {
            match busy {
                Busy::Loading => state.is_loading = true,
                Busy::Uploading => state.is_uploading = true,
            }
            state.error = None;
        });
    }

    /// Lower a busy flag, recording the failure if there was one.
    fn finish(&self, busy: Busy, failure: Option<(&str, AppError)>) {
        let message = failure.map(|(action, err)| {
            warn!(kind = %err.kind, error = %err.message, "Failed to {action}");
            format!("Failed to {action}: {}", err.message)
        });
        self.state.send_modify(|state| {
            match busy {
                Busy::Loading => state.is_loading = false,
                Busy::Uploading => state.is_uploading = false,
            }
            if message.is_some() {
                state.error = message;
            }
        });
    }

    /// Record a failure without touching the busy flags.
    fn fail(&self, action: &str, err: AppError) {
        warn!(kind = %err.kind, error = %err.message, "Failed to {action}");
        let message = format!("Failed to {action}: {}", err.message);
        self.state.send_modify(|state| state.error = Some(message));
    }

    /// Copy the current tree, edit the copy and install it as the new root.
    ///
    /// With `lead_id`, the edit only happens when the loaded tree belongs to
    /// that lead. Returns `None` when no edit was made.
    fn apply<F>(&self, lead_id: Option<&LeadId>, edit: F) -> Option<LocalUpdate>
    where
        F: FnOnce(&mut DocumentStructure) -> LocalUpdate,
    {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            if let Some(lead_id) = lead_id {
                if !state.holds_lead(lead_id) {
                    return false;
                }
            }
            let Some(current) = state.documents.as_deref() else {
                return false;
            };
            let mut next = current.clone();
            outcome = Some(edit(&mut next));
            state.documents = Some(Arc::new(next));
            true
        });
        outcome
    }

    /// Fetch a lead's tree and replace the local one wholesale.
    ///
    /// Loading a different lead than the one held discards the cached stats
    /// along with the old tree. Until the new tree arrives, and if the fetch
    /// fails, the previous tree stays in place. Concurrent fetches are not
    /// deduplicated; whichever response lands last wins.
    pub async fn fetch_documents(&self, lead_id: &LeadId) -> Option<Arc<DocumentStructure>> {
        self.fetch_documents_with_cancel(lead_id, &CancellationToken::new())
            .await
    }

    /// [`fetch_documents`](Self::fetch_documents) that gives up when
    /// `cancel` fires. An abort changes nothing but the loading flag: the
    /// tree, stats, lead and any recorded error are left as they were.
    pub async fn fetch_documents_with_cancel(
        &self,
        lead_id: &LeadId,
        cancel: &CancellationToken,
    ) -> Option<Arc<DocumentStructure>> {
        self.state.send_modify(|state| state.is_loading = true);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::cancelled("Document fetch aborted")),
            result = self.api.get_documents(lead_id) => result,
        };

        match result {
            Ok(tree) => {
                debug!(
                    lead_id = %lead_id,
                    total_files = tree.total_files,
                    total_folders = tree.total_folders,
                    "Fetched documents"
                );
                let tree = Arc::new(tree);
                self.state.send_modify(|state| {
                    if state.lead_id.as_ref() != Some(lead_id) {
                        state.lead_id = Some(lead_id.clone());
                        state.stats = None;
                    }
                    state.documents = Some(Arc::clone(&tree));
                    state.is_loading = false;
                    state.error = None;
                });
                Some(tree)
            }
            Err(err) if err.is_cancelled() => {
                debug!(lead_id = %lead_id, "Document fetch aborted");
                self.state.send_modify(|state| state.is_loading = false);
                self.documents()
            }
            Err(err) => {
                self.finish(Busy::Loading, Some(("fetch documents", err)));
                self.documents()
            }
        }
    }

    /// Create a folder remotely and splice it into the local tree.
    ///
    /// When `parent_id` is not in the local tree the folder exists on the
    /// server only until the next fetch; `total_folders` still goes up.
    pub async fn create_folder(&self, lead_id: &LeadId, request: CreateFolderRequest) {
        self.begin(Busy::Loading);

        let folder = match self.api.create_folder(lead_id, &request).await {
            Ok(folder) => folder,
            Err(err) => return self.finish(Busy::Loading, Some(("create folder", err))),
        };

        let folder_id = folder.id.clone();
        let update = self.apply(Some(lead_id), |tree| {
            tree::insert_folder(tree, request.parent_id.as_ref(), folder)
        });
        self.finish(Busy::Loading, None);

        match update {
            Some(LocalUpdate::Applied) => {
                info!(lead_id = %lead_id, folder_id = %folder_id, name = %request.name, "Folder created")
            }
            _ => warn!(
                lead_id = %lead_id,
                folder_id = %folder_id,
                parent_id = ?request.parent_id,
                "Folder created but not placed locally until the next fetch"
            ),
        }
    }

    /// Delete a folder remotely and prune it, with its subtree, locally.
    ///
    /// `total_folders` drops by one regardless of how many descendants
    /// disappeared; the next fetch corrects the totals.
    pub async fn delete_folder(&self, folder_id: &FolderId) {
        self.begin(Busy::Loading);

        if let Err(err) = self.api.delete_folder(folder_id).await {
            return self.finish(Busy::Loading, Some(("delete folder", err)));
        }

        let update = self.apply(None, |tree| tree::remove_folder(tree, folder_id));
        self.finish(Busy::Loading, None);

        match update {
            Some(LocalUpdate::Applied) => info!(folder_id = %folder_id, "Folder deleted"),
            _ => debug!(folder_id = %folder_id, "Deleted folder was not in the local tree"),
        }
    }

    /// Upload files remotely and append the stored entries locally.
    ///
    /// Raises [`StoreState::is_uploading`] instead of the loading flag.
    pub async fn upload_files(&self, lead_id: &LeadId, request: UploadFilesRequest) {
        self.begin(Busy::Uploading);

        let entries = match self.api.upload_files(lead_id, &request).await {
            Ok(entries) => entries,
            Err(err) => return self.finish(Busy::Uploading, Some(("upload files", err))),
        };

        let file_count = entries.len();
        let bytes: u64 = entries.iter().map(|e| e.size).sum();
        let update = self.apply(Some(lead_id), |tree| {
            tree::append_files(tree, request.folder_id.as_ref(), entries)
        });
        self.finish(Busy::Uploading, None);

        match update {
            Some(LocalUpdate::Applied) => info!(
                lead_id = %lead_id,
                folder_id = ?request.folder_id,
                file_count,
                bytes,
                "Files uploaded"
            ),
            _ => warn!(
                lead_id = %lead_id,
                folder_id = ?request.folder_id,
                file_count,
                "Files uploaded but not placed locally until the next fetch"
            ),
        }
    }

    /// Delete a file remotely and remove every local entry with its id.
    ///
    /// Only a root-level entry contributes its size to the `total_size`
    /// decrement.
    pub async fn delete_file(&self, file_id: &FileId) {
        self.begin(Busy::Loading);

        if let Err(err) = self.api.delete_file(file_id).await {
            return self.finish(Busy::Loading, Some(("delete file", err)));
        }

        let update = self.apply(None, |tree| tree::remove_file(tree, file_id));
        self.finish(Busy::Loading, None);

        match update {
            Some(LocalUpdate::Applied) => info!(file_id = %file_id, "File deleted"),
            _ => debug!(file_id = %file_id, "Deleted file was not in the local tree"),
        }
    }

    /// Fetch a file's content and hand it to the saver as `file_name`.
    ///
    /// Returns where the saver put it, which may differ from `file_name`.
    /// Leaves the tree and the busy flags alone; only a failure is recorded.
    pub async fn download_file(&self, file_id: &FileId, file_name: &str) -> Option<String> {
        let data = match self.api.download_file(file_id).await {
            Ok(data) => data,
            Err(err) => {
                self.fail("download file", err);
                return None;
            }
        };

        match self.saver.save(file_name, data).await {
            Ok(location) => {
                info!(file_id = %file_id, location = %location, "File downloaded");
                Some(location)
            }
            Err(err) => {
                self.fail("download file", err);
                None
            }
        }
    }

    /// Relocate a file remotely.
    ///
    /// The local tree is not updated; the move shows up on the next fetch.
    pub async fn move_file(&self, request: MoveFileRequest) {
        self.begin(Busy::Loading);

        match self.api.move_file(&request).await {
            Ok(entry) => {
                self.finish(Busy::Loading, None);
                info!(
                    file_id = %entry.id,
                    target_folder_id = ?request.target_folder_id,
                    "File moved; local tree unchanged until the next fetch"
                );
            }
            Err(err) => self.finish(Busy::Loading, Some(("move file", err))),
        }
    }

    /// Fetch the server's summary for a lead and cache it verbatim.
    ///
    /// The summary is only cached when no other lead's tree is held; it is
    /// returned either way.
    pub async fn fetch_stats(&self, lead_id: &LeadId) -> Option<DocumentStats> {
        self.begin(Busy::Loading);

        match self.api.get_document_stats(lead_id).await {
            Ok(stats) => {
                debug!(lead_id = %lead_id, total_files = stats.total_files, "Fetched stats");
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    if state.lead_id.as_ref().is_some_and(|held| held != lead_id) {
                        debug!(lead_id = %lead_id, "Stats not cached while another lead is held");
                    } else {
                        state.lead_id = Some(lead_id.clone());
                        state.stats = Some(stats.clone());
                    }
                });
                Some(stats)
            }
            Err(err) => {
                self.finish(Busy::Loading, Some(("fetch stats", err)));
                self.state.borrow().stats.clone()
            }
        }
    }
}
