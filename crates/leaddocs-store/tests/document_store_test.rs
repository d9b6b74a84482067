//! Integration tests for the document tree store.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use helpers::{TestStore, lead, upload};
use leaddocs_client::DocumentsApi;
use leaddocs_core::types::{FileId, FolderId, LeadId};
use leaddocs_entity::document::{
    CreateFolderRequest, DocumentStructure, FileEntry, Folder, MoveFileRequest,
    UploadFilesRequest,
};

fn file(id: &str, size: u64) -> FileEntry {
    FileEntry::new(id, format!("{id}.pdf"), size)
}

fn nested_tree() -> DocumentStructure {
    DocumentStructure {
        files: vec![file("root-doc", 500)],
        folders: vec![
            Folder::new("F1", "Contracts")
                .with_file(file("a", 10))
                .with_subfolder(Folder::new("F2", "2023").with_file(file("b", 20))),
        ],
        ..DocumentStructure::default()
    }
}

#[tokio::test]
async fn test_create_folder_in_empty_tree() {
    let t = TestStore::loaded(&lead(), DocumentStructure::empty()).await;

    t.store
        .create_folder(&lead(), CreateFolderRequest::root("Tax Docs"))
        .await;

    let tree = t.tree();
    assert!(t.store.error().is_none());
    assert_eq!(tree.folders.len(), 1);
    assert_eq!(tree.folders[0].name, "Tax Docs");
    assert_eq!(tree.total_folders, 1);
    assert_eq!(tree.total_files, 0);
    assert_eq!(tree.total_size, 0);
}

#[tokio::test]
async fn test_create_nested_folder_keeps_file_totals() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let before = t.tree();

    t.store
        .create_folder(&lead(), CreateFolderRequest::nested("Q4", "F2"))
        .await;

    let after = t.tree();
    let f2 = after.find_folder(&FolderId::new("F2")).unwrap();
    assert_eq!(f2.subfolders.len(), 1);
    assert_eq!(f2.subfolders[0].name, "Q4");
    assert_eq!(after.total_folders, before.total_folders + 1);
    assert_eq!(after.total_files, before.total_files);
    assert_eq!(after.total_size, before.total_size);
}

#[tokio::test]
async fn test_create_under_parent_missing_locally() {
    let t = TestStore::loaded(&lead(), DocumentStructure::empty()).await;

    // Another client adds a folder the store has not fetched yet.
    let remote = t
        .api
        .inner
        .create_folder(&lead(), &CreateFolderRequest::root("Shared"))
        .await
        .unwrap();

    t.store
        .create_folder(&lead(), CreateFolderRequest::nested("Inner", remote.id.clone()))
        .await;

    // Known UX gap: created on the server, absent locally, counted anyway.
    let tree = t.tree();
    assert!(t.store.error().is_none());
    assert!(tree.folders.is_empty());
    assert_eq!(tree.total_folders, 1);

    let refetched = t.store.fetch_documents(&lead()).await.unwrap();
    let shared = refetched.find_folder(&remote.id).unwrap();
    assert_eq!(shared.subfolders[0].name, "Inner");
    assert_eq!(refetched.total_folders, 2);
}

#[tokio::test]
async fn test_upload_into_folder_rolls_up() {
    let t = TestStore::loaded(
        &lead(),
        DocumentStructure {
            folders: vec![Folder::new("F1", "Inbox")],
            ..DocumentStructure::default()
        },
    )
    .await;

    t.store
        .upload_files(
            &lead(),
            UploadFilesRequest {
                folder_id: Some(FolderId::new("F1")),
                files: vec![upload("a.pdf", 100), upload("b.pdf", 250)],
            },
        )
        .await;

    let tree = t.tree();
    let f1 = tree.find_folder(&FolderId::new("F1")).unwrap();
    assert_eq!(f1.file_count, 2);
    assert_eq!(f1.total_size, 350);
    assert_eq!(tree.total_files, 2);
    assert_eq!(tree.total_size, 350);
    assert!(!t.store.snapshot().is_uploading);
}

#[tokio::test]
async fn test_upload_into_nested_folder() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let before = t.tree();

    t.store
        .upload_files(
            &lead(),
            UploadFilesRequest {
                folder_id: Some(FolderId::new("F2")),
                files: vec![upload("c.pdf", 5), upload("d.pdf", 7), upload("e.pdf", 11)],
            },
        )
        .await;

    let after = t.tree();
    let old_f2 = before.find_folder(&FolderId::new("F2")).unwrap();
    let new_f2 = after.find_folder(&FolderId::new("F2")).unwrap();
    assert_eq!(new_f2.file_count, old_f2.file_count + 3);
    assert_eq!(new_f2.total_size, old_f2.total_size + 23);
    assert_eq!(after.total_files, before.total_files + 3);
    assert_eq!(after.total_size, before.total_size + 23);

    let f1 = after.find_folder(&FolderId::new("F1")).unwrap();
    assert_eq!(f1.file_count, 1);
}

#[tokio::test]
async fn test_upload_to_root() {
    let t = TestStore::loaded(&lead(), DocumentStructure::empty()).await;

    t.store
        .upload_files(
            &lead(),
            UploadFilesRequest {
                folder_id: None,
                files: vec![upload("w9.pdf", 42)],
            },
        )
        .await;

    let tree = t.tree();
    assert_eq!(tree.files.len(), 1);
    assert_eq!(tree.files[0].name, "w9.pdf");
    assert_eq!(tree.total_files, 1);
    assert_eq!(tree.total_size, 42);
}

#[tokio::test]
async fn test_delete_root_file() {
    let t = TestStore::loaded(
        &lead(),
        DocumentStructure {
            files: vec![file("file1", 500)],
            ..DocumentStructure::default()
        },
    )
    .await;
    assert_eq!(t.tree().total_files, 1);
    assert_eq!(t.tree().total_size, 500);

    t.store.delete_file(&FileId::new("file1")).await;

    let tree = t.tree();
    assert!(t.store.error().is_none());
    assert!(tree.files.is_empty());
    assert_eq!(tree.total_files, 0);
    assert_eq!(tree.total_size, 0);
}

#[tokio::test]
async fn test_delete_nested_file_keeps_size() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;

    t.store.delete_file(&FileId::new("b")).await;

    let tree = t.tree();
    assert!(tree.find_file(&FileId::new("b")).is_none());
    let f2 = tree.find_folder(&FolderId::new("F2")).unwrap();
    assert_eq!(f2.file_count, 0);
    // Known gap: only root entries contribute their size to the decrement.
    assert_eq!(tree.total_files, 2);
    assert_eq!(tree.total_size, 530);

    let refetched = t.store.fetch_documents(&lead()).await.unwrap();
    assert_eq!(refetched.total_size, 510);
}

#[tokio::test]
async fn test_delete_folder_removes_subtree_counts_one() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    assert_eq!(t.tree().total_folders, 2);

    t.store.delete_folder(&FolderId::new("F1")).await;

    let tree = t.tree();
    assert!(tree.find_folder(&FolderId::new("F1")).is_none());
    assert!(tree.find_folder(&FolderId::new("F2")).is_none());
    assert!(tree.folders.is_empty());
    // Documented undercount: two folders and two files went away, the
    // totals only lose one folder until the next fetch.
    assert_eq!(tree.total_folders, 1);
    assert_eq!(tree.total_files, 3);

    let refetched = t.store.fetch_documents(&lead()).await.unwrap();
    assert_eq!(refetched.total_folders, 0);
    assert_eq!(refetched.total_files, 1);
    assert_eq!(refetched.total_size, 500);
}

#[tokio::test]
async fn test_fetch_twice_yields_same_content() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;

    let first = t.store.fetch_documents(&lead()).await.unwrap();
    let second = t.store.fetch_documents(&lead()).await.unwrap();

    assert_eq!(*first, *second);
}

#[tokio::test]
async fn test_mutation_installs_new_root() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let before = t.tree();

    t.store
        .create_folder(&lead(), CreateFolderRequest::root("New"))
        .await;

    let after = t.tree();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.folders.len(), 1);
    assert_eq!(after.folders.len(), 2);
}

#[tokio::test]
async fn test_failed_mutation_leaves_tree_untouched() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let before = t.tree();
    t.api.set_failing(true);

    t.store
        .create_folder(&lead(), CreateFolderRequest::root("Nope"))
        .await;

    let state = t.store.snapshot();
    assert!(Arc::ptr_eq(&before, state.documents.as_ref().unwrap()));
    assert!(!state.is_loading);
    let error = state.error.unwrap();
    assert!(error.starts_with("Failed to create folder"), "{error}");
    assert!(error.contains("Service unavailable"));

    t.store.clear_error();
    assert!(t.store.error().is_none());
}

#[tokio::test]
async fn test_failed_upload_clears_upload_flag() {
    let t = TestStore::loaded(&lead(), DocumentStructure::empty()).await;
    t.api.set_failing(true);

    t.store
        .upload_files(
            &lead(),
            UploadFilesRequest {
                folder_id: None,
                files: vec![upload("a.pdf", 1)],
            },
        )
        .await;

    let state = t.store.snapshot();
    assert!(!state.is_uploading);
    assert!(state.error.unwrap().starts_with("Failed to upload files"));
    assert_eq!(state.documents.unwrap().total_files, 0);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_tree() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let before = t.tree();
    t.api.set_failing(true);

    let returned = t.store.fetch_documents(&lead()).await;

    assert!(Arc::ptr_eq(&before, &returned.unwrap()));
    let state = t.store.snapshot();
    assert!(!state.is_loading);
    assert!(state.error.unwrap().starts_with("Failed to fetch documents"));
}

#[tokio::test]
async fn test_successful_operation_clears_previous_error() {
    let t = TestStore::loaded(&lead(), DocumentStructure::empty()).await;
    t.api.set_failing(true);
    t.store.fetch_documents(&lead()).await;
    assert!(t.store.error().is_some());

    t.api.set_failing(false);
    t.store.fetch_documents(&lead()).await;
    assert!(t.store.error().is_none());
}

#[tokio::test]
async fn test_aborted_fetch_is_not_an_error() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let before = t.tree();
    t.api.pause();

    let cancel = CancellationToken::new();
    let store = t.store.clone();
    let token = cancel.clone();
    let task =
        tokio::spawn(async move { store.fetch_documents_with_cancel(&lead(), &token).await });

    let mut rx = t.store.subscribe();
    rx.wait_for(|s| s.is_loading).await.unwrap();
    cancel.cancel();
    let returned = task.await.unwrap();
    t.api.release();

    let state = t.store.snapshot();
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(Arc::ptr_eq(&before, &returned.unwrap()));
}

#[tokio::test]
async fn test_upload_flag_is_separate_from_loading() {
    let t = TestStore::loaded(&lead(), DocumentStructure::empty()).await;
    t.api.pause();

    let store = t.store.clone();
    let task = tokio::spawn(async move {
        store
            .upload_files(
                &lead(),
                UploadFilesRequest {
                    folder_id: None,
                    files: vec![upload("scan.png", 64)],
                },
            )
            .await
    });

    let mut rx = t.store.subscribe();
    let in_flight = rx.wait_for(|s| s.is_uploading).await.unwrap().clone();
    assert!(!in_flight.is_loading);

    t.api.release();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("upload finished")
        .unwrap();

    let state = t.store.snapshot();
    assert!(!state.is_uploading);
    assert_eq!(state.documents.unwrap().total_files, 1);
}

#[tokio::test]
async fn test_download_hands_bytes_to_saver() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    t.api
        .inner
        .put_content(&FileId::new("a"), "signed contract")
        .await;
    let before = t.tree();

    let location = t
        .store
        .download_file(&FileId::new("a"), "Contract - Signed.pdf")
        .await;

    assert_eq!(location.as_deref(), Some("memory://Contract - Signed.pdf"));

    let saved = t.saver.saved.lock().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "Contract - Signed.pdf");
    assert_eq!(&saved[0].1[..], b"signed contract");
    assert!(Arc::ptr_eq(&before, &t.tree()));
    assert!(t.store.error().is_none());
}

#[tokio::test]
async fn test_failed_download_records_error_only() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;

    let location = t.store.download_file(&FileId::new("missing"), "x.pdf").await;
    assert!(location.is_none());

    let state = t.store.snapshot();
    assert!(!state.is_loading);
    assert!(!state.is_uploading);
    assert!(state.error.unwrap().starts_with("Failed to download file"));

    t.store.clear_error();
    t.api.inner.put_content(&FileId::new("a"), "ok").await;
    t.saver
        .failing
        .store(true, std::sync::atomic::Ordering::SeqCst);
    t.store.download_file(&FileId::new("a"), "a.pdf").await;
    assert!(t.store.error().unwrap().contains("Disk full"));
}

#[tokio::test]
async fn test_move_file_leaves_local_tree() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let before = t.tree();

    t.store
        .move_file(MoveFileRequest {
            file_id: FileId::new("root-doc"),
            target_folder_id: Some(FolderId::new("F2")),
        })
        .await;

    assert!(t.store.error().is_none());
    let after = t.tree();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.files[0].id, "root-doc");

    let refetched = t.store.fetch_documents(&lead()).await.unwrap();
    assert!(refetched.files.is_empty());
    let f2 = refetched.find_folder(&FolderId::new("F2")).unwrap();
    assert!(f2.files.iter().any(|f| f.id == "root-doc"));
}

#[tokio::test]
async fn test_fetch_stats_is_cached() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;

    let stats = t.store.fetch_stats(&lead()).await.unwrap();

    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.total_size, 530);
    assert_eq!(stats.file_types.get("pdf"), Some(&3));
    assert_eq!(t.store.snapshot().stats, Some(stats));
}

#[tokio::test]
async fn test_switching_lead_discards_tree() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    t.store.fetch_stats(&lead()).await;
    let other = LeadId::new("lead-7");
    let other_tree = DocumentStructure {
        files: vec![file("w9", 40)],
        ..DocumentStructure::default()
    };
    t.api.inner.seed(&other, other_tree).await;

    let tree = t.store.fetch_documents(&other).await.unwrap();

    let state = t.store.snapshot();
    assert_eq!(state.lead_id, Some(other));
    assert!(Arc::ptr_eq(&tree, state.documents.as_ref().unwrap()));
    assert_eq!(tree.total_files, 1);
    assert!(tree.find_folder(&FolderId::new("F1")).is_none());
    assert!(state.stats.is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_failed_fetch_of_other_lead_keeps_tree() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    t.store.fetch_stats(&lead()).await;
    let before = t.tree();
    t.api.set_failing(true);

    t.store.fetch_documents(&LeadId::new("lead-7")).await;

    let state = t.store.snapshot();
    assert_eq!(state.lead_id, Some(lead()));
    assert!(Arc::ptr_eq(&before, state.documents.as_ref().unwrap()));
    assert!(state.stats.is_some());
    assert!(!state.is_loading);
    assert!(state.error.unwrap().starts_with("Failed to fetch documents"));
}

#[tokio::test]
async fn test_aborted_fetch_of_other_lead_changes_nothing() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    t.store.fetch_stats(&lead()).await;
    t.api.set_failing(true);
    t.store.fetch_documents(&lead()).await;
    let before = t.store.snapshot();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let returned = t
        .store
        .fetch_documents_with_cancel(&LeadId::new("lead-7"), &cancel)
        .await;

    let state = t.store.snapshot();
    assert!(!state.is_loading);
    assert_eq!(state.lead_id, Some(lead()));
    assert_eq!(state.error, before.error);
    assert!(state.error.is_some());
    assert_eq!(state.stats, before.stats);
    assert!(Arc::ptr_eq(
        before.documents.as_ref().unwrap(),
        &returned.unwrap()
    ));
}

#[tokio::test]
async fn test_stats_for_other_lead_are_not_cached() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let other = LeadId::new("lead-7");
    t.api.inner.seed(&other, DocumentStructure::default()).await;

    let stats = t.store.fetch_stats(&other).await.unwrap();

    assert_eq!(stats.total_files, 0);
    let state = t.store.snapshot();
    assert_eq!(state.lead_id, Some(lead()));
    assert!(state.stats.is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_mutation_for_other_lead_skips_local_tree() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    let before = t.tree();

    t.store
        .create_folder(&LeadId::new("lead-7"), CreateFolderRequest::root("Elsewhere"))
        .await;

    assert!(t.store.error().is_none());
    assert!(Arc::ptr_eq(&before, &t.tree()));
}

#[tokio::test]
async fn test_mutation_without_loaded_tree() {
    let t = TestStore::new();

    t.store
        .create_folder(&lead(), CreateFolderRequest::root("Tax Docs"))
        .await;

    assert!(t.store.documents().is_none());
    assert!(t.store.error().is_none());
    let remote = t.api.inner.documents(&lead()).await;
    assert_eq!(remote.folders.len(), 1);
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let t = TestStore::loaded(&lead(), nested_tree()).await;
    t.store.fetch_stats(&lead()).await;

    t.store.reset();

    let state = t.store.snapshot();
    assert!(state.lead_id.is_none());
    assert!(state.documents.is_none());
    assert!(state.stats.is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_subscribers_see_new_root() {
    let t = TestStore::loaded(&lead(), DocumentStructure::empty()).await;
    let mut rx = t.store.subscribe();

    t.store
        .create_folder(&lead(), CreateFolderRequest::root("Tax Docs"))
        .await;

    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().documents.clone().unwrap();
    assert_eq!(seen.total_folders, 1);
}
