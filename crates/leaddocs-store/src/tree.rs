//! Local tree mutations applied after the Documents API has accepted a
//! change.
//!
//! Each function edits a tree the store has already copied, so the previous
//! root stays intact for anyone still holding it. Lookups are depth-first
//! recursive scans; there is no id index.
//!
//! The root totals follow fixed increments rather than a recount:
//!
//! - creating a folder adds one folder, even when its parent is not in the
//!   local tree;
//! - deleting a folder subtracts exactly one folder, even though its whole
//!   subtree disappears with it;
//! - deleting a file subtracts one file and the size of the matching root
//!   entry, or nothing from the size when the file lived inside a folder.
//!
//! The next fetch replaces these figures with the server's.

use leaddocs_core::types::{FileId, FolderId};
use leaddocs_entity::document::{DocumentStructure, FileEntry, Folder};

/// Whether a mutation found its target in the local tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum LocalUpdate {
    /// The local tree now reflects the change.
    Applied,
    /// The target was not in the local tree; only the totals moved.
    TargetMissing,
}

impl LocalUpdate {
    fn from_found(found: bool) -> Self {
        if found {
            Self::Applied
        } else {
            Self::TargetMissing
        }
    }
}

/// Depth-first search returning the first folder whose id matches.
pub fn find_folder_mut<'a>(folders: &'a mut [Folder], id: &FolderId) -> Option<&'a mut Folder> {
    folders.iter_mut().find_map(|folder| {
        if &folder.id == id {
            Some(folder)
        } else {
            find_folder_mut(&mut folder.subfolders, id)
        }
    })
}

/// Splice a newly created folder under `parent_id`, or at the root.
pub fn insert_folder(
    tree: &mut DocumentStructure,
    parent_id: Option<&FolderId>,
    folder: Folder,
) -> LocalUpdate {
    let update = match parent_id {
        Some(parent_id) => match find_folder_mut(&mut tree.folders, parent_id) {
            Some(parent) => {
                parent.subfolders.push(folder);
                LocalUpdate::Applied
            }
            None => LocalUpdate::TargetMissing,
        },
        None => {
            tree.folders.push(folder);
            LocalUpdate::Applied
        }
    };

    tree.total_folders += 1;
    update
}

/// Drop every folder with this id at every level, descendants included.
fn prune_folders(folders: &mut Vec<Folder>, id: &FolderId) -> bool {
    let before = folders.len();
    folders.retain(|f| &f.id != id);
    let mut removed = folders.len() != before;
    for folder in folders.iter_mut() {
        removed |= prune_folders(&mut folder.subfolders, id);
    }
    removed
}

/// Remove a folder and its subtree.
pub fn remove_folder(tree: &mut DocumentStructure, folder_id: &FolderId) -> LocalUpdate {
    let removed = prune_folders(&mut tree.folders, folder_id);
    tree.total_folders = tree.total_folders.saturating_sub(1);
    LocalUpdate::from_found(removed)
}

/// Append uploaded entries to `folder_id`, or to the root.
pub fn append_files(
    tree: &mut DocumentStructure,
    folder_id: Option<&FolderId>,
    files: Vec<FileEntry>,
) -> LocalUpdate {
    let count = files.len() as u64;
    let bytes: u64 = files.iter().map(|f| f.size).sum();

    let update = match folder_id {
        Some(folder_id) => match find_folder_mut(&mut tree.folders, folder_id) {
            Some(folder) => {
                folder.files.extend(files);
                folder.file_count += count;
                folder.total_size += bytes;
                LocalUpdate::Applied
            }
            None => LocalUpdate::TargetMissing,
        },
        None => {
            tree.files.extend(files);
            LocalUpdate::Applied
        }
    };

    tree.total_files += count;
    tree.total_size += bytes;
    update
}

/// Filter a file out of a folder and its descendants, resetting each
/// visited folder's `file_count` to its remaining entries.
fn prune_files(folder: &mut Folder, id: &FileId) -> usize {
    let before = folder.files.len();
    folder.files.retain(|f| &f.id != id);
    let mut removed = before - folder.files.len();
    folder.file_count = folder.files.len() as u64;
    for sub in &mut folder.subfolders {
        removed += prune_files(sub, id);
    }
    removed
}

/// Remove every entry with this id from the root and from every folder.
pub fn remove_file(tree: &mut DocumentStructure, file_id: &FileId) -> LocalUpdate {
    let size = tree
        .files
        .iter()
        .find(|f| &f.id == file_id)
        .map(|f| f.size)
        .unwrap_or(0);

    let before = tree.files.len();
    tree.files.retain(|f| &f.id != file_id);
    let mut removed = before - tree.files.len();
    for folder in &mut tree.folders {
        removed += prune_files(folder, file_id);
    }

    tree.total_files = tree.total_files.saturating_sub(1);
    tree.total_size = tree.total_size.saturating_sub(size);
    LocalUpdate::from_found(removed > 0)
}
