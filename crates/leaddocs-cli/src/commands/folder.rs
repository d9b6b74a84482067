//! Folder commands.

use clap::Args;

use leaddocs_core::error::AppError;
use leaddocs_core::types::FolderId;
use leaddocs_entity::document::CreateFolderRequest;

use super::Session;

/// Arguments for mkdir
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Folder name
    #[arg(short, long)]
    pub name: String,
    /// Parent folder ID (omit for root)
    #[arg(short, long)]
    pub parent: Option<FolderId>,
}

/// Arguments for rmdir
#[derive(Debug, Args)]
pub struct RmdirArgs {
    /// Folder ID
    pub folder: FolderId,
}

pub async fn mkdir(session: &Session, args: &MkdirArgs) -> Result<(), AppError> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Folder name must not be empty"));
    }

    session.load().await?;
    let request = match &args.parent {
        Some(parent) => CreateFolderRequest::nested(name, parent.clone()),
        None => CreateFolderRequest::root(name),
    };
    session.store.create_folder(&session.lead_id, request).await;

    session.done(&format!("Folder '{}' created", name))
}

pub async fn rmdir(session: &Session, args: &RmdirArgs) -> Result<(), AppError> {
    let tree = session.load().await?;
    let label = tree
        .find_folder(&args.folder)
        .map(|f| f.name.clone())
        .unwrap_or_else(|| args.folder.to_string());

    session.store.delete_folder(&args.folder).await;

    session.done(&format!("Folder '{}' deleted", label))
}
