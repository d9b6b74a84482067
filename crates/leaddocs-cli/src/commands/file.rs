//! File commands.

use std::path::PathBuf;

use clap::Args;

use leaddocs_core::error::{AppError, ErrorKind};
use leaddocs_core::types::{FileId, FolderId};
use leaddocs_entity::document::{MoveFileRequest, UploadFile, UploadFilesRequest};

use super::Session;
use crate::output::{self, OutputFormat};

/// Arguments for upload
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Local files to upload
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Target folder ID (omit for root)
    #[arg(long)]
    pub folder: Option<FolderId>,
}

/// Arguments for rm
#[derive(Debug, Args)]
pub struct RmArgs {
    /// File ID
    pub file: FileId,
}

/// Arguments for download
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// File ID
    pub file: FileId,
    /// Save under this name instead of the file's own
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for mv
#[derive(Debug, Args)]
pub struct MvArgs {
    /// File ID
    pub file: FileId,
    /// Destination folder ID (omit for root)
    #[arg(long)]
    pub to: Option<FolderId>,
}

pub async fn upload(session: &Session, args: &UploadArgs) -> Result<(), AppError> {
    let mut files = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::validation(format!("Not a file: {}", path.display())))?;
        let content = tokio::fs::read(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read {}", path.display()),
                e,
            )
        })?;
        files.push(UploadFile::new(name, content));
    }

    session.load().await?;
    let count = files.len();
    let request = UploadFilesRequest {
        folder_id: args.folder.clone(),
        files,
    };
    session.store.upload_files(&session.lead_id, request).await;

    session.done(&format!("Uploaded {} file(s)", count))
}

pub async fn rm(session: &Session, args: &RmArgs) -> Result<(), AppError> {
    let tree = session.load().await?;
    let label = tree
        .find_file(&args.file)
        .map(|f| f.name.clone())
        .unwrap_or_else(|| args.file.to_string());

    session.store.delete_file(&args.file).await;

    session.done(&format!("File '{}' deleted", label))
}

pub async fn download(session: &Session, args: &DownloadArgs) -> Result<(), AppError> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => {
            let tree = session.load().await?;
            tree.find_file(&args.file)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| args.file.to_string())
        }
    };

    let location = session.store.download_file(&args.file, &name).await;
    session.check()?;
    let location = location.ok_or_else(|| AppError::internal("Download was not saved"))?;

    match session.format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "fileId": args.file,
            "location": location,
        })),
        OutputFormat::Table => output::print_success(&format!("Saved '{}' to {}", name, location)),
    }
    Ok(())
}

pub async fn mv(session: &Session, args: &MvArgs) -> Result<(), AppError> {
    session.load().await?;
    let request = MoveFileRequest {
        file_id: args.file.clone(),
        target_folder_id: args.to.clone(),
    };
    session.store.move_file(request).await;
    session.check()?;

    // The store keeps its tree as-is after a move; refetch to show it in place.
    session.load().await?;
    session.done(&format!("File '{}' moved", args.file))
}
