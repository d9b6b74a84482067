//! Download sink writing into a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use leaddocs_core::error::{AppError, ErrorKind};
use leaddocs_core::result::AppResult;
use leaddocs_core::traits::FileSaver;

/// Highest ` (n)` suffix tried before giving up on a free name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Saves downloads into a directory, the way a browser saves into its
/// download folder.
///
/// Content is written to a hidden `.part` file first and renamed into place
/// once complete; the partial file is removed if anything fails. Existing
/// files are never overwritten: a ` (1)`, ` (2)`, ... suffix is added
/// before the extension instead.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    /// Directory downloads land in.
    root: PathBuf,
}

impl DirectorySaver {
    /// Create a saver for `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// First path in the root that does not exist yet.
    async fn free_path(&self, file_name: &str) -> AppResult<PathBuf> {
        let candidate = self.root.join(file_name);
        if !fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }

        let (stem, ext) = split_extension(file_name);
        for n in 1..=MAX_NAME_ATTEMPTS {
            let candidate = self.root.join(format!("{stem} ({n}){ext}"));
            if !fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(AppError::storage(format!(
            "No free name for {file_name} in {}",
            self.root.display()
        )))
    }
}

/// Reduce a requested name to a bare file name.
fn sanitize(file_name: &str) -> AppResult<String> {
    let base = Path::new(file_name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .unwrap_or_default();

    if base.is_empty() || base == "." || base == ".." {
        return Err(AppError::validation(format!(
            "Invalid download file name '{file_name}'"
        )));
    }
    Ok(base.to_string())
}

/// Split `report.final.pdf` into `("report.final", ".pdf")`.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(idx) => file_name.split_at(idx),
    }
}

#[async_trait]
impl FileSaver for DirectorySaver {
    async fn save(&self, file_name: &str, data: Bytes) -> AppResult<String> {
        let file_name = sanitize(file_name)?;

        fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create download directory: {}", self.root.display()),
                e,
            )
        })?;

        let target = self.free_path(&file_name).await?;
        let partial = self.root.join(format!(".{file_name}.part"));

        let written = async {
            let mut file = fs::File::create(&partial).await?;
            file.write_all(&data).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&partial, &target).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&partial).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to save {file_name}: {e}"),
                e,
            ));
        }

        debug!(path = %target.display(), bytes = data.len(), "Saved download");
        Ok(target.display().to_string())
    }
}
