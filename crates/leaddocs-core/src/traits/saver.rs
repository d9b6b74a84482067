//! Download sink trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Destination for downloaded file contents.
///
/// The document store fetches the bytes and hands them to a saver together
/// with the name the user asked for. Implementations decide where the
/// content ends up (a download directory, a memory buffer in tests).
#[async_trait]
pub trait FileSaver: Send + Sync + std::fmt::Debug + 'static {
    /// Persist `data` under `file_name` and return where it ended up.
    async fn save(&self, file_name: &str, data: Bytes) -> AppResult<String>;
}
