//! Document statistics summary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary figures computed by the Documents API for one lead.
///
/// Fetched separately from the tree and cached as-is; never derived from
/// the local tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    /// Number of files.
    #[serde(default)]
    pub total_files: u64,
    /// Number of folders.
    #[serde(default)]
    pub total_folders: u64,
    /// Total bytes.
    #[serde(default)]
    pub total_size: u64,
    /// File count per lowercase extension.
    #[serde(default)]
    pub file_types: BTreeMap<String, u64>,
    /// Time of the most recent upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_upload_at: Option<DateTime<Utc>>,
}
