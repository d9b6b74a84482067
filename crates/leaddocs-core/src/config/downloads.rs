//! Download destination configuration.

use serde::{Deserialize, Serialize};

/// Settings for the directory download sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory downloaded files are written into. Created on demand.
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

fn default_directory() -> String {
    "./downloads".to_string()
}
