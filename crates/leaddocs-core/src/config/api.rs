//! Documents API client configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the remote Documents API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds. Requests are unbounded when unset.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Value sent in the `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_user_agent() -> String {
    concat!("leaddocs/", env!("CARGO_PKG_VERSION")).to_string()
}
