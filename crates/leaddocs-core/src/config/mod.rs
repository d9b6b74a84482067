//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty configuration is
//! valid.

pub mod api;
pub mod downloads;
pub mod logging;

use serde::{Deserialize, Serialize};

use self::api::ApiConfig;
use self::downloads::DownloadConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "LEADDOCS";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Documents API client settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Where downloaded files are written.
    #[serde(default)]
    pub downloads: DownloadConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// `config/{env}.toml` (both optional) and environment variables
    /// prefixed with `LEADDOCS__`, e.g. `LEADDOCS__API__BASE_URL`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert!(config.api.timeout_seconds.is_none());
        assert_eq!(config.downloads.directory, "./downloads");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://crm.example.com/api/v2/"
            timeout_seconds = 30

            [downloads]
            directory = "/tmp/lead-docs"

            [logging]
            format = "json"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.api.base_url, "https://crm.example.com/api/v2/");
        assert_eq!(config.api.timeout_seconds, Some(30));
        assert_eq!(config.downloads.directory, "/tmp/lead-docs");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_type_is_configuration_error() {
        let err = AppConfig::from_toml_str("[api]\ntimeout_seconds = \"soon\"").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
