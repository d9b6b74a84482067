//! REST implementation of [`DocumentsApi`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use leaddocs_core::config::api::ApiConfig;
use leaddocs_core::error::{AppError, ErrorKind};
use leaddocs_core::result::AppResult;
use leaddocs_core::types::{FileId, FolderId, LeadId};
use leaddocs_entity::document::{
    CreateFolderRequest, DocumentStats, DocumentStructure, FileEntry, Folder, MoveFileRequest,
    UploadFilesRequest,
};

use crate::api::DocumentsApi;

/// Longest slice of a non-JSON error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Documents API client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDocumentsApi {
    /// Shared connection pool.
    client: reqwest::Client,
    /// Base URL every endpoint is appended to.
    base_url: Url,
}

/// Upload responses come either as a bare array or wrapped in `files`.
#[derive(Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Bare(Vec<FileEntry>),
    Wrapped { files: Vec<FileEntry> },
}

impl HttpDocumentsApi {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::configuration(format!("Invalid API base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "API base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::configuration("API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and turn non-2xx statuses into errors.
    async fn send(&self, request: RequestBuilder, action: &str) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("{action} request failed: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(action, status, &body))
    }

    /// Send a request and decode its JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> AppResult<T> {
        self.send(request, action)
            .await?
            .json::<T>()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("Invalid {action} response: {e}"),
                    e,
                )
            })
    }
}

/// Map an error status to an [`AppError`], preferring the server's message.
fn status_error(action: &str, status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(MAX_ERROR_BODY).collect())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    let kind = match status {
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        s if s.is_client_error() => ErrorKind::Validation,
        _ => ErrorKind::ExternalService,
    };

    AppError::new(kind, format!("{action} failed ({}): {detail}", status.as_u16()))
}

#[async_trait]
impl DocumentsApi for HttpDocumentsApi {
    async fn get_documents(&self, lead_id: &LeadId) -> AppResult<DocumentStructure> {
        let url = self.endpoint(&["leads", lead_id.as_str(), "documents"])?;
        debug!(%url, "GET documents");
        self.send_json(self.client.get(url), "Fetch documents").await
    }

    async fn create_folder(
        &self,
        lead_id: &LeadId,
        request: &CreateFolderRequest,
    ) -> AppResult<Folder> {
        let url = self.endpoint(&["leads", lead_id.as_str(), "documents", "folders"])?;
        debug!(%url, name = %request.name, "POST folder");
        self.send_json(self.client.post(url).json(request), "Create folder")
            .await
    }

    async fn delete_folder(&self, folder_id: &FolderId) -> AppResult<()> {
        let url = self.endpoint(&["documents", "folders", folder_id.as_str()])?;
        debug!(%url, "DELETE folder");
        self.send(self.client.delete(url), "Delete folder").await?;
        Ok(())
    }

    async fn upload_files(
        &self,
        lead_id: &LeadId,
        request: &UploadFilesRequest,
    ) -> AppResult<Vec<FileEntry>> {
        let url = self.endpoint(&["leads", lead_id.as_str(), "documents", "files"])?;

        let mut form = Form::new();
        if let Some(folder_id) = &request.folder_id {
            form = form.text("folderId", folder_id.to_string());
        }
        for file in &request.files {
            let mut part = Part::bytes(file.content.to_vec()).file_name(file.name.clone());
            if let Some(mime) = &file.mime_type {
                part = part.mime_str(mime).map_err(|e| {
                    AppError::validation(format!("Invalid MIME type '{mime}' for {}: {e}", file.name))
                })?;
            }
            form = form.part("files", part);
        }

        debug!(%url, file_count = request.files.len(), "POST files");
        let response: UploadResponse = self
            .send_json(self.client.post(url).multipart(form), "Upload files")
            .await?;

        Ok(match response {
            UploadResponse::Bare(files) | UploadResponse::Wrapped { files } => files,
        })
    }

    async fn delete_file(&self, file_id: &FileId) -> AppResult<()> {
        let url = self.endpoint(&["documents", "files", file_id.as_str()])?;
        debug!(%url, "DELETE file");
        self.send(self.client.delete(url), "Delete file").await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &FileId) -> AppResult<Bytes> {
        let url = self.endpoint(&["documents", "files", file_id.as_str(), "download"])?;
        debug!(%url, "GET file content");
        self.send(self.client.get(url), "Download file")
            .await?
            .bytes()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Download file body could not be read: {e}"),
                    e,
                )
            })
    }

    async fn move_file(&self, request: &MoveFileRequest) -> AppResult<FileEntry> {
        let url = self.endpoint(&["documents", "files", request.file_id.as_str(), "move"])?;
        debug!(%url, "PUT file move");
        self.send_json(self.client.put(url).json(request), "Move file")
            .await
    }

    async fn get_document_stats(&self, lead_id: &LeadId) -> AppResult<DocumentStats> {
        let url = self.endpoint(&["leads", lead_id.as_str(), "documents", "stats"])?;
        debug!(%url, "GET stats");
        self.send_json(self.client.get(url), "Fetch document stats")
            .await
    }
}
