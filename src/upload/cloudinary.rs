use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

use crate::config::Settings;
use crate::recording::MediaKind;
use crate::{JournalError, Result};

/// One file ready to be sent
#[derive(Debug, Clone)]
pub struct UploadMedia {
    pub file_name: String,
    pub kind: MediaKind,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl UploadMedia {
    pub fn new(path: &Path, bytes: Vec<u8>) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".to_string());

        Self {
            file_name,
            kind: MediaKind::from_path(path),
            content_type: content_type_for(path),
            bytes,
        }
    }
}

/// MIME type from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/m4a",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Remote storage that returns a public URL for each stored object
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `media` under `folder`. Fails with `Upload`.
    async fn upload(&self, media: UploadMedia, folder: &str) -> Result<String>;
}

/// Unsigned uploads to a Cloudinary-style endpoint
pub struct CloudinaryStore {
    http: Client,
    endpoint: String,
    preset: String,
}

impl CloudinaryStore {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let endpoint = settings.upload.endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(JournalError::Config(
                "upload.endpoint is not set".to_string(),
            ));
        }

        let http = Client::builder()
            .build()
            .map_err(|e| JournalError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            preset: settings.upload.preset.clone(),
        })
    }

    fn upload_url(&self, kind: MediaKind) -> String {
        let resource_type = match kind {
            MediaKind::Video => "video",
            MediaKind::Audio => "raw",
        };
        format!("{}/{}/upload", self.endpoint, resource_type)
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn upload(&self, media: UploadMedia, folder: &str) -> Result<String> {
        let url = self.upload_url(media.kind);
        let size = media.bytes.len();

        let part = reqwest::multipart::Part::bytes(media.bytes)
            .file_name(media.file_name.clone())
            .mime_str(media.content_type)
            .map_err(|e| JournalError::Upload(format!("invalid content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.preset.clone())
            .text("folder", folder.to_string());

        tracing::debug!("POST {} ({} bytes, {})", url, size, media.content_type);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| JournalError::Upload(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(JournalError::Upload(format!("{} - {}", status, body)));
        }

        let payload: StoredObject = response
            .json()
            .await
            .map_err(|e| JournalError::Upload(format!("unreadable response: {}", e)))?;

        payload
            .secure_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| JournalError::Upload("response carried no secure_url".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct StoredObject {
    secure_url: Option<String>,
}
