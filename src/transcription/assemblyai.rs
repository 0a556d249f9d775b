use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::transcription::api::{JobStatus, TranscriptionApi};
use crate::{JournalError, Result};

const DEFAULT_ENDPOINT: &str = "https://api.assemblyai.com/v2";

pub struct AssemblyAiApi {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl AssemblyAiApi {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.transcription.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(JournalError::Config(
                "Transcription API key is missing. Set transcription.api_key in config or MOODJOURNAL_TRANSCRIPTION_API_KEY."
                    .to_string(),
            ));
        }

        let endpoint = if settings.transcription.endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            settings
                .transcription
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| JournalError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            endpoint,
        })
    }
}

#[async_trait]
impl TranscriptionApi for AssemblyAiApi {
    async fn upload_audio(&self, audio: Vec<u8>) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/upload", self.endpoint))
            .header("authorization", &self.api_key)
            .header("content-type", "application/octet-stream")
            .body(audio)
            .send()
            .await
            .map_err(|e| JournalError::Upload(format!("audio upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JournalError::Upload(format!("{} - {}", status, body)));
        }

        let payload: UploadResponse = response
            .json()
            .await
            .map_err(|e| JournalError::Upload(format!("unreadable upload response: {}", e)))?;

        payload
            .upload_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| JournalError::Upload("response carried no upload_url".to_string()))
    }

    async fn submit_job(&self, audio_handle: &str, language: &str) -> Result<String> {
        let body = TranscriptRequest {
            audio_url: audio_handle,
            language_code: language,
            punctuate: true,
            format_text: true,
        };

        let response = self
            .http
            .post(format!("{}/transcript", self.endpoint))
            .header("authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| JournalError::JobSubmission(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JournalError::JobSubmission(format!("{} - {}", status, body)));
        }

        let payload: TranscriptResponse = response
            .json()
            .await
            .map_err(|e| JournalError::JobSubmission(format!("unreadable response: {}", e)))?;

        payload
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| JournalError::JobSubmission("response carried no job id".to_string()))
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus> {
        let response = self
            .http
            .get(format!("{}/transcript/{}", self.endpoint, job_id))
            .header("authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| JournalError::TranscriptionFailed(format!("status request failed: {}", e)))?;

        let response = response.error_for_status().map_err(|e| {
            JournalError::TranscriptionFailed(format!("status request rejected: {}", e))
        })?;

        response
            .json()
            .await
            .map_err(|e| JournalError::TranscriptionFailed(format!("unreadable status: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    language_code: &'a str,
    punctuate: bool,
    format_text: bool,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: Option<String>,
}
