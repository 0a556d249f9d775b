use async_trait::async_trait;
use serde::Deserialize;

use crate::Result;

/// Server-side state of a transcription job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

/// One poll response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobStatus {
    pub fn pending(status: JobState) -> Self {
        Self {
            status,
            text: None,
            confidence: None,
            error: None,
        }
    }

    pub fn completed(text: &str, confidence: Option<f64>) -> Self {
        Self {
            status: JobState::Completed,
            text: Some(text.to_string()),
            confidence,
            error: None,
        }
    }

    pub fn failed(error: &str) -> Self {
        Self {
            status: JobState::Error,
            text: None,
            confidence: None,
            error: Some(error.to_string()),
        }
    }
}

/// Remote speech-to-text service: ingest audio, submit a job, poll it.
#[async_trait]
pub trait TranscriptionApi: Send + Sync {
    /// Upload raw audio, returning the handle jobs refer to. Fails with `Upload`.
    async fn upload_audio(&self, audio: Vec<u8>) -> Result<String>;

    /// Start a job, returning its id. Fails with `JobSubmission`.
    async fn submit_job(&self, audio_handle: &str, language: &str) -> Result<String>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatus>;
}
