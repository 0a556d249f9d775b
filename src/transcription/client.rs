//! Upload, submit and poll a transcription job

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::transcription::api::{JobState, JobStatus, TranscriptionApi};
use crate::transcription::assemblyai::AssemblyAiApi;
use crate::{JournalError, Result};

/// Confidence reported when the service omits one
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Finished transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// May be empty; callers decide whether that matters
    pub text: String,
    pub confidence: f64,
}

/// Delay between polls, injectable so tests need no real time
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Progress of polling one job
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Waiting { attempts: u32 },
    Completed(Transcript),
    Failed(String),
    TimedOut { attempts: u32 },
}

impl PollState {
    /// Fold one status response into the state
    pub fn advance(self, status: JobStatus, max_attempts: u32) -> PollState {
        let attempts = match self {
            PollState::Waiting { attempts } => attempts + 1,
            finished => return finished,
        };

        match status.status {
            JobState::Completed => PollState::Completed(Transcript {
                text: status.text.unwrap_or_default(),
                confidence: status.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            }),
            JobState::Error => PollState::Failed(
                status
                    .error
                    .unwrap_or_else(|| "service reported an error without detail".to_string()),
            ),
            _ if attempts >= max_attempts => PollState::TimedOut { attempts },
            _ => PollState::Waiting { attempts },
        }
    }
}

/// Speech-to-text over a remote job API. One attempt per call, no retries.
pub struct TranscriptionClient {
    api: Arc<dyn TranscriptionApi>,
    sleeper: Arc<dyn Sleeper>,
    language: String,
    poll_interval: Duration,
    max_attempts: u32,
}

impl TranscriptionClient {
    pub fn new(api: Arc<dyn TranscriptionApi>) -> Self {
        Self {
            api,
            sleeper: Arc::new(TokioSleeper),
            language: "fr".to_string(),
            poll_interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }

    /// Build a client for the configured provider
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api: Arc<dyn TranscriptionApi> =
            match settings.transcription.provider.to_lowercase().as_str() {
                "assemblyai" => Arc::new(AssemblyAiApi::from_settings(settings)?),
                other => {
                    return Err(JournalError::Config(format!(
                        "Unsupported transcription.provider '{}'. Supported providers: assemblyai",
                        other
                    )))
                }
            };

        Ok(Self::new(api)
            .with_language(&settings.transcription.language)
            .with_poll_policy(
                settings.transcription.poll_interval(),
                settings.transcription.max_poll_attempts,
            ))
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_poll_policy(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Transcribe a local audio file
    pub async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let audio = read_audio(audio_path).await?;
        info!(
            "Uploading {} ({} bytes) for transcription",
            audio_path.display(),
            audio.len()
        );

        let handle = self.api.upload_audio(audio).await?;
        let job_id = self.api.submit_job(&handle, &self.language).await?;
        info!("Transcription job {} submitted", job_id);

        self.poll(&job_id).await
    }

    /// Like [`transcribe`](Self::transcribe), but stops waiting as soon as
    /// `cancel` turns `true`. The remote job is left running.
    pub async fn transcribe_cancellable(
        &self,
        audio_path: &Path,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<Transcript> {
        tokio::select! {
            result = self.transcribe(audio_path) => result,
            _ = cancelled(&mut cancel) => {
                info!("Transcription of {} cancelled by caller", audio_path.display());
                Err(JournalError::Cancelled)
            }
        }
    }

    async fn poll(&self, job_id: &str) -> Result<Transcript> {
        let mut state = PollState::Waiting { attempts: 0 };

        loop {
            let status = self.api.job_status(job_id).await?;
            state = state.advance(status, self.max_attempts);

            match state {
                PollState::Waiting { attempts } => {
                    debug!(
                        "Transcription {} pending ({}/{})",
                        job_id, attempts, self.max_attempts
                    );
                    self.sleeper.sleep(self.poll_interval).await;
                }
                PollState::Completed(transcript) => {
                    info!(
                        "Transcription {} completed ({} chars)",
                        job_id,
                        transcript.text.len()
                    );
                    return Ok(transcript);
                }
                PollState::Failed(detail) => {
                    warn!("Transcription {} failed: {}", job_id, detail);
                    return Err(JournalError::TranscriptionFailed(detail));
                }
                PollState::TimedOut { attempts } => {
                    warn!("Transcription {} timed out after {} polls", job_id, attempts);
                    return Err(JournalError::TranscriptionTimeout { attempts });
                }
            }
        }
    }
}

async fn read_audio(path: &Path) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        JournalError::InvalidAudioFile(format!("{}: {}", path.display(), e))
    })?;

    if !metadata.is_file() || metadata.len() == 0 {
        return Err(JournalError::InvalidAudioFile(format!(
            "{} is empty or not a file",
            path.display()
        )));
    }

    tokio::fs::read(path)
        .await
        .map_err(|e| JournalError::InvalidAudioFile(format!("{}: {}", path.display(), e)))
}

// Resolves once the flag is set; a dropped sender never cancels.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|flag| *flag).await.is_err() {
        std::future::pending::<()>().await;
    }
}
