//! moodjournal - Mood journaling core: emotion analysis, voice entries and media upload
//!
//! Daily entries carry a note and a mood score. Notes are scored by a keyword
//! emotion analyzer, voice recordings are transcribed by a remote service and
//! merged into the note, and captured media is uploaded to object storage.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod recording;
pub mod storage;
pub mod transcription;
pub mod upload;
pub mod voice;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Pipeline stage a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Transcription,
    Upload,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transcription => write!(f, "transcription"),
            Self::Upload => write!(f, "upload"),
        }
    }
}

/// Main error type for moodjournal
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Capture device busy: {0}")]
    DeviceBusy(String),

    #[error("No active recording")]
    NoActiveRecording,

    #[error("Recording session already finished; start a new session")]
    SessionFinished,

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Invalid audio file: {0}")]
    InvalidAudioFile(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Transcription job rejected: {0}")]
    JobSubmission(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Transcription timed out after {attempts} polls")]
    TranscriptionTimeout { attempts: u32 },

    #[error("Transcription cancelled")]
    Cancelled,

    #[error("File not ready: {0}")]
    FileNotReady(String),

    #[error("Upload timed out after {}s", .0.as_secs())]
    UploadTimeout(Duration),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<JournalError>,
    },

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JournalError {
    /// Tag an error with the pipeline stage it came from
    pub fn at_stage(self, stage: PipelineStage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The underlying error with any stage tags removed
    pub fn root(&self) -> &JournalError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stage the error was tagged with, if any
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "moodjournal";
