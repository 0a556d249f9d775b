//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Audio/video capture settings
    #[serde(default)]
    pub recording: RecordingSettings,

    /// Remote speech-to-text settings
    #[serde(default)]
    pub transcription: TranscriptionSettings,

    /// Object storage upload settings
    #[serde(default)]
    pub upload: UploadSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for the journal database and media
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Identity entries are stored under
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    /// Capture sample rate
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Directory temporary captures are written to
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionSettings {
    /// Transcription provider (assemblyai)
    #[serde(default = "default_transcription_provider")]
    pub provider: String,

    /// API key for the provider
    #[serde(default)]
    pub api_key: String,

    /// API base URL
    #[serde(default = "default_transcription_endpoint")]
    pub endpoint: String,

    /// Language hint sent with each job
    #[serde(default = "default_language")]
    pub language: String,

    /// Seconds between job status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum number of status polls before giving up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Object storage base URL (resource type and `/upload` are appended)
    #[serde(default = "default_upload_endpoint")]
    pub endpoint: String,

    /// Unsigned upload preset
    #[serde(default = "default_upload_preset")]
    pub preset: String,

    /// Remote folder prefix, a dated subfolder is appended per upload
    #[serde(default = "default_folder_prefix")]
    pub folder_prefix: String,

    /// Wall-clock ceiling for a whole upload, kept within 90..=120
    #[serde(default = "default_upload_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of file readiness checks before giving up
    #[serde(default = "default_verify_attempts")]
    pub verify_attempts: u32,

    /// Delay between readiness checks
    #[serde(default = "default_verify_delay_ms")]
    pub verify_delay_ms: u64,

    /// Durable local copy of every uploaded capture
    #[serde(default = "default_library_dir")]
    pub library_dir: PathBuf,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "moodjournal", "moodjournal")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/moodjournal"))
}

fn default_media_dir() -> PathBuf {
    default_data_dir().join("media")
}

fn default_library_dir() -> PathBuf {
    default_data_dir().join("library")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_id() -> String {
    "local".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_channels() -> u16 {
    1
}

fn default_transcription_provider() -> String {
    "assemblyai".to_string()
}

fn default_transcription_endpoint() -> String {
    "https://api.assemblyai.com/v2".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_poll_attempts() -> u32 {
    30
}

fn default_upload_endpoint() -> String {
    "https://api.cloudinary.com/v1_1/moodjournal".to_string()
}

fn default_upload_preset() -> String {
    "expo-upload".to_string()
}

fn default_folder_prefix() -> String {
    "journal".to_string()
}

fn default_upload_timeout_secs() -> u64 {
    90
}

fn default_verify_attempts() -> u32 {
    3
}

fn default_verify_delay_ms() -> u64 {
    1000
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            user_id: default_user_id(),
        }
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            media_dir: default_media_dir(),
        }
    }
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: default_transcription_provider(),
            api_key: String::new(),
            endpoint: default_transcription_endpoint(),
            language: default_language(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            endpoint: default_upload_endpoint(),
            preset: default_upload_preset(),
            folder_prefix: default_folder_prefix(),
            timeout_secs: default_upload_timeout_secs(),
            verify_attempts: default_verify_attempts(),
            verify_delay_ms: default_verify_delay_ms(),
            library_dir: default_library_dir(),
        }
    }
}

impl TranscriptionSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Bounds for the overall upload ceiling, in seconds
pub const MIN_UPLOAD_TIMEOUT_SECS: u64 = 90;
pub const MAX_UPLOAD_TIMEOUT_SECS: u64 = 120;

impl UploadSettings {
    /// Overall upload ceiling, held within 90..=120 seconds
    pub fn timeout(&self) -> Duration {
        let secs = self
            .timeout_secs
            .clamp(MIN_UPLOAD_TIMEOUT_SECS, MAX_UPLOAD_TIMEOUT_SECS);
        if secs != self.timeout_secs {
            tracing::warn!(
                "upload.timeout_secs = {} is outside {}..={}, using {}",
                self.timeout_secs,
                MIN_UPLOAD_TIMEOUT_SECS,
                MAX_UPLOAD_TIMEOUT_SECS,
                secs
            );
        }
        Duration::from_secs(secs)
    }

    pub fn verify_delay(&self) -> Duration {
        Duration::from_millis(self.verify_delay_ms)
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        Self::load_from(&config_path)
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if self.transcription.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("MOODJOURNAL_TRANSCRIPTION_API_KEY") {
                if !key.trim().is_empty() {
                    self.transcription.api_key = key;
                }
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "moodjournal", "moodjournal")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the database path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join("journal.db")
    }

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.general.data_dir)?;
        std::fs::create_dir_all(&self.recording.media_dir)?;
        std::fs::create_dir_all(&self.upload.library_dir)?;
        Ok(())
    }
}
