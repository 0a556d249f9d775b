//! Configuration module for moodjournal
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{
    GeneralSettings, RecordingSettings, Settings, TranscriptionSettings, UploadSettings,
};
