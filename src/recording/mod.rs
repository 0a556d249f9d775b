//! Recording module for moodjournal
//!
//! One-shot capture sessions writing a single media file, guarded by an
//! exclusive device registry so that only one session records at a time.

mod cpal_capture;
mod registry;
mod session;

pub use cpal_capture::{CpalCapture, CpalDevices};
pub use registry::{DeviceLease, DeviceRegistry};
pub use session::{RecordingSession, SessionStatus};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;

/// What a session captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Extension of files written for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Audio => "wav",
            Self::Video => "mp4",
        }
    }

    /// Guess the kind from a file extension; anything not video is audio
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("mp4") | Some("mov") => Self::Video,
            _ => Self::Audio,
        }
    }

    /// Hardware the kind needs, for permission messages
    pub fn devices(&self) -> &'static str {
        match self {
            Self::Audio => "microphone",
            Self::Video => "camera and microphone",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// A running capture writing to one file
///
/// Abstracts over capture backends (cpal for audio, platform cameras).
pub trait MediaCapture {
    /// Start capturing to the given path
    fn start(&mut self, output_path: &Path) -> Result<()>;

    /// Stop capturing and finalize the file
    fn stop(&mut self) -> Result<()>;

    /// Check if currently recording
    fn is_recording(&self) -> bool;

    /// Get capture backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Access to the host's capture hardware
pub trait CaptureDevices {
    /// Ask for access to the devices `kind` needs; `false` means denied
    fn request_access(&self, kind: MediaKind) -> bool;

    /// Open a capture for `kind`
    fn open(&self, kind: MediaKind) -> Result<Box<dyn MediaCapture>>;
}

/// Hands out recording sessions that share one device registry
#[derive(Clone)]
pub struct Recorder {
    devices: Arc<dyn CaptureDevices>,
    registry: DeviceRegistry,
    media_dir: PathBuf,
}

impl Recorder {
    pub fn new(devices: Arc<dyn CaptureDevices>, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            devices,
            registry: DeviceRegistry::new(),
            media_dir: media_dir.into(),
        }
    }

    /// A fresh idle session
    pub fn session(&self) -> RecordingSession {
        RecordingSession::new(
            self.devices.clone(),
            self.registry.clone(),
            self.media_dir.clone(),
        )
    }

    /// Whether some session currently holds the devices
    pub fn is_busy(&self) -> bool {
        self.registry.is_busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(MediaKind::from_path(Path::new("clip.MP4")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("memo.m4a")), MediaKind::Audio);
        assert_eq!(MediaKind::from_path(Path::new("noext")), MediaKind::Audio);
    }
}
