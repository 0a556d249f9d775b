//! Capture session state machine

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::recording::{CaptureDevices, DeviceLease, DeviceRegistry, MediaCapture, MediaKind};
use crate::{JournalError, Result};

/// Lifecycle of a session: idle -> recording -> stopped, or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Recording,
    Stopped,
    Failed,
}

/// One capture producing one media file. Not reusable once stopped.
pub struct RecordingSession {
    devices: Arc<dyn CaptureDevices>,
    registry: DeviceRegistry,
    media_dir: PathBuf,

    status: SessionStatus,
    kind: Option<MediaKind>,
    media_path: Option<PathBuf>,
    started_at: Option<DateTime<Utc>>,

    capture: Option<Box<dyn MediaCapture>>,
    lease: Option<DeviceLease>,
}

impl RecordingSession {
    pub(crate) fn new(
        devices: Arc<dyn CaptureDevices>,
        registry: DeviceRegistry,
        media_dir: PathBuf,
    ) -> Self {
        Self {
            devices,
            registry,
            media_dir,
            status: SessionStatus::Idle,
            kind: None,
            media_path: None,
            started_at: None,
            capture: None,
            lease: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn kind(&self) -> Option<MediaKind> {
        self.kind
    }

    /// File being (or last) written
    pub fn media_path(&self) -> Option<&Path> {
        self.media_path.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Begin capturing. Only valid from `Idle`.
    pub fn start(&mut self, kind: MediaKind) -> Result<()> {
        match self.status {
            SessionStatus::Idle => {}
            SessionStatus::Recording => {
                return Err(JournalError::DeviceBusy(
                    "this session is already recording".to_string(),
                ))
            }
            SessionStatus::Stopped | SessionStatus::Failed => {
                return Err(JournalError::SessionFinished)
            }
        }

        // Taking the lease first makes the busy check atomic with acquisition
        let lease = self.registry.try_acquire(kind)?;

        if !self.devices.request_access(kind) {
            return Err(JournalError::Permission(format!(
                "{} access was not granted",
                kind.devices()
            )));
        }

        std::fs::create_dir_all(&self.media_dir)?;
        let path = unique_media_path(&self.media_dir, kind);

        let mut capture = self.devices.open(kind)?;
        if let Err(e) = capture.start(&path) {
            remove_partial(&path);
            return Err(e);
        }

        info!(
            "Recording {} to {} ({})",
            kind,
            path.display(),
            capture.backend_name()
        );

        self.status = SessionStatus::Recording;
        self.kind = Some(kind);
        self.media_path = Some(path);
        self.started_at = Some(Utc::now());
        self.capture = Some(capture);
        self.lease = Some(lease);
        Ok(())
    }

    /// Finalize the file and return its path. Only valid from `Recording`.
    pub fn stop(&mut self) -> Result<PathBuf> {
        if self.status != SessionStatus::Recording {
            return Err(JournalError::NoActiveRecording);
        }

        let mut capture = self.capture.take().ok_or(JournalError::NoActiveRecording)?;
        let result = capture.stop();
        drop(capture);
        self.lease.take();

        let path = self
            .media_path
            .clone()
            .ok_or(JournalError::NoActiveRecording)?;

        match result {
            Ok(()) => {
                self.status = SessionStatus::Stopped;
                info!("Recording stopped: {}", path.display());
                Ok(path)
            }
            Err(e) => {
                self.status = SessionStatus::Failed;
                warn!("Recording failed while stopping: {}", e);
                remove_partial(&path);
                Err(e)
            }
        }
    }

    /// Abandon a running capture: release the devices and delete the partial file
    pub fn cancel(&mut self) {
        if self.status != SessionStatus::Recording {
            return;
        }

        if let Some(mut capture) = self.capture.take() {
            if !capture.is_recording() {
                debug!("{} capture had already ended", capture.backend_name());
            } else if let Err(e) = capture.stop() {
                warn!("Error stopping abandoned capture: {}", e);
            }
        }
        self.lease.take();

        if let Some(path) = &self.media_path {
            remove_partial(path);
        }

        self.status = SessionStatus::Failed;
        info!("Recording abandoned");
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// `recording_<unix millis>.<ext>`, suffixed when the name is taken
fn unique_media_path(dir: &Path, kind: MediaKind) -> PathBuf {
    let stamp = Utc::now().timestamp_millis();
    let mut path = dir.join(format!("recording_{}.{}", stamp, kind.extension()));
    let mut suffix = 1;
    while path.exists() {
        path = dir.join(format!(
            "recording_{}_{}.{}",
            stamp,
            suffix,
            kind.extension()
        ));
        suffix += 1;
    }
    path
}

fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => info!("Removed partial capture {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial capture {}: {}", path.display(), e),
    }
}
