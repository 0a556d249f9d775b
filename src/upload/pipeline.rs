use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::transcription::{Sleeper, TokioSleeper};
use crate::upload::cloudinary::{CloudinaryStore, ObjectStore, UploadMedia};
use crate::upload::library::{LocalMediaLibrary, MediaLibrary};
use crate::{JournalError, Result};

/// Remote folder for captures made on `date`, e.g. `journal/2024-03-15`
pub fn daily_folder(prefix: &str, date: NaiveDate) -> String {
    let prefix = prefix.trim().trim_matches('/');
    let day = date.format("%Y-%m-%d");
    if prefix.is_empty() {
        day.to_string()
    } else {
        format!("{}/{}", prefix, day)
    }
}

/// Deletes the temporary capture when dropped, including when the upload
/// future is dropped mid-flight.
struct TempFileGuard(PathBuf);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => debug!("Removed temporary capture {}", self.0.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", self.0.display(), e),
        }
    }
}

/// Verify, archive, upload, clean up
pub struct MediaUploadPipeline {
    store: Arc<dyn ObjectStore>,
    library: Option<Arc<dyn MediaLibrary>>,
    sleeper: Arc<dyn Sleeper>,
    verify_attempts: u32,
    verify_delay: Duration,
    timeout: Duration,
}

impl MediaUploadPipeline {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            library: None,
            sleeper: Arc::new(TokioSleeper),
            verify_attempts: 3,
            verify_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(90),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = Arc::new(CloudinaryStore::from_settings(settings)?);
        let library = Arc::new(LocalMediaLibrary::new(settings.upload.library_dir.clone()));

        Ok(Self::new(store)
            .with_library(library)
            .with_verify_policy(settings.upload.verify_attempts, settings.upload.verify_delay())
            .with_timeout(settings.upload.timeout()))
    }

    pub fn with_library(mut self, library: Arc<dyn MediaLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_verify_policy(mut self, attempts: u32, delay: Duration) -> Self {
        self.verify_attempts = attempts.max(1);
        self.verify_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upload a finished capture and return its public URL.
    ///
    /// The local file is deleted on every path out of this call.
    pub async fn upload_recording(&self, local: &Path, folder: &str) -> Result<String> {
        let _cleanup = TempFileGuard(local.to_path_buf());

        match tokio::time::timeout(self.timeout, self.run(local, folder)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Upload of {} exceeded {}s",
                    local.display(),
                    self.timeout.as_secs()
                );
                Err(JournalError::UploadTimeout(self.timeout))
            }
        }
    }

    async fn run(&self, local: &Path, folder: &str) -> Result<String> {
        self.wait_until_ready(local).await?;

        if let Some(library) = &self.library {
            self.save_to_library(library.clone(), local).await;
        }

        let bytes = tokio::fs::read(local)
            .await
            .map_err(|e| JournalError::FileNotReady(format!("{}: {}", local.display(), e)))?;
        let media = UploadMedia::new(local, bytes);

        info!(
            "Uploading {} ({} bytes, {}) to {}",
            media.file_name,
            media.bytes.len(),
            media.content_type,
            folder
        );

        let url = self.store.upload(media, folder).await?;
        info!("Upload complete: {}", url);
        Ok(url)
    }

    /// Copies off the runtime so a slow disk cannot hold back the timeout.
    /// Failures are logged and the upload goes ahead without the copy.
    async fn save_to_library(&self, library: Arc<dyn MediaLibrary>, local: &Path) {
        let path = local.to_path_buf();
        match tokio::task::spawn_blocking(move || library.save(&path)).await {
            Ok(Ok(saved)) => debug!("Library copy at {}", saved.display()),
            Ok(Err(e)) => warn!("Could not save {} to media library: {}", local.display(), e),
            Err(e) => warn!("Media library task for {} failed: {}", local.display(), e),
        }
    }

    async fn wait_until_ready(&self, local: &Path) -> Result<()> {
        for attempt in 1..=self.verify_attempts {
            match tokio::fs::metadata(local).await {
                Ok(meta) if meta.is_file() && meta.len() > 0 => return Ok(()),
                Ok(_) => debug!("{} not ready yet (attempt {})", local.display(), attempt),
                Err(e) => debug!("{} not readable yet (attempt {}): {}", local.display(), attempt, e),
            }

            if attempt < self.verify_attempts {
                self.sleeper.sleep(self.verify_delay).await;
            }
        }

        Err(JournalError::FileNotReady(format!(
            "{} missing or empty after {} checks",
            local.display(),
            self.verify_attempts
        )))
    }
}
