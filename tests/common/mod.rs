#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use moodjournal::recording::{CaptureDevices, MediaCapture, MediaKind};
use moodjournal::transcription::{JobState, JobStatus, Sleeper, TranscriptionApi};
use moodjournal::upload::{ObjectStore, UploadMedia};
use moodjournal::{JournalError, Result};

pub fn run_moodjournal(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_moodjournal"))
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env_remove("MOODJOURNAL_TRANSCRIPTION_API_KEY")
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to execute moodjournal binary")
    }

    pub fn config_path(&self) -> PathBuf {
        let output = self.run(&["config", "path"]);
        assert!(
            output.status.success(),
            "config path should succeed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        let path = String::from_utf8_lossy(&output.stdout);
        PathBuf::from(path.trim())
    }

    pub fn write_config(&self, contents: &str) {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("create config parent directory");
        }
        std::fs::write(&config_path, contents).expect("write config file");
    }
}

/// Write a silent mono WAV of the given length
pub fn write_wav(path: &Path, secs: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for _ in 0..(8000 * secs) {
        writer.write_sample(0i16).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

// Capture devices

/// Devices that write a placeholder file instead of touching hardware
pub struct FakeDevices {
    pub grant_access: bool,
    pub fail_on_stop: bool,
    pub stream_lost: bool,
    pub opened: AtomicU32,
    pub stops: Arc<AtomicU32>,
}

impl FakeDevices {
    fn build(grant_access: bool, fail_on_stop: bool, stream_lost: bool) -> Arc<Self> {
        Arc::new(Self {
            grant_access,
            fail_on_stop,
            stream_lost,
            opened: AtomicU32::new(0),
            stops: Arc::new(AtomicU32::new(0)),
        })
    }

    pub fn granted() -> Arc<Self> {
        Self::build(true, false, false)
    }

    pub fn denied() -> Arc<Self> {
        Self::build(false, false, false)
    }

    pub fn failing_on_stop() -> Arc<Self> {
        Self::build(true, true, false)
    }

    /// The stream dies right after starting, as when a headset is unplugged
    pub fn losing_stream() -> Arc<Self> {
        Self::build(true, false, true)
    }

    pub fn stop_count(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }
}

impl CaptureDevices for FakeDevices {
    fn request_access(&self, _kind: MediaKind) -> bool {
        self.grant_access
    }

    fn open(&self, _kind: MediaKind) -> Result<Box<dyn MediaCapture>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeCapture {
            path: None,
            fail_on_stop: self.fail_on_stop,
            stream_lost: self.stream_lost,
            stops: self.stops.clone(),
        }))
    }
}

struct FakeCapture {
    path: Option<PathBuf>,
    fail_on_stop: bool,
    stream_lost: bool,
    stops: Arc<AtomicU32>,
}

impl MediaCapture for FakeCapture {
    fn start(&mut self, output_path: &Path) -> Result<()> {
        std::fs::write(output_path, b"partial")?;
        self.path = Some(output_path.to_path_buf());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        let path = self.path.take().ok_or(JournalError::NoActiveRecording)?;
        if self.fail_on_stop {
            return Err(JournalError::Capture("device unplugged".to_string()));
        }
        std::fs::write(path, b"complete media")?;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.path.is_some() && !self.stream_lost
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}

// Transcription service

/// Scripted transcription service. Status responses are served in order;
/// once the script runs out every poll reports `processing`.
pub struct ScriptedApi {
    pub upload_error: Option<String>,
    pub submit_error: Option<String>,
    statuses: Mutex<VecDeque<JobStatus>>,
    pub uploads: AtomicU32,
    pub submissions: AtomicU32,
    pub polls: AtomicU32,
    pub languages: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new(statuses: Vec<JobStatus>) -> Self {
        Self {
            upload_error: None,
            submit_error: None,
            statuses: Mutex::new(statuses.into()),
            uploads: AtomicU32::new(0),
            submissions: AtomicU32::new(0),
            polls: AtomicU32::new(0),
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn completing_with(text: &str) -> Self {
        Self::new(vec![
            JobStatus::pending(JobState::Queued),
            JobStatus::pending(JobState::Processing),
            JobStatus::completed(text, Some(0.92)),
        ])
    }

    pub fn never_finishing() -> Self {
        Self::new(Vec::new())
    }

    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionApi for ScriptedApi {
    async fn upload_audio(&self, audio: Vec<u8>) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.upload_error {
            return Err(JournalError::Upload(err.clone()));
        }
        Ok(format!("https://audio.test/{}", audio.len()))
    }

    async fn submit_job(&self, _audio_handle: &str, language: &str) -> Result<String> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().unwrap().push(language.to_string());
        if let Some(err) = &self.submit_error {
            return Err(JournalError::JobSubmission(err.clone()));
        }
        Ok("job-1".to_string())
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| JobStatus::pending(JobState::Processing)))
    }
}

/// Records requested delays and returns immediately
#[derive(Default)]
pub struct InstantSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl InstantSleeper {
    pub fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

// Object storage

pub enum StoreBehaviour {
    Succeed,
    Reject(String),
    Hang,
}

/// Object store double that remembers what it was sent
pub struct FakeStore {
    behaviour: StoreBehaviour,
    pub received: Mutex<Vec<(String, &'static str, String, usize)>>,
}

impl FakeStore {
    pub fn new(behaviour: StoreBehaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            received: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(&self, media: UploadMedia, folder: &str) -> Result<String> {
        self.received.lock().unwrap().push((
            media.file_name.clone(),
            media.content_type,
            folder.to_string(),
            media.bytes.len(),
        ));

        match &self.behaviour {
            StoreBehaviour::Succeed => Ok(format!(
                "https://cdn.test/{}/{}",
                folder, media.file_name
            )),
            StoreBehaviour::Reject(status) => Err(JournalError::Upload(status.clone())),
            StoreBehaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("unreachable".to_string())
            }
        }
    }
}
