mod common;

use anyhow::Result;
use tempfile::tempdir;

use common::FakeDevices;
use moodjournal::recording::{MediaKind, Recorder, SessionStatus};
use moodjournal::JournalError;

#[test]
fn session_records_one_file() -> Result<()> {
    let tmp = tempdir()?;
    let recorder = Recorder::new(FakeDevices::granted(), tmp.path().join("media"));
    let mut session = recorder.session();
    assert_eq!(session.status(), SessionStatus::Idle);

    session.start(MediaKind::Audio)?;
    assert_eq!(session.status(), SessionStatus::Recording);
    assert!(session.started_at().is_some());
    assert!(recorder.is_busy());

    let path = session.stop()?;
    assert_eq!(session.status(), SessionStatus::Stopped);
    assert!(!recorder.is_busy());
    assert_eq!(std::fs::read(&path)?, b"complete media");

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("recording_"));
    assert!(name.ends_with(".wav"));

    // One-shot: a stopped session cannot be restarted
    assert!(matches!(
        session.start(MediaKind::Audio),
        Err(JournalError::SessionFinished)
    ));

    Ok(())
}

#[test]
fn second_start_is_rejected_without_disturbing_first() -> Result<()> {
    let tmp = tempdir()?;
    let recorder = Recorder::new(FakeDevices::granted(), tmp.path());
    let mut session = recorder.session();

    session.start(MediaKind::Audio)?;
    let first_path = session.media_path().map(|p| p.to_path_buf());

    assert!(matches!(
        session.start(MediaKind::Audio),
        Err(JournalError::DeviceBusy(_))
    ));
    assert_eq!(session.status(), SessionStatus::Recording);
    assert_eq!(session.media_path().map(|p| p.to_path_buf()), first_path);

    let path = session.stop()?;
    assert!(path.exists());

    Ok(())
}

#[test]
fn concurrent_sessions_share_the_device_lock() -> Result<()> {
    let tmp = tempdir()?;
    let devices = FakeDevices::granted();
    let recorder = Recorder::new(devices.clone(), tmp.path());

    let mut first = recorder.session();
    let mut second = recorder.session();

    first.start(MediaKind::Audio)?;
    assert!(matches!(
        second.start(MediaKind::Video),
        Err(JournalError::DeviceBusy(_))
    ));
    assert_eq!(second.status(), SessionStatus::Idle);
    assert_eq!(first.status(), SessionStatus::Recording);
    assert_eq!(devices.opened.load(std::sync::atomic::Ordering::SeqCst), 1);

    first.stop()?;
    second.start(MediaKind::Video)?;
    let video = second.stop()?;
    assert_eq!(video.extension().unwrap(), "mp4");

    Ok(())
}

#[test]
fn denied_access_reports_permission_and_frees_devices() -> Result<()> {
    let tmp = tempdir()?;
    let recorder = Recorder::new(FakeDevices::denied(), tmp.path());
    let mut session = recorder.session();

    match session.start(MediaKind::Video) {
        Err(JournalError::Permission(msg)) => assert!(msg.contains("camera")),
        other => panic!("expected permission error, got {:?}", other),
    }
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(!recorder.is_busy());

    Ok(())
}

#[test]
fn stop_without_start_fails() {
    let tmp = tempdir().unwrap();
    let recorder = Recorder::new(FakeDevices::granted(), tmp.path());
    let mut session = recorder.session();

    assert!(matches!(session.stop(), Err(JournalError::NoActiveRecording)));
}

#[test]
fn cancel_deletes_partial_file_and_releases_devices() -> Result<()> {
    let tmp = tempdir()?;
    let recorder = Recorder::new(FakeDevices::granted(), tmp.path());
    let mut session = recorder.session();

    session.start(MediaKind::Audio)?;
    let path = session.media_path().unwrap().to_path_buf();
    assert!(path.exists());

    session.cancel();
    assert!(!path.exists());
    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(!recorder.is_busy());
    assert!(matches!(session.stop(), Err(JournalError::NoActiveRecording)));

    Ok(())
}

#[test]
fn cancel_leaves_an_ended_capture_alone() -> Result<()> {
    let tmp = tempdir()?;
    let devices = FakeDevices::losing_stream();
    let recorder = Recorder::new(devices.clone(), tmp.path());
    let mut session = recorder.session();

    session.start(MediaKind::Audio)?;
    let path = session.media_path().unwrap().to_path_buf();

    session.cancel();
    assert_eq!(devices.stop_count(), 0);
    assert!(!path.exists());
    assert!(!recorder.is_busy());

    Ok(())
}

#[test]
fn cancel_stops_a_live_capture() -> Result<()> {
    let tmp = tempdir()?;
    let devices = FakeDevices::granted();
    let recorder = Recorder::new(devices.clone(), tmp.path());
    let mut session = recorder.session();

    session.start(MediaKind::Audio)?;
    session.cancel();
    assert_eq!(devices.stop_count(), 1);

    Ok(())
}

#[test]
fn dropping_a_recording_session_cleans_up() -> Result<()> {
    let tmp = tempdir()?;
    let recorder = Recorder::new(FakeDevices::granted(), tmp.path());

    let path = {
        let mut session = recorder.session();
        session.start(MediaKind::Audio)?;
        session.media_path().unwrap().to_path_buf()
    };

    assert!(!path.exists());
    assert!(!recorder.is_busy());

    Ok(())
}

#[test]
fn capture_failure_on_stop_marks_session_failed() -> Result<()> {
    let tmp = tempdir()?;
    let recorder = Recorder::new(FakeDevices::failing_on_stop(), tmp.path());
    let mut session = recorder.session();

    session.start(MediaKind::Audio)?;
    let path = session.media_path().unwrap().to_path_buf();

    assert!(matches!(session.stop(), Err(JournalError::Capture(_))));
    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(!path.exists());
    assert!(!recorder.is_busy());

    Ok(())
}
