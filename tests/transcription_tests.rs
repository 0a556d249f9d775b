mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;
use tokio::sync::watch;

use common::{write_wav, InstantSleeper, ScriptedApi};
use moodjournal::transcription::{JobState, JobStatus, TranscriptionClient, DEFAULT_CONFIDENCE};
use moodjournal::JournalError;

fn client(api: Arc<ScriptedApi>, sleeper: Arc<InstantSleeper>) -> TranscriptionClient {
    TranscriptionClient::new(api).with_sleeper(sleeper)
}

#[tokio::test]
async fn returns_transcript_once_job_completes() {
    let tmp = tempdir().unwrap();
    let audio = tmp.path().join("memo.wav");
    write_wav(&audio, 2);

    let api = Arc::new(ScriptedApi::completing_with("Je suis très content"));
    let sleeper = Arc::new(InstantSleeper::default());
    let transcript = client(api.clone(), sleeper.clone())
        .transcribe(&audio)
        .await
        .unwrap();

    assert_eq!(transcript.text, "Je suis très content");
    assert_eq!(transcript.confidence, 0.92);
    assert_eq!(api.poll_count(), 3);
    assert_eq!(api.languages.lock().unwrap().as_slice(), ["fr"]);
    assert_eq!(
        *sleeper.sleeps.lock().unwrap(),
        vec![Duration::from_secs(2); 2]
    );
}

#[tokio::test]
async fn gives_up_after_thirty_polls() {
    let tmp = tempdir().unwrap();
    let audio = tmp.path().join("memo.wav");
    write_wav(&audio, 1);

    let api = Arc::new(ScriptedApi::never_finishing());
    let sleeper = Arc::new(InstantSleeper::default());
    let err = client(api.clone(), sleeper.clone())
        .transcribe(&audio)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        JournalError::TranscriptionTimeout { attempts: 30 }
    ));
    assert_eq!(api.poll_count(), 30);
    assert_eq!(sleeper.count(), 29);
}

#[tokio::test]
async fn service_error_carries_its_detail() {
    let tmp = tempdir().unwrap();
    let audio = tmp.path().join("memo.wav");
    write_wav(&audio, 1);

    let api = Arc::new(ScriptedApi::new(vec![
        JobStatus::pending(JobState::Queued),
        JobStatus::failed("audio duration is too short"),
    ]));
    let err = client(api, Arc::new(InstantSleeper::default()))
        .transcribe(&audio)
        .await
        .unwrap_err();

    match err {
        JournalError::TranscriptionFailed(detail) => {
            assert_eq!(detail, "audio duration is too short")
        }
        other => panic!("expected TranscriptionFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_transcript_is_a_success() {
    let tmp = tempdir().unwrap();
    let audio = tmp.path().join("memo.wav");
    write_wav(&audio, 1);

    let api = Arc::new(ScriptedApi::new(vec![JobStatus::completed("", None)]));
    let transcript = client(api, Arc::new(InstantSleeper::default()))
        .transcribe(&audio)
        .await
        .unwrap();

    assert_eq!(transcript.text, "");
    assert_eq!(transcript.confidence, DEFAULT_CONFIDENCE);
}

#[tokio::test]
async fn missing_or_empty_file_is_rejected_before_upload() {
    let tmp = tempdir().unwrap();
    let empty = tmp.path().join("empty.wav");
    std::fs::write(&empty, b"").unwrap();

    let api = Arc::new(ScriptedApi::completing_with("jamais"));
    let client = client(api.clone(), Arc::new(InstantSleeper::default()));

    for path in [empty, tmp.path().join("missing.wav")] {
        let err = client.transcribe(&path).await.unwrap_err();
        assert!(matches!(err, JournalError::InvalidAudioFile(_)));
    }
    assert_eq!(api.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_and_submission_failures_stop_the_pipeline() {
    let tmp = tempdir().unwrap();
    let audio = tmp.path().join("memo.wav");
    write_wav(&audio, 1);

    let mut rejecting_upload = ScriptedApi::completing_with("x");
    rejecting_upload.upload_error = Some("413 Payload Too Large".to_string());
    let api = Arc::new(rejecting_upload);
    let err = client(api.clone(), Arc::new(InstantSleeper::default()))
        .transcribe(&audio)
        .await
        .unwrap_err();
    assert!(matches!(err, JournalError::Upload(_)));
    assert_eq!(api.submissions.load(Ordering::SeqCst), 0);

    let mut rejecting_job = ScriptedApi::completing_with("x");
    rejecting_job.submit_error = Some("400 invalid language_code".to_string());
    let api = Arc::new(rejecting_job);
    let err = client(api.clone(), Arc::new(InstantSleeper::default()))
        .transcribe(&audio)
        .await
        .unwrap_err();
    assert!(matches!(err, JournalError::JobSubmission(_)));
    assert_eq!(api.poll_count(), 0);
}

#[tokio::test]
async fn cancellation_stops_polling() {
    let tmp = tempdir().unwrap();
    let audio = tmp.path().join("memo.wav");
    write_wav(&audio, 1);

    // Real sleeps so the poll loop yields long enough to be cancelled
    let api = Arc::new(ScriptedApi::never_finishing());
    let client = TranscriptionClient::new(api.clone())
        .with_poll_policy(Duration::from_millis(20), 1000);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = cancel_tx.send(true);
    });

    let err = client
        .transcribe_cancellable(&audio, cancel_rx)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, JournalError::Cancelled));
    assert!(api.poll_count() < 1000);
}

#[tokio::test]
async fn custom_language_and_poll_policy() {
    let tmp = tempdir().unwrap();
    let audio = tmp.path().join("memo.wav");
    write_wav(&audio, 1);

    let api = Arc::new(ScriptedApi::never_finishing());
    let sleeper = Arc::new(InstantSleeper::default());
    let err = TranscriptionClient::new(api.clone())
        .with_sleeper(sleeper.clone())
        .with_language("en")
        .with_poll_policy(Duration::from_millis(500), 5)
        .transcribe(&audio)
        .await
        .unwrap_err();

    assert!(matches!(err, JournalError::TranscriptionTimeout { attempts: 5 }));
    assert_eq!(api.languages.lock().unwrap().as_slice(), ["en"]);
    assert_eq!(
        *sleeper.sleeps.lock().unwrap(),
        vec![Duration::from_millis(500); 4]
    );
}
