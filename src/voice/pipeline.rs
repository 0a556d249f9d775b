use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::analysis::{EmotionAnalysis, EmotionAnalyzer};
use crate::transcription::{Transcript, TranscriptionClient};
use crate::upload::MediaUploadPipeline;
use crate::voice::features::{CombinedScore, VoiceFeatures};
use crate::{JournalError, PipelineStage, Result};

/// Everything learned from one voice entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAnalysis {
    pub transcription: String,
    pub confidence: f64,
    /// Existing note and transcript, space-joined
    pub full_text: String,
    pub emotion_analysis: EmotionAnalysis,
    pub voice_features: VoiceFeatures,
    pub combined_score: CombinedScore,
}

/// Analysis plus the uploaded capture's URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceEntryOutcome {
    pub analysis: VoiceAnalysis,
    pub media_url: String,
}

pub struct VoiceEntryPipeline<'t> {
    transcriber: TranscriptionClient,
    analyzer: EmotionAnalyzer<'t>,
    uploader: Option<MediaUploadPipeline>,
}

impl<'t> VoiceEntryPipeline<'t> {
    pub fn new(transcriber: TranscriptionClient, analyzer: EmotionAnalyzer<'t>) -> Self {
        Self {
            transcriber,
            analyzer,
            uploader: None,
        }
    }

    pub fn with_uploader(mut self, uploader: MediaUploadPipeline) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Transcribe `audio` and analyze it together with the existing note.
    ///
    /// Transcription failures come back tagged with their stage. The audio
    /// file is left in place.
    pub async fn process_voice_entry(
        &self,
        audio: &Path,
        existing_note: &str,
    ) -> Result<VoiceAnalysis> {
        let transcript = self
            .transcriber
            .transcribe(audio)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Transcription))?;

        Ok(self.analyze(audio, existing_note, transcript))
    }

    /// Like [`process_voice_entry`](Self::process_voice_entry), abandoning the
    /// transcription once `cancel` turns `true`.
    pub async fn process_voice_entry_cancellable(
        &self,
        audio: &Path,
        existing_note: &str,
        cancel: watch::Receiver<bool>,
    ) -> Result<VoiceAnalysis> {
        let transcript = self
            .transcriber
            .transcribe_cancellable(audio, cancel)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Transcription))?;

        Ok(self.analyze(audio, existing_note, transcript))
    }

    /// Analyze the entry, then upload the capture. The capture is deleted
    /// afterwards whether or not either step succeeded.
    pub async fn process_and_upload(
        &self,
        audio: &Path,
        existing_note: &str,
        folder: &str,
    ) -> Result<VoiceEntryOutcome> {
        let Some(uploader) = &self.uploader else {
            return Err(JournalError::Config(
                "voice pipeline has no upload target configured".to_string(),
            ));
        };

        let analysis = match self.process_voice_entry(audio, existing_note).await {
            Ok(analysis) => analysis,
            Err(e) => {
                discard_capture(audio).await;
                return Err(e);
            }
        };

        let media_url = uploader
            .upload_recording(audio, folder)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Upload))?;

        Ok(VoiceEntryOutcome {
            analysis,
            media_url,
        })
    }

    fn analyze(&self, audio: &Path, existing_note: &str, transcript: Transcript) -> VoiceAnalysis {
        let full_text = format!("{} {}", existing_note.trim(), transcript.text)
            .trim()
            .to_string();

        let emotion_analysis = self.analyzer.analyze_text(&full_text);
        let voice_features = VoiceFeatures::from_file(audio);
        let combined_score = CombinedScore::compute(&emotion_analysis, &voice_features);

        info!(
            "Voice entry analyzed: {} (text {}, voice {}, combined {})",
            emotion_analysis.dominant_label(),
            combined_score.text_score,
            combined_score.voice_score,
            combined_score.combined_score
        );

        VoiceAnalysis {
            transcription: transcript.text,
            confidence: transcript.confidence,
            full_text,
            emotion_analysis,
            voice_features,
            combined_score,
        }
    }
}

async fn discard_capture(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Discarded capture {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}
