//! Duration-based voice heuristics
//!
//! These are placeholders, not acoustic analysis: everything is derived from
//! the clip length alone.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::{round2, EmotionAnalysis};

/// Assumed speaking pace
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Speech rate above which stress is assumed (words/minute)
pub const STRESS_SPEECH_RATE: f64 = 160.0;

pub const TEXT_WEIGHT: f64 = 0.7;
pub const VOICE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceFeatures {
    pub duration_secs: f64,
    /// words per minute
    pub estimated_speech_rate: f64,
    pub energy_level: f64,
    pub detected_stress: bool,
    pub confidence: f64,
    pub silence_ratio: f64,
    pub average_intensity: f64,
}

impl VoiceFeatures {
    /// Features for a clip of known length
    pub fn from_duration(duration_secs: f64) -> Self {
        if !(duration_secs > 0.0) || !duration_secs.is_finite() {
            return Self::fallback();
        }

        let estimated_words = duration_secs * WORDS_PER_SECOND;
        let speech_rate = estimated_words / duration_secs * 60.0;

        Self {
            duration_secs,
            estimated_speech_rate: speech_rate,
            energy_level: if duration_secs > 5.0 { 0.7 } else { 0.5 },
            detected_stress: speech_rate > STRESS_SPEECH_RATE,
            confidence: 0.6,
            silence_ratio: 0.1,
            average_intensity: 0.3,
        }
    }

    /// Used when the clip length cannot be read
    pub fn fallback() -> Self {
        Self {
            duration_secs: 3.0,
            estimated_speech_rate: 130.0,
            energy_level: 0.5,
            detected_stress: false,
            confidence: 0.4,
            silence_ratio: 0.15,
            average_intensity: 0.25,
        }
    }

    pub fn from_file(path: &Path) -> Self {
        match audio_duration(path) {
            Some(duration) => Self::from_duration(duration),
            None => {
                tracing::debug!(
                    "No readable duration for {}, using fallback voice features",
                    path.display()
                );
                Self::fallback()
            }
        }
    }

    /// Additive score in [-3, 3]
    pub fn emotion_score(&self) -> f64 {
        let mut score: f64 = 0.0;

        if self.energy_level > 0.7 {
            score += 1.0;
        }
        if self.estimated_speech_rate > 140.0 {
            score += 0.5;
        }
        if self.estimated_speech_rate < 100.0 {
            score -= 0.5;
        }
        if self.detected_stress {
            score -= 1.0;
        }
        if self.average_intensity > 0.4 {
            score += 0.5;
        }
        if self.silence_ratio > 0.3 {
            score -= 0.5;
        }

        score.clamp(-3.0, 3.0)
    }
}

/// Clip length in seconds for WAV files
pub fn audio_duration(path: &Path) -> Option<f64> {
    let reader = hound::WavReader::open(path).ok()?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as f64 / sample_rate as f64)
}

/// Weighted blend of text and voice scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedScore {
    pub text_score: i32,
    pub voice_score: f64,
    pub combined_score: f64,
    pub confidence: f64,
}

impl CombinedScore {
    pub fn compute(analysis: &EmotionAnalysis, features: &VoiceFeatures) -> Self {
        let voice_score = features.emotion_score();
        let keyword_confidence = if analysis.keywords.is_empty() { 0.5 } else { 0.8 };

        Self {
            text_score: analysis.overall_score,
            voice_score,
            combined_score: combine(analysis.overall_score as f64, voice_score),
            confidence: keyword_confidence * features.confidence,
        }
    }
}

/// `0.7 * text + 0.3 * voice`, rounded to 2 decimals
pub fn combine(text_score: f64, voice_score: f64) -> f64 {
    round2(text_score * TEXT_WEIGHT + voice_score * VOICE_WEIGHT)
}
