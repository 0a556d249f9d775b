//! Voice entry module for moodjournal
//!
//! Turns a recorded clip into note text and an emotion reading by combining
//! the transcript's keyword analysis with simple duration heuristics.

mod features;
mod pipeline;

pub use features::{
    audio_duration, combine, CombinedScore, VoiceFeatures, STRESS_SPEECH_RATE, TEXT_WEIGHT,
    VOICE_WEIGHT, WORDS_PER_SECOND,
};
pub use pipeline::{VoiceAnalysis, VoiceEntryOutcome, VoiceEntryPipeline};
