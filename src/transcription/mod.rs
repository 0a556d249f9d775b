//! Transcription module for moodjournal
//!
//! Sends recorded audio to a remote speech-to-text service and polls the
//! job until a transcript is ready.

mod api;
mod assemblyai;
mod client;

pub use api::{JobState, JobStatus, TranscriptionApi};
pub use assemblyai::AssemblyAiApi;
pub use client::{
    PollState, Sleeper, TokioSleeper, Transcript, TranscriptionClient, DEFAULT_CONFIDENCE,
};
