//! Data models for storage

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{EmotionAnalysis, EmotionAnalyzer};
use crate::{JournalError, Result};

/// Lowest accepted mood score
pub const MOOD_MIN: u8 = 1;

/// Highest accepted mood score
pub const MOOD_MAX: u8 = 10;

/// One journal entry; at most one per calendar day per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Calendar day, the entry's key
    pub date: NaiveDate,

    /// Mood slider value (1 - 10)
    pub mood_score: u8,

    /// Free text note
    pub note: String,

    /// Analysis cached at save time
    pub emotion_analysis: Option<EmotionAnalysis>,

    /// Uploaded audio/video attached to the day
    pub media_url: Option<String>,

    /// Last save time
    pub timestamp: DateTime<Utc>,
}

impl JournalEntry {
    /// Create an entry, validating the mood score
    pub fn new(date: NaiveDate, mood_score: u8, note: &str) -> Result<Self> {
        if !(MOOD_MIN..=MOOD_MAX).contains(&mood_score) {
            return Err(JournalError::InvalidEntry(format!(
                "mood score {} outside {}..={}",
                mood_score, MOOD_MIN, MOOD_MAX
            )));
        }

        Ok(Self {
            date,
            mood_score,
            note: note.trim().to_string(),
            emotion_analysis: None,
            media_url: None,
            timestamp: Utc::now(),
        })
    }

    /// Cache the note's analysis on the entry
    pub fn analyzed(mut self, analyzer: &EmotionAnalyzer<'_>) -> Self {
        self.emotion_analysis = Some(analyzer.analyze_text(&self.note));
        self
    }

    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }
}
