//! Emotion analysis module for moodjournal
//!
//! Pure keyword scoring of note text and aggregation of scored entries into
//! period statistics. Nothing here performs I/O or fails.

mod analyzer;
mod keywords;
mod stats;

pub use analyzer::{
    mood_label, EmotionAnalysis, EmotionAnalyzer, EmotionScore, KeywordMatch, SentimentLabel,
};
pub use keywords::{
    color_of, french_categories, icon_of, Emotion, EmotionCategory, KeywordTable, NEUTRAL,
};
pub use stats::{
    filter_by_period, round2, EmotionCount, PeriodStatistics, StatsPeriod, TrendPoint,
};
