//! Aggregation of journal entries into period statistics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::analyzer::{EmotionAnalyzer, SentimentLabel};
use crate::analysis::keywords::Emotion;
use crate::storage::JournalEntry;

/// One point of the mood trend line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub score: i32,
    #[serde(with = "crate::analysis::keywords::neutral_or_emotion")]
    pub emotion: Option<Emotion>,
}

/// How many entries had a given dominant emotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
    pub emotion: Emotion,
    pub count: u32,
}

/// Statistics over a set of entries, recomputed on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStatistics {
    /// Mean overall score, rounded half away from zero to 2 decimals
    pub average_score: f64,
    pub total_entries: usize,
    /// Non-neutral dominant emotions in order of first appearance
    pub emotion_distribution: Vec<EmotionCount>,
    /// Sorted by ascending date
    pub trend_data: Vec<TrendPoint>,
    #[serde(with = "crate::analysis::keywords::neutral_or_emotion")]
    pub most_frequent_emotion: Option<Emotion>,
    pub sentiment: SentimentLabel,
}

impl PeriodStatistics {
    pub fn empty() -> Self {
        Self {
            average_score: 0.0,
            total_entries: 0,
            emotion_distribution: Vec::new(),
            trend_data: Vec::new(),
            most_frequent_emotion: None,
            sentiment: SentimentLabel::from_score(0.0),
        }
    }

    pub fn count_for(&self, emotion: Emotion) -> u32 {
        self.emotion_distribution
            .iter()
            .find(|c| c.emotion == emotion)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Round to two decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl EmotionAnalyzer<'_> {
    /// Aggregate entries, reusing each entry's cached analysis when present.
    pub fn calculate_period_stats(&self, entries: &[JournalEntry]) -> PeriodStatistics {
        if entries.is_empty() {
            return PeriodStatistics::empty();
        }

        let mut total_score = 0i64;
        let mut distribution: Vec<EmotionCount> = Vec::new();
        let mut trend_data = Vec::with_capacity(entries.len());

        for entry in entries {
            let computed;
            let analysis = match &entry.emotion_analysis {
                Some(cached) => cached,
                None => {
                    computed = self.analyze_text(&entry.note);
                    &computed
                }
            };

            total_score += analysis.overall_score as i64;

            if let Some(emotion) = analysis.dominant_emotion {
                match distribution.iter_mut().find(|c| c.emotion == emotion) {
                    Some(slot) => slot.count += 1,
                    None => distribution.push(EmotionCount { emotion, count: 1 }),
                }
            }

            trend_data.push(TrendPoint {
                date: entry.date,
                score: analysis.overall_score,
                emotion: analysis.dominant_emotion,
            });
        }

        // stable, so same-day points keep input order
        trend_data.sort_by_key(|p| p.date);

        let average = total_score as f64 / entries.len() as f64;

        PeriodStatistics {
            average_score: round2(average),
            total_entries: entries.len(),
            most_frequent_emotion: most_frequent(&distribution),
            emotion_distribution: distribution,
            trend_data,
            sentiment: SentimentLabel::from_score(average),
        }
    }
}

fn most_frequent(distribution: &[EmotionCount]) -> Option<Emotion> {
    let mut best: Option<&EmotionCount> = None;
    for candidate in distribution {
        match best {
            Some(current) if candidate.count <= current.count => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|c| c.emotion)
}

/// Time window for the statistics screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    #[default]
    Week,
    Month,
    Year,
}

impl StatsPeriod {
    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for StatsPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(format!("unknown period '{}', expected week, month or year", other)),
        }
    }
}

/// Entries no more than `period.days()` days before `today`
pub fn filter_by_period(
    entries: &[JournalEntry],
    period: StatsPeriod,
    today: NaiveDate,
) -> Vec<JournalEntry> {
    entries
        .iter()
        .filter(|entry| (today - entry.date).num_days() <= period.days())
        .cloned()
        .collect()
}
