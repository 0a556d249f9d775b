//! Keyword-based emotion scoring of free text

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::keywords::{Emotion, KeywordTable, NEUTRAL};

/// Sentiment bucket for a signed score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Très positif")]
    VeryPositive,
    #[serde(rename = "Positif")]
    Positive,
    #[serde(rename = "Neutre")]
    Neutral,
    #[serde(rename = "Négatif")]
    Negative,
    #[serde(rename = "Très négatif")]
    VeryNegative,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 3.0 {
            Self::VeryPositive
        } else if score >= 1.0 {
            Self::Positive
        } else if score >= -1.0 {
            Self::Neutral
        } else if score >= -3.0 {
            Self::Negative
        } else {
            Self::VeryNegative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryPositive => "Très positif",
            Self::Positive => "Positif",
            Self::Neutral => "Neutre",
            Self::Negative => "Négatif",
            Self::VeryNegative => "Très négatif",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Label for the 1-10 mood slider
pub fn mood_label(mood_score: u8) -> &'static str {
    match mood_score {
        0..=2 => "Très triste",
        3..=4 => "Triste",
        5..=6 => "Neutre",
        7..=8 => "Heureux",
        _ => "Très heureux",
    }
}

/// Per-category result for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub emotion: Emotion,
    pub count: u32,
    pub score: i32,
    /// count / 3, capped at 1.0
    pub intensity: f64,
}

/// A stem that matched at least once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub emotion: Emotion,
    pub count: u32,
}

/// Result of analysing one text. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    /// `None` is the neutral sentinel, written as `"neutre"`
    #[serde(with = "crate::analysis::keywords::neutral_or_emotion")]
    pub dominant_emotion: Option<Emotion>,
    /// Matched categories in table order
    pub emotions: Vec<EmotionScore>,
    pub overall_score: i32,
    pub keywords: Vec<KeywordMatch>,
    pub sentiment: SentimentLabel,
}

impl EmotionAnalysis {
    pub fn neutral() -> Self {
        Self {
            dominant_emotion: None,
            emotions: Vec::new(),
            overall_score: 0,
            keywords: Vec::new(),
            sentiment: SentimentLabel::from_score(0.0),
        }
    }

    /// Dominant emotion name, `"neutre"` when nothing matched
    pub fn dominant_label(&self) -> &'static str {
        self.dominant_emotion.map(|e| e.as_str()).unwrap_or(NEUTRAL)
    }

    pub fn emotion(&self, emotion: Emotion) -> Option<&EmotionScore> {
        self.emotions.iter().find(|s| s.emotion == emotion)
    }
}

/// Stateless analyzer over an injected keyword table
#[derive(Debug, Clone, Copy)]
pub struct EmotionAnalyzer<'t> {
    table: &'t KeywordTable,
}

impl Default for EmotionAnalyzer<'static> {
    fn default() -> Self {
        Self::new(KeywordTable::french())
    }
}

impl<'t> EmotionAnalyzer<'t> {
    pub fn new(table: &'t KeywordTable) -> Self {
        Self { table }
    }

    /// Score a text. Empty input yields the neutral result.
    pub fn analyze_text(&self, text: &str) -> EmotionAnalysis {
        if text.is_empty() {
            return EmotionAnalysis::neutral();
        }

        let lowered = text.to_lowercase();
        let mut emotions = Vec::new();
        let mut keywords = Vec::new();
        let mut total_score = 0i32;

        for compiled in self.table.compiled() {
            let category = &compiled.category;
            let mut emotion_count = 0u32;

            for stem in &compiled.stems {
                let count = stem.pattern.find_iter(&lowered).count() as u32;
                if count > 0 {
                    emotion_count += count;
                    keywords.push(KeywordMatch {
                        keyword: stem.stem.clone(),
                        emotion: category.emotion,
                        count,
                    });
                }
            }

            if emotion_count > 0 {
                let score = emotion_count as i32 * category.base_score;
                emotions.push(EmotionScore {
                    emotion: category.emotion,
                    count: emotion_count,
                    score,
                    intensity: (emotion_count as f64 / 3.0).min(1.0),
                });
                total_score += score;
            }
        }

        EmotionAnalysis {
            dominant_emotion: dominant(&emotions),
            emotions,
            overall_score: total_score,
            keywords,
            sentiment: SentimentLabel::from_score(total_score as f64),
        }
    }
}

// Strictly greater intensity replaces the current pick, so the earliest
// category wins ties.
fn dominant(emotions: &[EmotionScore]) -> Option<Emotion> {
    let mut best: Option<&EmotionScore> = None;
    for candidate in emotions {
        match best {
            Some(current) if candidate.intensity <= current.intensity => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|s| s.emotion)
}
