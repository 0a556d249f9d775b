//! Emotion categories and their keyword stems

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::{JournalError, Result};

/// Identifier used wherever no emotion keyword matched
pub const NEUTRAL: &str = "neutre";

/// Emotion categories recognised by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "joie")]
    Joy,
    #[serde(rename = "tristesse")]
    Sadness,
    #[serde(rename = "colère")]
    Anger,
    #[serde(rename = "peur")]
    Fear,
    #[serde(rename = "surprise")]
    Surprise,
    #[serde(rename = "dégoût")]
    Disgust,
    #[serde(rename = "amour")]
    Love,
    #[serde(rename = "satisfaction")]
    Satisfaction,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Disgust,
        Emotion::Love,
        Emotion::Satisfaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joy => "joie",
            Self::Sadness => "tristesse",
            Self::Anger => "colère",
            Self::Fear => "peur",
            Self::Surprise => "surprise",
            Self::Disgust => "dégoût",
            Self::Love => "amour",
            Self::Satisfaction => "satisfaction",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }

    /// Chart colour
    pub fn color(&self) -> &'static str {
        match self {
            Self::Joy => "#FFD700",
            Self::Sadness => "#4169E1",
            Self::Anger => "#FF4500",
            Self::Fear => "#800080",
            Self::Surprise => "#FF69B4",
            Self::Disgust => "#228B22",
            Self::Love => "#DC143C",
            Self::Satisfaction => "#32CD32",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Joy => "😊",
            Self::Sadness => "😢",
            Self::Anger => "😠",
            Self::Fear => "😰",
            Self::Surprise => "😲",
            Self::Disgust => "🤢",
            Self::Love => "💕",
            Self::Satisfaction => "😌",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Colour for an optional emotion, grey when neutral
pub fn color_of(emotion: Option<Emotion>) -> &'static str {
    emotion.map(|e| e.color()).unwrap_or("#808080")
}

/// Icon for an optional emotion
pub fn icon_of(emotion: Option<Emotion>) -> &'static str {
    emotion.map(|e| e.icon()).unwrap_or("😐")
}

/// Serde representation of an optional emotion: `"neutre"` stands for `None`.
/// A `null` written by older versions still reads back as neutral.
pub(crate) mod neutral_or_emotion {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Emotion, NEUTRAL};

    pub fn serialize<S>(emotion: &Option<Emotion>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(emotion.map(|e| e.as_str()).unwrap_or(NEUTRAL))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Emotion>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(name) if name == NEUTRAL => Ok(None),
            Some(name) => Emotion::from_name(&name)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unknown emotion `{}`", name))),
        }
    }
}

/// One emotion category: keyword stems plus the score each match is worth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionCategory {
    pub emotion: Emotion,
    pub stems: Vec<String>,
    pub base_score: i32,
}

impl EmotionCategory {
    pub fn new(emotion: Emotion, stems: &[&str], base_score: i32) -> Self {
        Self {
            emotion,
            stems: stems.iter().map(|s| s.to_lowercase()).collect(),
            base_score,
        }
    }
}

/// A stem with its compiled word-boundary prefix pattern
#[derive(Debug)]
pub(crate) struct StemPattern {
    pub stem: String,
    pub pattern: Regex,
}

#[derive(Debug)]
pub(crate) struct CompiledCategory {
    pub category: EmotionCategory,
    pub stems: Vec<StemPattern>,
}

/// Immutable keyword configuration, iterated in declaration order
#[derive(Debug)]
pub struct KeywordTable {
    categories: Vec<CompiledCategory>,
}

impl KeywordTable {
    /// Compile a keyword table. Category order is the analyzer's tie-break order.
    pub fn new(categories: Vec<EmotionCategory>) -> Result<Self> {
        let categories = categories
            .into_iter()
            .map(|category| {
                let stems = category
                    .stems
                    .iter()
                    .map(|stem| {
                        let pattern = Regex::new(&format!(r"(?i)\b{}", regex::escape(stem)))
                            .map_err(|e| {
                                JournalError::Config(format!("invalid keyword '{}': {}", stem, e))
                            })?;
                        Ok(StemPattern {
                            stem: stem.clone(),
                            pattern,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledCategory { category, stems })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { categories })
    }

    /// Built-in French keyword set, compiled once per process
    pub fn french() -> &'static KeywordTable {
        static FRENCH: OnceLock<KeywordTable> = OnceLock::new();
        FRENCH.get_or_init(|| {
            KeywordTable::new(french_categories()).expect("built-in keyword stems compile")
        })
    }

    pub fn categories(&self) -> impl Iterator<Item = &EmotionCategory> {
        self.categories.iter().map(|c| &c.category)
    }

    pub(crate) fn compiled(&self) -> &[CompiledCategory] {
        &self.categories
    }
}

/// The French categories in their canonical order
pub fn french_categories() -> Vec<EmotionCategory> {
    vec![
        EmotionCategory::new(
            Emotion::Joy,
            &[
                "heureux", "joyeux", "content", "ravi", "euphori", "enthousi", "optimist",
                "sourire", "rire", "amusant", "fantastique", "merveilleux", "génial", "super",
                "excellent",
            ],
            2,
        ),
        EmotionCategory::new(
            Emotion::Sadness,
            &[
                "triste", "malheureux", "déçu", "mélancolie", "chagrin", "peine", "sombre",
                "déprim", "pleurer", "larmes", "désespoir", "abattu",
            ],
            -2,
        ),
        EmotionCategory::new(
            Emotion::Anger,
            &[
                "colère", "énervé", "furieux", "irrité", "agacé", "frustré", "rage", "mécontent",
                "fâché", "indigné", "exaspéré",
            ],
            -1,
        ),
        EmotionCategory::new(
            Emotion::Fear,
            &[
                "peur", "anxieux", "inquiet", "stressé", "nerveux", "angoiss", "effrayé",
                "terrifié", "paniq", "préoccup",
            ],
            -1,
        ),
        EmotionCategory::new(
            Emotion::Surprise,
            &[
                "surpris", "étonné", "stupéfait", "choqué", "impressionn", "incroyable",
                "inattendu",
            ],
            1,
        ),
        EmotionCategory::new(
            Emotion::Disgust,
            &["dégoût", "écœur", "répugn", "horrible", "nauséab", "révolt"],
            -1,
        ),
        EmotionCategory::new(
            Emotion::Love,
            &[
                "amour", "aimer", "affection", "tendresse", "passion", "adorer", "chérir",
                "attachement",
            ],
            2,
        ),
        EmotionCategory::new(
            Emotion::Satisfaction,
            &[
                "satisfait", "accompli", "fier", "réussi", "victoire", "succès", "performance",
                "achievement",
            ],
            1,
        ),
    ]
}
