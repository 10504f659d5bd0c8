use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mastery level at which a word leaves the learning pool.
pub const MASTERED_LEVEL: u32 = 3;

/// Word difficulty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Easy, Level::Medium, Level::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Easy => "Beginner",
            Level::Medium => "Intermediate",
            Level::Hard => "Advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" | "beginner" | "1" => Some(Level::Easy),
            "medium" | "m" | "intermediate" | "2" => Some(Level::Medium),
            "hard" | "h" | "advanced" | "3" => Some(Level::Hard),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Level::Easy => Level::Medium,
            Level::Medium => Level::Hard,
            Level::Hard => Level::Easy,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Level::Easy => Level::Hard,
            Level::Medium => Level::Easy,
            Level::Hard => Level::Medium,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub meaning: String,
    pub level: Level,
}

#[cfg(test)]
impl WordEntry {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>, level: Level) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            level,
        }
    }
}

/// word -> mastery level. Missing keys are level 0.
pub type MasteryMap = BTreeMap<String, u32>;

/// word -> remediation success count.
pub type IncorrectMap = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: DateTime<Utc>,
    pub score: u32,
    pub level: Level,
}

pub fn mastery_label(level: u32) -> &'static str {
    match level {
        0 => "New",
        1 => "Seen",
        2 => "Familiar",
        _ => "Mastered",
    }
}

pub fn is_mastered(level: u32) -> bool {
    level >= MASTERED_LEVEL
}

#[derive(Debug, Clone, Serialize)]
pub struct WordWithMastery {
    #[serde(flatten)]
    pub entry: WordEntry,
    pub mastery: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingWord {
    #[serde(flatten)]
    pub entry: WordEntry,
    pub successes: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelStats {
    pub words: usize,
    pub mastered: usize,
    pub pending_remediation: usize,
    pub quizzes: usize,
    pub avg_score: f64,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
