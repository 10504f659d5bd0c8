//! Configuration for the vocabulary trainer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::quiz::{QuizSettings, DEFAULT_MAX_QUESTIONS, DEFAULT_OPTIONS};
use crate::store::DEFAULT_GRADUATION;

const APP_DIR: &str = "vocab";
const DEFAULT_DB_NAME: &str = "vocab.db";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "vocab.log";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub remediation: RemediationConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub sound: SoundConfig,
}

impl Config {
    /// Reads the config file, falling back to defaults when it is missing or malformed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
                return Self::default();
            }
        };
        toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "malformed config, using defaults");
            Self::default()
        })
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// `$VOCAB_DB`, else the per-user config directory.
    pub fn db_path() -> PathBuf {
        if let Ok(path) = std::env::var("VOCAB_DB") {
            return PathBuf::from(path);
        }

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        std::fs::create_dir_all(&config_dir).ok();
        config_dir.join(DEFAULT_DB_NAME)
    }

    pub fn log_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(LOG_FILE)
    }

    /// Where to read words from: the explicit override, then `$VOCAB_CATALOG`, then the
    /// config file. `None` means the built-in list.
    pub fn catalog_source(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("VOCAB_CATALOG").map(PathBuf::from))
            .or_else(|| self.catalog_path.clone())
    }

    pub fn load_catalog(&self, explicit: Option<&Path>) -> Result<Catalog> {
        match self.catalog_source(explicit) {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }

    pub fn quiz_settings(&self) -> QuizSettings {
        QuizSettings {
            max_questions: self.quiz.max_questions.max(1),
            options: self.quiz.options.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    #[serde(default = "default_options")]
    pub options: usize,
    #[serde(default = "default_answer_delay")]
    pub answer_delay_ms: u64,
}

fn default_max_questions() -> usize {
    DEFAULT_MAX_QUESTIONS
}

fn default_options() -> usize {
    DEFAULT_OPTIONS
}

fn default_answer_delay() -> u64 {
    1500
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            options: DEFAULT_OPTIONS,
            answer_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationConfig {
    #[serde(default = "default_graduation")]
    pub graduation: u32,
}

fn default_graduation() -> u32 {
    DEFAULT_GRADUATION
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            graduation: DEFAULT_GRADUATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_chart_window")]
    pub chart_window: usize,
}

fn default_chart_window() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { chart_window: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub command: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
        }
    }
}

impl SpeechConfig {
    pub fn effective_command(&self) -> Option<&str> {
        if self.enabled {
            self.command.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
