use thiserror::Error;

use crate::models::Level;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("no words available: {0}")]
    EmptyPool(String),

    #[error("every {0} word is already mastered")]
    AllMastered(Level),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog: {0}")]
    Catalog(String),

    #[error("invalid level '{0}'. Use: easy, medium, or hard")]
    InvalidLevel(String),

    #[error("invalid mastery level {0}. Use a value from 0 to 3")]
    InvalidMastery(u32),
}

pub type Result<T> = std::result::Result<T, VocabError>;
