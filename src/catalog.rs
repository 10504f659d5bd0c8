use std::path::Path;

use tracing::debug;

use crate::error::{Result, VocabError};
use crate::models::{Level, WordEntry};

const BUILTIN_WORDS: &str = include_str!("../data/words.json");

/// The read-only word list. Order is preserved from the source file.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<WordEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<WordEntry>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_WORDS)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<WordEntry> =
            serde_json::from_str(raw).map_err(|e| VocabError::Catalog(e.to_string()))?;
        let catalog = Self::new(entries);
        if catalog.is_empty() {
            return Err(VocabError::Catalog("the word list is empty".to_string()));
        }
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        debug!(path = %path.display(), words = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_level(&self, level: Level) -> Vec<&WordEntry> {
        self.entries.iter().filter(|e| e.level == level).collect()
    }

    pub fn find(&self, word: &str) -> Option<&WordEntry> {
        self.entries.iter().find(|e| e.word == word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_covers_every_level() {
        let catalog = Catalog::builtin().unwrap();
        for level in Level::ALL {
            assert!(
                catalog.by_level(level).len() >= 4,
                "expected at least 4 {} words",
                level
            );
        }
    }

    #[test]
    fn builtin_catalog_has_unique_words() {
        let catalog = Catalog::builtin().unwrap();
        let mut words: Vec<&str> = catalog.entries().iter().map(|e| e.word.as_str()).collect();
        words.sort();
        words.dedup();
        assert_eq!(words.len(), catalog.len());
    }

    #[test]
    fn by_level_preserves_order() {
        let catalog = Catalog::new(vec![
            WordEntry::new("b", "B", Level::Easy),
            WordEntry::new("x", "X", Level::Hard),
            WordEntry::new("a", "A", Level::Easy),
        ]);
        let easy: Vec<&str> = catalog
            .by_level(Level::Easy)
            .iter()
            .map(|e| e.word.as_str())
            .collect();
        assert_eq!(easy, vec!["b", "a"]);
    }

    #[test]
    fn find_is_exact_match() {
        let catalog = Catalog::new(vec![WordEntry::new("Apple", "fruit", Level::Easy)]);
        assert!(catalog.find("Apple").is_some());
        assert!(catalog.find("apple").is_none());
    }

    #[test]
    fn from_json_rejects_empty_list() {
        assert!(matches!(Catalog::from_json("[]"), Err(VocabError::Catalog(_))));
    }

    #[test]
    fn from_json_rejects_unknown_level() {
        let raw = r#"[{"word":"a","meaning":"b","level":"expert"}]"#;
        assert!(matches!(Catalog::from_json(raw), Err(VocabError::Catalog(_))));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"word":"cat","meaning":"a small pet","level":"easy"}}]"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find("cat").unwrap().meaning, "a small pet");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = Catalog::load("/definitely/not/here.json");
        assert!(matches!(result, Err(VocabError::Io(_))));
    }
}
