use tracing::debug;

use crate::catalog::Catalog;
use crate::db::KeyValueStore;
use crate::error::{Result, VocabError};
use crate::models::{
    is_mastered, HistoryRecord, IncorrectMap, Level, LevelStats, MasteryMap, PendingWord,
    WordEntry, WordWithMastery,
};
use crate::quiz::Effect;
use crate::store::MasteryStore;

/// Result of asking for a learning session at some level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStart {
    Ready(LearningSession),
    /// Every word at the level is mastered. The learner may review them all anyway.
    AllMastered(Vec<WordEntry>),
}

/// Builds the working set for `level`: catalog words at that level whose mastery is below 3,
/// in catalog order.
pub fn start_learning(level: Level, catalog: &Catalog, mastery: &MasteryMap) -> Result<SessionStart> {
    let candidates = catalog.by_level(level);
    if candidates.is_empty() {
        return Err(VocabError::EmptyPool(format!("no {} words in the catalog", level)));
    }

    let unmastered: Vec<WordEntry> = candidates
        .iter()
        .filter(|e| !is_mastered(mastery.get(&e.word).copied().unwrap_or(0)))
        .map(|e| (*e).clone())
        .collect();

    if unmastered.is_empty() {
        debug!(level = %level, "all words mastered");
        let all = candidates.into_iter().cloned().collect();
        return Ok(SessionStart::AllMastered(all));
    }

    debug!(level = %level, words = unmastered.len(), "learning session started");
    Ok(SessionStart::Ready(LearningSession::new(level, unmastered)))
}

/// Like [`start_learning`], resolving the all-mastered case with `confirm`.
/// Returns `None` when the learner declines.
pub fn start_learning_with<F>(
    level: Level,
    catalog: &Catalog,
    mastery: &MasteryMap,
    confirm: F,
) -> Result<Option<LearningSession>>
where
    F: FnOnce(Level) -> bool,
{
    match start_learning(level, catalog, mastery)? {
        SessionStart::Ready(session) => Ok(Some(session)),
        SessionStart::AllMastered(all) => {
            if confirm(level) {
                Ok(Some(LearningSession::new(level, all)))
            } else {
                Ok(None)
            }
        }
    }
}

/// Flashcard walk over a working set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningSession {
    level: Level,
    words: Vec<WordEntry>,
    cursor: usize,
    meaning_revealed: bool,
}

impl LearningSession {
    pub fn new(level: Level, words: Vec<WordEntry>) -> Self {
        Self {
            level,
            words,
            cursor: 0,
            meaning_revealed: false,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn current(&self) -> Option<&WordEntry> {
        self.words.get(self.cursor)
    }

    pub fn meaning_revealed(&self) -> bool {
        self.meaning_revealed
    }

    pub fn toggle_meaning(&mut self) {
        self.meaning_revealed = !self.meaning_revealed;
    }

    pub fn has_prev(&self) -> bool {
        self.cursor > 0
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.words.len()
    }

    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.cursor += 1;
        self.meaning_revealed = false;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.cursor -= 1;
        self.meaning_revealed = false;
        true
    }

    /// "3 / 12"
    pub fn progress_label(&self) -> String {
        format!("{} / {}", self.cursor + 1, self.words.len())
    }

    pub fn speak_current(&self) -> Option<Effect> {
        self.current().map(|e| Effect::Speak(e.word.clone()))
    }

    /// Applies the manual mastery control to the current word.
    pub fn toggle_mastery<S: KeyValueStore + ?Sized>(
        &self,
        store: &MasteryStore<'_, S>,
        level: u32,
    ) -> Result<Option<u32>> {
        match self.current() {
            Some(entry) => store.toggle_level(&entry.word, level).map(Some),
            None => Ok(None),
        }
    }
}

pub fn words_with_mastery(
    catalog: &Catalog,
    mastery: &MasteryMap,
    level: Option<Level>,
) -> Vec<WordWithMastery> {
    catalog
        .entries()
        .iter()
        .filter(|e| level.map_or(true, |l| e.level == l))
        .map(|e| WordWithMastery {
            entry: e.clone(),
            mastery: mastery.get(&e.word).copied().unwrap_or(0),
        })
        .collect()
}

/// Catalog words at mastery 3 or above, any level.
pub fn mastered_words(catalog: &Catalog, mastery: &MasteryMap) -> Vec<WordWithMastery> {
    words_with_mastery(catalog, mastery, None)
        .into_iter()
        .filter(|w| is_mastered(w.mastery))
        .collect()
}

/// Catalog words waiting in the incorrect notes. Tracked words missing from the catalog
/// are skipped.
pub fn pending_words(catalog: &Catalog, incorrect: &IncorrectMap) -> Vec<PendingWord> {
    catalog
        .entries()
        .iter()
        .filter_map(|e| {
            incorrect.get(&e.word).map(|&successes| PendingWord {
                entry: e.clone(),
                successes,
            })
        })
        .collect()
}

pub fn level_stats(
    catalog: &Catalog,
    mastery: &MasteryMap,
    incorrect: &IncorrectMap,
    history: &[HistoryRecord],
    level: Level,
) -> LevelStats {
    let words = catalog.by_level(level);
    let mastered = words
        .iter()
        .filter(|e| is_mastered(mastery.get(&e.word).copied().unwrap_or(0)))
        .count();
    let pending_remediation = words
        .iter()
        .filter(|e| incorrect.contains_key(&e.word))
        .count();

    let scores: Vec<u32> = history
        .iter()
        .filter(|r| r.level == level)
        .map(|r| r.score)
        .collect();
    let avg_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<u32>() as f64 / scores.len() as f64
    };

    LevelStats {
        words: words.len(),
        mastered,
        pending_remediation,
        quizzes: scores.len(),
        avg_score,
    }
}
