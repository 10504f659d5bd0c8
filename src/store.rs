//! Repositories over the key-value medium.
//!
//! Each record lives under its own key as a JSON document and every mutation is a
//! read-modify-write of the whole document. Reads never fail: a missing, unreadable or
//! malformed document is treated as the empty default.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::KeyValueStore;
use crate::error::{Result, VocabError};
use crate::models::{HistoryRecord, IncorrectMap, Level, MasteryMap, MASTERED_LEVEL};
use crate::quiz::Effect;

pub const HISTORY_KEY: &str = "history";
pub const MASTERY_KEY: &str = "mastery";
pub const INCORRECT_KEY: &str = "incorrect";

/// Correct remediation answers needed before a word leaves the incorrect-note queue.
pub const DEFAULT_GRADUATION: u32 = 3;

fn load_json<T, S>(kv: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match kv.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "discarding unreadable record");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read record");
            T::default()
        }
    }
}

fn save_json<T, S>(kv: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    kv.set(key, &raw)?;
    Ok(())
}

pub struct MasteryStore<'a, S: KeyValueStore + ?Sized> {
    kv: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> MasteryStore<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    pub fn load(&self) -> MasteryMap {
        load_json(self.kv, MASTERY_KEY)
    }

    pub fn save(&self, data: &MasteryMap) -> Result<()> {
        save_json(self.kv, MASTERY_KEY, data)
    }

    pub fn level(&self, word: &str) -> u32 {
        self.load().get(word).copied().unwrap_or(0)
    }

    /// Adds one level. Not capped: only 0..=3 is meaningful but larger values are kept.
    pub fn increment(&self, word: &str) -> Result<u32> {
        let mut data = self.load();
        let level = data.entry(word.to_string()).or_insert(0);
        *level += 1;
        let new_level = *level;
        self.save(&data)?;
        debug!(word, level = new_level, "mastery incremented");
        Ok(new_level)
    }

    /// Sets an explicit level. Level 0 removes the word instead of storing a zero.
    pub fn set_level(&self, word: &str, level: u32) -> Result<()> {
        if level > MASTERED_LEVEL {
            return Err(VocabError::InvalidMastery(level));
        }

        let mut data = self.load();
        if level == 0 {
            data.remove(word);
        } else {
            data.insert(word.to_string(), level);
        }
        self.save(&data)?;
        debug!(word, level, "mastery set");
        Ok(())
    }

    /// The learning-screen control: choosing the level the word already has clears it,
    /// any other choice sets it. Returns the resulting level.
    pub fn toggle_level(&self, word: &str, level: u32) -> Result<u32> {
        let new_level = if self.level(word) == level { 0 } else { level };
        self.set_level(word, new_level)?;
        Ok(new_level)
    }
}

/// Outcome of a correct remediation answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    NotTracked,
    Advanced(u32),
    Graduated,
}

pub struct IncorrectNoteStore<'a, S: KeyValueStore + ?Sized> {
    kv: &'a S,
    graduation: u32,
}

impl<'a, S: KeyValueStore + ?Sized> IncorrectNoteStore<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self {
            kv,
            graduation: DEFAULT_GRADUATION,
        }
    }

    pub fn with_graduation(mut self, graduation: u32) -> Self {
        self.graduation = graduation.max(1);
        self
    }

    pub fn load(&self) -> IncorrectMap {
        load_json(self.kv, INCORRECT_KEY)
    }

    pub fn save(&self, data: &IncorrectMap) -> Result<()> {
        save_json(self.kv, INCORRECT_KEY, data)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.load().contains_key(word)
    }

    /// Starts tracking a missed word at 0 successes. An already tracked word keeps its count.
    pub fn add_if_absent(&self, word: &str) -> Result<bool> {
        let mut data = self.load();
        if data.contains_key(word) {
            return Ok(false);
        }
        data.insert(word.to_string(), 0);
        self.save(&data)?;
        debug!(word, "added to incorrect notes");
        Ok(true)
    }

    pub fn record_success(&self, word: &str) -> Result<Remediation> {
        let mut data = self.load();
        let Some(count) = data.get_mut(word) else {
            return Ok(Remediation::NotTracked);
        };

        *count += 1;
        let outcome = if *count >= self.graduation {
            data.remove(word);
            info!(word, "word graduated from incorrect notes");
            Remediation::Graduated
        } else {
            Remediation::Advanced(*count)
        };

        self.save(&data)?;
        Ok(outcome)
    }
}

pub struct HistoryStore<'a, S: KeyValueStore + ?Sized> {
    kv: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> HistoryStore<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    pub fn load(&self) -> Vec<HistoryRecord> {
        load_json(self.kv, HISTORY_KEY)
    }

    pub fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        save_json(self.kv, HISTORY_KEY, &records)
    }

    pub fn append(&self, score: u32, level: Level) -> Result<HistoryRecord> {
        let mut records = self.load();
        let record = HistoryRecord {
            date: Utc::now(),
            score,
            level,
        };
        records.push(record.clone());
        self.save(&records)?;
        info!(score, level = %level, attempts = records.len(), "quiz result recorded");
        Ok(record)
    }
}

/// One point of the score chart: the attempt's 1-based position among attempts at its level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub attempt: usize,
    pub record: HistoryRecord,
}

/// The most recent `window` attempts at `level`, oldest first.
pub fn chart_window(records: &[HistoryRecord], level: Level, window: usize) -> Vec<ChartPoint> {
    let filtered: Vec<&HistoryRecord> = records.iter().filter(|r| r.level == level).collect();
    let start = filtered.len().saturating_sub(window);

    filtered[start..]
        .iter()
        .enumerate()
        .map(|(i, record)| ChartPoint {
            attempt: start + i + 1,
            record: (*record).clone(),
        })
        .collect()
}

/// All three repositories over one medium.
pub struct Stores<'a, S: KeyValueStore + ?Sized> {
    pub mastery: MasteryStore<'a, S>,
    pub incorrect: IncorrectNoteStore<'a, S>,
    pub history: HistoryStore<'a, S>,
}

impl<'a, S: KeyValueStore + ?Sized> Stores<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self {
            mastery: MasteryStore::new(kv),
            incorrect: IncorrectNoteStore::new(kv),
            history: HistoryStore::new(kv),
        }
    }

    pub fn with_graduation(mut self, graduation: u32) -> Self {
        self.incorrect = self.incorrect.with_graduation(graduation);
        self
    }

    /// Executes a persistence effect. Cue and speech effects are not ours and are skipped.
    pub fn apply(&self, effect: &Effect) -> Result<()> {
        match effect {
            Effect::IncrementMastery(word) => {
                self.mastery.increment(word)?;
            }
            Effect::AddIncorrect(word) => {
                self.incorrect.add_if_absent(word)?;
            }
            Effect::RecordRemediationSuccess(word) => {
                self.incorrect.record_success(word)?;
            }
            Effect::AppendHistory { score, level } => {
                self.history.append(*score, *level)?;
            }
            Effect::PlayCue(_) | Effect::Speak(_) => {}
        }
        Ok(())
    }
}

/// Clears history, mastery and incorrect notes. Each key is removed independently; every
/// removal is attempted and the first failure is returned.
pub fn reset_all<S: KeyValueStore + ?Sized>(kv: &S) -> Result<()> {
    let mut first_error = None;
    for key in [HISTORY_KEY, MASTERY_KEY, INCORRECT_KEY] {
        if let Err(e) = kv.remove(key) {
            warn!(key, error = %e, "failed to clear record");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => {
            info!("all learning records cleared");
            Ok(())
        }
    }
}
