//! Multiple-choice quiz generation and the per-quiz state machine.
//!
//! A [`Quiz`] never touches storage or audio itself. Every transition returns the list of
//! [`Effect`]s the caller should carry out, in order.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{Result, VocabError};
use crate::feedback::Cue;
use crate::models::{IncorrectMap, Level, WordEntry};

pub const DEFAULT_MAX_QUESTIONS: usize = 20;
pub const DEFAULT_OPTIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PlayCue(Cue),
    Speak(String),
    IncrementMastery(String),
    AddIncorrect(String),
    RecordRemediationSuccess(String),
    AppendHistory { score: u32, level: Level },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    Normal(Level),
    Remediation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    pub max_questions: usize,
    pub options: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            options: DEFAULT_OPTIONS,
        }
    }
}

impl QuizSettings {
    fn distractors(&self) -> usize {
        self.options.saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub target: WordEntry,
    pub options: Vec<WordEntry>,
}

impl Question {
    fn new<R: Rng + ?Sized>(target: WordEntry, distractors: Vec<WordEntry>, rng: &mut R) -> Self {
        let mut options = Vec::with_capacity(distractors.len() + 1);
        options.push(target.clone());
        options.extend(distractors);
        options.shuffle(rng);
        Self { target, options }
    }

    pub fn answer_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.word == self.target.word)
    }

    pub fn is_correct(&self, option: usize) -> bool {
        self.options
            .get(option)
            .is_some_and(|o| o.word == self.target.word)
    }
}

/// Entries not named in `excluded`, first occurrence of each word only.
fn distinct_excluding<'a>(
    entries: impl IntoIterator<Item = &'a WordEntry>,
    excluded: &HashSet<&str>,
) -> Vec<&'a WordEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| !excluded.contains(e.word.as_str()) && seen.insert(e.word.as_str()))
        .collect()
}

/// Samples `count` distractors for `target` without replacement from `preferred`, topping up
/// from `fallback` when `preferred` runs short. Never returns the target or the same word twice;
/// returns fewer than `count` when both sources are exhausted.
fn pick_distractors<'a, R: Rng + ?Sized>(
    target: &WordEntry,
    preferred: &[&'a WordEntry],
    fallback: &[&'a WordEntry],
    count: usize,
    rng: &mut R,
) -> Vec<WordEntry> {
    let mut excluded: HashSet<&str> = HashSet::new();
    excluded.insert(target.word.as_str());

    let first = distinct_excluding(preferred.iter().copied(), &excluded);
    let mut chosen: Vec<&WordEntry> = first.choose_multiple(rng, count).copied().collect();

    if chosen.len() < count {
        for entry in &chosen {
            excluded.insert(entry.word.as_str());
        }
        let rest = distinct_excluding(fallback.iter().copied(), &excluded);
        let missing = count - chosen.len();
        debug!(
            word = %target.word,
            missing,
            available = rest.len(),
            "distractor shortage, sampling fallback"
        );
        chosen.extend(rest.choose_multiple(rng, missing).copied());
    }

    chosen.into_iter().cloned().collect()
}

/// Shuffles `pool` and keeps the first `limit` entries.
fn pick_targets<R: Rng + ?Sized>(pool: &[WordEntry], limit: usize, rng: &mut R) -> Vec<WordEntry> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(limit);
    shuffled
}

/// Questions for a normal quiz: up to `max_questions` targets from `pool`, distractors from the
/// same level first and then from the whole catalog.
pub fn generate_questions<R: Rng + ?Sized>(
    pool: &[WordEntry],
    level: Level,
    catalog: &Catalog,
    settings: &QuizSettings,
    rng: &mut R,
) -> Vec<Question> {
    let same_level = catalog.by_level(level);
    let everything: Vec<&WordEntry> = catalog.entries().iter().collect();

    pick_targets(pool, settings.max_questions, rng)
        .into_iter()
        .map(|target| {
            let distractors =
                pick_distractors(&target, &same_level, &everything, settings.distractors(), rng);
            Question::new(target, distractors, rng)
        })
        .collect()
}

/// Catalog entries currently in the incorrect notes, in catalog order.
pub fn remediation_pool(catalog: &Catalog, incorrect: &IncorrectMap) -> Vec<WordEntry> {
    catalog
        .entries()
        .iter()
        .filter(|e| incorrect.contains_key(&e.word))
        .cloned()
        .collect()
}

/// Questions for a remediation quiz: every pool word once, distractors from the pool first
/// and then from catalog words outside the pool.
pub fn generate_remediation_questions<R: Rng + ?Sized>(
    pool: &[WordEntry],
    catalog: &Catalog,
    settings: &QuizSettings,
    rng: &mut R,
) -> Vec<Question> {
    let in_pool: HashSet<&str> = pool.iter().map(|e| e.word.as_str()).collect();
    let preferred: Vec<&WordEntry> = pool.iter().collect();
    let outside: Vec<&WordEntry> = catalog
        .entries()
        .iter()
        .filter(|e| !in_pool.contains(e.word.as_str()))
        .collect();

    pick_targets(pool, pool.len(), rng)
        .into_iter()
        .map(|target| {
            let distractors =
                pick_distractors(&target, &preferred, &outside, settings.distractors(), rng);
            Question::new(target, distractors, rng)
        })
        .collect()
}

/// round(100 * correct / total), 0 for an empty quiz.
pub fn final_score(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

pub fn result_message(score: u32) -> &'static str {
    match score {
        90.. => "Perfect! You know these words inside out!",
        70..=89 => "Great job! Just a little more for a perfect score!",
        50..=69 => "Good! Keep studying steadily.",
        _ => "Don't give up! Shall we try again?",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answered {
    pub selected: usize,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    NotStarted,
    /// `answered` is set between scoring a question and moving on; options are locked meanwhile.
    InProgress {
        index: usize,
        answered: Option<Answered>,
    },
    Completed {
        score: u32,
    },
}

#[derive(Debug, Clone)]
pub struct Quiz {
    mode: QuizMode,
    questions: Vec<Question>,
    state: QuizState,
    correct: usize,
}

impl Quiz {
    pub fn new(mode: QuizMode, questions: Vec<Question>) -> Self {
        Self {
            mode,
            questions,
            state: QuizState::NotStarted,
            correct: 0,
        }
    }

    pub fn normal<R: Rng + ?Sized>(
        pool: &[WordEntry],
        level: Level,
        catalog: &Catalog,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<Self> {
        if pool.is_empty() {
            return Err(VocabError::EmptyPool(format!("no {} words to quiz", level)));
        }
        let questions = generate_questions(pool, level, catalog, settings, rng);
        Ok(Self::new(QuizMode::Normal(level), questions))
    }

    pub fn remediation<R: Rng + ?Sized>(
        catalog: &Catalog,
        incorrect: &IncorrectMap,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<Self> {
        let pool = remediation_pool(catalog, incorrect);
        if pool.is_empty() {
            return Err(VocabError::EmptyPool(
                "the incorrect-answer notes are empty".to_string(),
            ));
        }
        let questions = generate_remediation_questions(&pool, catalog, settings, rng);
        Ok(Self::new(QuizMode::Remediation, questions))
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }


    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn correct_count(&self) -> usize {
        self.correct
    }

    pub fn current(&self) -> Option<&Question> {
        match self.state {
            QuizState::InProgress { index, .. } => self.questions.get(index),
            _ => None,
        }
    }

    pub fn answered(&self) -> Option<Answered> {
        match self.state {
            QuizState::InProgress { answered, .. } => answered,
            _ => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.answered().is_some()
    }

    /// "4 / 20" for the question on screen.
    pub fn progress_label(&self) -> String {
        match self.state {
            QuizState::InProgress { index, .. } => format!("{} / {}", index + 1, self.total()),
            QuizState::Completed { .. } => format!("{} / {}", self.total(), self.total()),
            QuizState::NotStarted => format!("0 / {}", self.total()),
        }
    }

    /// Fraction of questions already behind us, for the progress bar.
    pub fn progress_ratio(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        match self.state {
            QuizState::InProgress { index, .. } => index as f64 / self.total() as f64,
            QuizState::Completed { .. } => 1.0,
            QuizState::NotStarted => 0.0,
        }
    }

    pub fn start(&mut self) {
        if self.state != QuizState::NotStarted {
            return;
        }
        self.correct = 0;
        self.state = if self.questions.is_empty() {
            QuizState::Completed { score: 0 }
        } else {
            QuizState::InProgress {
                index: 0,
                answered: None,
            }
        };
        debug!(mode = ?self.mode, questions = self.total(), "quiz started");
    }

    /// Scores `option` for the current question and locks it. Ignored when no question is
    /// open or the current one was already answered.
    pub fn answer(&mut self, option: usize) -> Vec<Effect> {
        let QuizState::InProgress {
            index,
            answered: None,
        } = self.state
        else {
            return Vec::new();
        };
        let Some(question) = self.questions.get(index) else {
            return Vec::new();
        };
        if option >= question.options.len() {
            return Vec::new();
        }

        let word = question.target.word.clone();
        let correct = question.is_correct(option);
        let mut effects = Vec::with_capacity(3);

        if correct {
            self.correct += 1;
            effects.push(Effect::PlayCue(Cue::Correct));
            effects.push(Effect::IncrementMastery(word.clone()));
            if self.mode == QuizMode::Remediation {
                effects.push(Effect::RecordRemediationSuccess(word));
            }
        } else {
            effects.push(Effect::PlayCue(Cue::Wrong));
            effects.push(Effect::AddIncorrect(word));
        }

        self.state = QuizState::InProgress {
            index,
            answered: Some(Answered {
                selected: option,
                correct,
            }),
        };
        effects
    }

    /// Moves past an answered question. After the last one the quiz completes and, outside
    /// remediation, the score is recorded.
    pub fn advance(&mut self) -> Vec<Effect> {
        let QuizState::InProgress {
            index,
            answered: Some(_),
        } = self.state
        else {
            return Vec::new();
        };

        if index + 1 < self.total() {
            self.state = QuizState::InProgress {
                index: index + 1,
                answered: None,
            };
            return Vec::new();
        }

        let score = final_score(self.correct, self.total());
        self.state = QuizState::Completed { score };
        info!(mode = ?self.mode, score, correct = self.correct, total = self.total(), "quiz completed");

        match self.mode {
            QuizMode::Normal(level) => vec![Effect::AppendHistory { score, level }],
            QuizMode::Remediation => Vec::new(),
        }
    }

    /// Learner quit: back to not started, nothing recorded.
    pub fn abort(&mut self) {
        if let QuizState::InProgress { .. } = self.state {
            debug!(mode = ?self.mode, "quiz aborted");
            self.state = QuizState::NotStarted;
            self.correct = 0;
        }
    }

    pub fn score(&self) -> Option<u32> {
        match self.state {
            QuizState::Completed { score } => Some(score),
            _ => None,
        }
    }

    pub fn speak_current(&self) -> Option<Effect> {
        self.current().map(|q| Effect::Speak(q.target.word.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::MemoryStore;
    use crate::models::MasteryMap;
    use crate::session::{start_learning, SessionStart};
    use crate::store::Stores;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn entries(level: Level, words: &[&str]) -> Vec<WordEntry> {
        words
            .iter()
            .map(|w| WordEntry::new(*w, format!("meaning of {}", w), level))
            .collect()
    }

    fn mixed_catalog() -> Catalog {
        let mut all = entries(Level::Easy, &["A", "B", "C", "D", "E", "F"]);
        all.extend(entries(Level::Medium, &["M1", "M2", "M3", "M4"]));
        all.extend(entries(Level::Hard, &["H1", "H2"]));
        Catalog::new(all)
    }

    fn apply_all(stores: &Stores<'_, MemoryStore>, effects: &[Effect]) {
        for effect in effects {
            stores.apply(effect).unwrap();
        }
    }

    fn answer_correctly(quiz: &mut Quiz) -> Vec<Effect> {
        let index = quiz.current().unwrap().answer_index().unwrap();
        quiz.answer(index)
    }

    fn answer_wrongly(quiz: &mut Quiz) -> Vec<Effect> {
        let question = quiz.current().unwrap();
        let index = (0..question.options.len())
            .find(|&i| !question.is_correct(i))
            .unwrap();
        quiz.answer(index)
    }

    mod generation_tests {
        use super::*;

        #[test]
        fn pool_of_five_yields_five_questions() {
            let catalog = mixed_catalog();
            let pool = entries(Level::Easy, &["A", "B", "C", "D", "E"]);
            let questions =
                generate_questions(&pool, Level::Easy, &catalog, &QuizSettings::default(), &mut rng(1));
            assert_eq!(questions.len(), 5);
        }

        #[test]
        fn large_pool_is_capped_at_twenty() {
            let words: Vec<String> = (0..30).map(|i| format!("w{}", i)).collect();
            let pool: Vec<WordEntry> = words
                .iter()
                .map(|w| WordEntry::new(w.as_str(), "m", Level::Medium))
                .collect();
            let catalog = Catalog::new(pool.clone());
            let questions =
                generate_questions(&pool, Level::Medium, &catalog, &QuizSettings::default(), &mut rng(2));
            assert_eq!(questions.len(), 20);

            let mut targets: Vec<&str> = questions.iter().map(|q| q.target.word.as_str()).collect();
            targets.sort();
            targets.dedup();
            assert_eq!(targets.len(), 20, "targets are drawn without replacement");
        }

        #[test]
        fn options_never_repeat_a_word() {
            let catalog = mixed_catalog();
            let pool = entries(Level::Easy, &["A", "B", "C", "D", "E", "F"]);
            for seed in 0..200 {
                let questions = generate_questions(
                    &pool,
                    Level::Easy,
                    &catalog,
                    &QuizSettings::default(),
                    &mut rng(seed),
                );
                for q in &questions {
                    let mut words: Vec<&str> = q.options.iter().map(|o| o.word.as_str()).collect();
                    words.sort();
                    words.dedup();
                    assert_eq!(words.len(), q.options.len(), "seed {}", seed);
                    assert_eq!(q.options.len(), 4);
                    assert!(q.answer_index().is_some());
                }
            }
        }

        #[test]
        fn duplicate_catalog_entries_do_not_duplicate_options() {
            let mut all = entries(Level::Easy, &["A", "B", "C"]);
            all.extend(entries(Level::Easy, &["B", "C"]));
            all.extend(entries(Level::Hard, &["H"]));
            let catalog = Catalog::new(all);
            let pool = entries(Level::Easy, &["A"]);
            for seed in 0..50 {
                let q = &generate_questions(
                    &pool,
                    Level::Easy,
                    &catalog,
                    &QuizSettings::default(),
                    &mut rng(seed),
                )[0];
                let mut words: Vec<&str> = q.options.iter().map(|o| o.word.as_str()).collect();
                words.sort();
                assert_eq!(words, vec!["A", "B", "C", "H"]);
            }
        }

        #[test]
        fn distractors_prefer_same_level() {
            let catalog = mixed_catalog();
            let pool = entries(Level::Easy, &["A", "B"]);
            for seed in 0..50 {
                for q in generate_questions(
                    &pool,
                    Level::Easy,
                    &catalog,
                    &QuizSettings::default(),
                    &mut rng(seed),
                ) {
                    assert!(q.options.iter().all(|o| o.level == Level::Easy));
                }
            }
        }

        #[test]
        fn distractors_fall_back_across_levels() {
            let catalog = mixed_catalog();
            let pool = entries(Level::Hard, &["H1"]);
            let q = &generate_questions(
                &pool,
                Level::Hard,
                &catalog,
                &QuizSettings::default(),
                &mut rng(3),
            )[0];
            assert_eq!(q.options.len(), 4);
            assert!(q.options.iter().any(|o| o.word == "H2"));
            assert_eq!(q.options.iter().filter(|o| o.level != Level::Hard).count(), 2);
        }

        #[test]
        fn tiny_catalog_gives_fewer_options() {
            let catalog = Catalog::new(entries(Level::Easy, &["A", "B"]));
            let pool = catalog.entries().to_vec();
            let questions =
                generate_questions(&pool, Level::Easy, &catalog, &QuizSettings::default(), &mut rng(4));
            assert_eq!(questions.len(), 2);
            for q in questions {
                assert_eq!(q.options.len(), 2);
                assert!(q.answer_index().is_some());
            }
        }

        #[test]
        fn answer_position_varies() {
            let catalog = mixed_catalog();
            let pool = entries(Level::Easy, &["A", "B", "C", "D", "E", "F"]);
            let mut positions = HashSet::new();
            for seed in 0..30 {
                for q in generate_questions(
                    &pool,
                    Level::Easy,
                    &catalog,
                    &QuizSettings::default(),
                    &mut rng(seed),
                ) {
                    positions.insert(q.answer_index().unwrap());
                }
            }
            assert_eq!(positions.len(), 4);
        }

        #[test]
        fn custom_option_count() {
            let catalog = mixed_catalog();
            let pool = entries(Level::Easy, &["A"]);
            let settings = QuizSettings {
                max_questions: 20,
                options: 3,
            };
            let q = &generate_questions(&pool, Level::Easy, &catalog, &settings, &mut rng(5))[0];
            assert_eq!(q.options.len(), 3);
        }
    }

    mod remediation_generation_tests {
        use super::*;

        #[test]
        fn pool_is_catalog_words_in_notes() {
            let catalog = mixed_catalog();
            let incorrect: IncorrectMap = [("H1".to_string(), 1), ("B".to_string(), 0), ("zzz".to_string(), 0)]
                .into_iter()
                .collect();
            let pool: Vec<String> = remediation_pool(&catalog, &incorrect)
                .into_iter()
                .map(|e| e.word)
                .collect();
            assert_eq!(pool, vec!["B", "H1"]);
        }

        #[test]
        fn whole_pool_is_quizzed() {
            let words: Vec<String> = (0..25).map(|i| format!("w{}", i)).collect();
            let catalog = Catalog::new(
                words
                    .iter()
                    .map(|w| WordEntry::new(w.as_str(), "m", Level::Easy))
                    .collect(),
            );
            let incorrect: IncorrectMap = words.iter().map(|w| (w.clone(), 0)).collect();
            let quiz =
                Quiz::remediation(&catalog, &incorrect, &QuizSettings::default(), &mut rng(6)).unwrap();
            assert_eq!(quiz.total(), 25);
        }

        #[test]
        fn distractors_prefer_other_pending_words() {
            let catalog = mixed_catalog();
            let incorrect: IncorrectMap = ["A", "M1", "H1", "H2"]
                .iter()
                .map(|w| (w.to_string(), 0))
                .collect();
            let pending: HashSet<&str> = ["A", "M1", "H1", "H2"].into_iter().collect();
            for seed in 0..30 {
                let quiz =
                    Quiz::remediation(&catalog, &incorrect, &QuizSettings::default(), &mut rng(seed))
                        .unwrap();
                for q in &quiz.questions {
                    assert!(q.options.iter().all(|o| pending.contains(o.word.as_str())));
                }
            }
        }

        #[test]
        fn short_pool_falls_back_outside_it() {
            let catalog = mixed_catalog();
            let incorrect: IncorrectMap = [("A".to_string(), 0), ("B".to_string(), 0)]
                .into_iter()
                .collect();
            let quiz =
                Quiz::remediation(&catalog, &incorrect, &QuizSettings::default(), &mut rng(7)).unwrap();
            for q in &quiz.questions {
                assert_eq!(q.options.len(), 4);
                let other_pending = if q.target.word == "A" { "B" } else { "A" };
                assert!(q.options.iter().any(|o| o.word == other_pending));
            }
        }

        #[test]
        fn empty_notes_abort() {
            let catalog = mixed_catalog();
            let result =
                Quiz::remediation(&catalog, &IncorrectMap::new(), &QuizSettings::default(), &mut rng(8));
            assert!(matches!(result, Err(VocabError::EmptyPool(_))));
        }
    }

    mod scoring_tests {
        use super::*;

        #[test]
        fn final_score_rounds() {
            assert_eq!(final_score(7, 10), 70);
            assert_eq!(final_score(1, 3), 33);
            assert_eq!(final_score(2, 3), 67);
            assert_eq!(final_score(1, 8), 13);
            assert_eq!(final_score(4, 4), 100);
        }

        #[test]
        fn final_score_empty_quiz_is_zero() {
            assert_eq!(final_score(0, 0), 0);
        }

        #[test]
        fn result_message_tiers() {
            assert_eq!(result_message(100), result_message(90));
            assert_ne!(result_message(89), result_message(90));
            assert_eq!(result_message(70), result_message(89));
            assert_eq!(result_message(50), result_message(69));
            assert_eq!(result_message(0), result_message(49));
            assert_ne!(result_message(49), result_message(50));
        }

        #[test]
        fn result_messages_do_not_assume_a_language() {
            for score in [0, 49, 50, 70, 90, 100] {
                let message = result_message(score);
                assert!(!message.contains("native"), "{message}");
                assert!(!message.contains("speaker"), "{message}");
            }
        }
    }

    mod state_machine_tests {
        use super::*;

        fn quiz(seed: u64) -> Quiz {
            let catalog = mixed_catalog();
            let pool = entries(Level::Easy, &["A", "B", "C"]);
            Quiz::normal(&pool, Level::Easy, &catalog, &QuizSettings::default(), &mut rng(seed))
                .unwrap()
        }

        #[test]
        fn new_quiz_is_not_started() {
            let q = quiz(1);
            assert_eq!(q.state, QuizState::NotStarted);
            assert!(q.current().is_none());
        }

        #[test]
        fn answering_before_start_does_nothing() {
            let mut q = quiz(1);
            assert!(q.answer(0).is_empty());
            assert!(q.advance().is_empty());
        }

        #[test]
        fn correct_answer_effects() {
            let mut q = quiz(2);
            q.start();
            let word = q.current().unwrap().target.word.clone();
            let effects = answer_correctly(&mut q);
            assert_eq!(
                effects,
                vec![
                    Effect::PlayCue(Cue::Correct),
                    Effect::IncrementMastery(word)
                ]
            );
            assert_eq!(q.correct_count(), 1);
        }

        #[test]
        fn wrong_answer_effects() {
            let mut q = quiz(3);
            q.start();
            let word = q.current().unwrap().target.word.clone();
            let effects = answer_wrongly(&mut q);
            assert_eq!(
                effects,
                vec![Effect::PlayCue(Cue::Wrong), Effect::AddIncorrect(word)]
            );
            assert_eq!(q.correct_count(), 0);
            assert!(!q.answered().unwrap().correct);
        }

        #[test]
        fn answered_question_is_locked() {
            let mut q = quiz(4);
            q.start();
            answer_correctly(&mut q);
            assert!(q.is_locked());
            assert!(answer_correctly(&mut q).is_empty());
            assert_eq!(q.correct_count(), 1);
        }

        #[test]
        fn out_of_range_option_is_ignored() {
            let mut q = quiz(4);
            q.start();
            assert!(q.answer(99).is_empty());
            assert!(!q.is_locked());
        }

        #[test]
        fn advance_requires_an_answer() {
            let mut q = quiz(5);
            q.start();
            assert!(q.advance().is_empty());
            assert_eq!(
                q.state,
                QuizState::InProgress {
                    index: 0,
                    answered: None
                }
            );
        }

        #[test]
        fn completing_records_history() {
            let mut q = quiz(6);
            q.start();
            answer_correctly(&mut q);
            assert!(q.advance().is_empty());
            answer_wrongly(&mut q);
            assert!(q.advance().is_empty());
            answer_correctly(&mut q);
            let effects = q.advance();

            assert_eq!(q.state, QuizState::Completed { score: 67 });
            assert_eq!(
                effects,
                vec![Effect::AppendHistory {
                    score: 67,
                    level: Level::Easy
                }]
            );
            assert_eq!(q.score(), Some(67));
        }

        #[test]
        fn abort_discards_progress() {
            let mut q = quiz(7);
            q.start();
            answer_correctly(&mut q);
            q.advance();
            q.abort();

            assert_eq!(q.state, QuizState::NotStarted);
            assert_eq!(q.correct_count(), 0);
            assert!(q.advance().is_empty());
        }

        #[test]
        fn progress_labels() {
            let mut q = quiz(8);
            assert_eq!(q.progress_label(), "0 / 3");
            q.start();
            assert_eq!(q.progress_label(), "1 / 3");
            assert_eq!(q.progress_ratio(), 0.0);
            answer_correctly(&mut q);
            q.advance();
            assert_eq!(q.progress_label(), "2 / 3");
        }

        #[test]
        fn empty_pool_is_rejected() {
            let result = Quiz::normal(
                &[],
                Level::Easy,
                &mixed_catalog(),
                &QuizSettings::default(),
                &mut rng(0),
            );
            assert!(matches!(result, Err(VocabError::EmptyPool(_))));
        }

        #[test]
        fn quiz_without_questions_completes_at_zero() {
            let mut q = Quiz::new(QuizMode::Normal(Level::Easy), Vec::new());
            q.start();
            assert_eq!(q.state, QuizState::Completed { score: 0 });
        }

        #[test]
        fn speak_current_target() {
            let mut q = quiz(10);
            assert!(q.speak_current().is_none());
            q.start();
            let target = q.current().unwrap().target.word.clone();
            assert_eq!(q.speak_current(), Some(Effect::Speak(target)));
        }
    }

    mod scenario_tests {
        use super::*;

        #[test]
        fn four_easy_words_all_correct() {
            let catalog = Catalog::new(entries(Level::Easy, &["A", "B", "C", "D"]));
            let kv = MemoryStore::new();
            let stores = Stores::new(&kv);

            let SessionStart::Ready(session) =
                start_learning(Level::Easy, &catalog, &stores.mastery.load()).unwrap()
            else {
                panic!("Expected a ready session");
            };
            assert_eq!(session.words().len(), 4);

            let mut quiz = Quiz::normal(
                session.words(),
                Level::Easy,
                &catalog,
                &QuizSettings::default(),
                &mut rng(42),
            )
            .unwrap();
            assert_eq!(quiz.total(), 4);
            for q in &quiz.questions {
                assert_eq!(q.options.len(), 4);
                let mut words: Vec<&str> = q.options.iter().map(|o| o.word.as_str()).collect();
                words.sort();
                assert_eq!(words, vec!["A", "B", "C", "D"]);
            }

            quiz.start();
            for _ in 0..4 {
                let effects = answer_correctly(&mut quiz);
                apply_all(&stores, &effects);
                let effects = quiz.advance();
                apply_all(&stores, &effects);
            }

            assert_eq!(quiz.score(), Some(100));
            let mastery: MasteryMap = stores.mastery.load();
            for w in ["A", "B", "C", "D"] {
                assert_eq!(mastery.get(w), Some(&1));
            }
            let history = stores.history.load();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].level, Level::Easy);
            assert_eq!(history[0].score, 100);
        }

        #[test]
        fn wrong_answer_enters_notes_once() {
            let catalog = Catalog::new(entries(Level::Easy, &["A", "B", "C", "D"]));
            let kv = MemoryStore::new();
            let stores = Stores::new(&kv);
            stores.incorrect.add_if_absent("A").unwrap();
            stores.incorrect.record_success("A").unwrap();

            let pool = entries(Level::Easy, &["A"]);
            let mut quiz =
                Quiz::normal(&pool, Level::Easy, &catalog, &QuizSettings::default(), &mut rng(1))
                    .unwrap();
            quiz.start();
            apply_all(&stores, &answer_wrongly(&mut quiz));
            apply_all(&stores, &quiz.advance());

            assert_eq!(stores.incorrect.load().get("A"), Some(&1));
            assert_eq!(stores.history.load()[0].score, 0);
        }

        #[test]
        fn remediation_graduates_after_three_successes() {
            let catalog = mixed_catalog();
            let kv = MemoryStore::new();
            let stores = Stores::new(&kv);
            stores.incorrect.add_if_absent("A").unwrap();

            for round in 1..=3 {
                let mut quiz = Quiz::remediation(
                    &catalog,
                    &stores.incorrect.load(),
                    &QuizSettings::default(),
                    &mut rng(round),
                )
                .unwrap();
                assert_eq!(quiz.total(), 1);
                quiz.start();
                apply_all(&stores, &answer_correctly(&mut quiz));
                apply_all(&stores, &quiz.advance());

                if round < 3 {
                    assert_eq!(stores.incorrect.load().get("A"), Some(&(round as u32)));
                }
            }

            assert!(!stores.incorrect.contains("A"));
            assert!(stores.history.load().is_empty(), "remediation never writes history");
            assert_eq!(stores.mastery.level("A"), 3);
        }

        #[test]
        fn remediation_wrong_answer_keeps_count() {
            let catalog = mixed_catalog();
            let kv = MemoryStore::new();
            let stores = Stores::new(&kv);
            stores.incorrect.add_if_absent("A").unwrap();
            stores.incorrect.record_success("A").unwrap();

            let mut quiz = Quiz::remediation(
                &catalog,
                &stores.incorrect.load(),
                &QuizSettings::default(),
                &mut rng(11),
            )
            .unwrap();
            quiz.start();
            let effects = answer_wrongly(&mut quiz);
            assert!(!effects
                .iter()
                .any(|e| matches!(e, Effect::RecordRemediationSuccess(_))));
            apply_all(&stores, &effects);
            assert!(quiz.advance().is_empty());

            assert_eq!(stores.incorrect.load().get("A"), Some(&1));
        }
    }
}
