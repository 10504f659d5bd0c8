mod ui;
mod widgets;

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::feedback::{run_effects, Feedback};
use crate::models::{
    HistoryRecord, IncorrectMap, Level, MasteryMap, PendingWord, WordEntry, WordWithMastery,
};
use crate::quiz::{Effect, Quiz, QuizMode};
use crate::session::{mastered_words, pending_words, start_learning, LearningSession, SessionStart};
use crate::store::{reset_all, Stores};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Learning,
    Quiz,
    Result,
    Mastered,
    IncorrectNote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    ReviewAllMastered(Level, Vec<WordEntry>),
    QuitQuiz,
    ResetAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirm {
    pub action: ConfirmAction,
    pub prompt: String,
}

/// Score shown on the result screen. Absent when the screen is opened as the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub mode: QuizMode,
    pub score: u32,
    pub correct: usize,
    pub total: usize,
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App {
    db: Database,
    config: Config,
    catalog: Catalog,
    feedback: Box<dyn Feedback>,
    rng: StdRng,
    pub screen: Screen,
    pub level: Level,
    pub learning: Option<LearningSession>,
    pub quiz: Option<Quiz>,
    answered_at: Option<Instant>,
    pub outcome: Option<QuizOutcome>,
    pub chart_level: Level,
    pub mastery: MasteryMap,
    pub incorrect: IncorrectMap,
    pub history: Vec<HistoryRecord>,
    pub mastered: StatefulList<WordWithMastery>,
    pub pending: StatefulList<PendingWord>,
    pub confirm: Option<Confirm>,
    pub message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database, config: Config, catalog: Catalog, feedback: Box<dyn Feedback>) -> Self {
        Self::with_rng(db, config, catalog, feedback, StdRng::from_entropy())
    }

    pub fn with_rng(
        db: Database,
        config: Config,
        catalog: Catalog,
        feedback: Box<dyn Feedback>,
        rng: StdRng,
    ) -> Self {
        let mut app = Self {
            db,
            config,
            catalog,
            feedback,
            rng,
            screen: Screen::Welcome,
            level: Level::Easy,
            learning: None,
            quiz: None,
            answered_at: None,
            outcome: None,
            chart_level: Level::Easy,
            mastery: MasteryMap::new(),
            incorrect: IncorrectMap::new(),
            history: Vec::new(),
            mastered: StatefulList::with_items(Vec::new()),
            pending: StatefulList::with_items(Vec::new()),
            confirm: None,
            message: None,
            should_quit: false,
        };
        app.refresh_data();
        app
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn stores(&self) -> Stores<'_, Database> {
        Stores::new(&self.db).with_graduation(self.config.remediation.graduation)
    }

    pub fn refresh_data(&mut self) {
        let stores = self.stores();
        let mastery = stores.mastery.load();
        let incorrect = stores.incorrect.load();
        let history = stores.history.load();

        self.mastered = StatefulList::with_items(mastered_words(&self.catalog, &mastery));
        self.pending = StatefulList::with_items(pending_words(&self.catalog, &incorrect));
        self.mastery = mastery;
        self.incorrect = incorrect;
        self.history = history;
    }

    pub fn mastery_of(&self, word: &str) -> u32 {
        self.mastery.get(word).copied().unwrap_or(0)
    }

    pub fn catalog_count(&self, level: Level) -> usize {
        self.catalog.by_level(level).len()
    }

    pub fn mastered_count(&self, level: Level) -> usize {
        self.mastered
            .items
            .iter()
            .filter(|w| w.entry.level == level)
            .count()
    }

    fn execute(&mut self, effects: &[Effect]) -> Result<()> {
        let stores = Stores::new(&self.db).with_graduation(self.config.remediation.graduation);
        run_effects(effects, &stores, self.feedback.as_mut())
    }

    fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            warn!(error = %e, "action failed");
            self.message = Some(e.to_string());
        }
    }

    // Learning

    fn start_learning(&mut self, level: Level) -> Result<()> {
        self.level = level;
        match start_learning(level, &self.catalog, &self.mastery)? {
            SessionStart::Ready(session) => self.open_learning(session),
            SessionStart::AllMastered(all) => {
                self.confirm = Some(Confirm {
                    prompt: format!(
                        "You have mastered every {} word! Review them all anyway?",
                        level
                    ),
                    action: ConfirmAction::ReviewAllMastered(level, all),
                });
            }
        }
        Ok(())
    }

    fn open_learning(&mut self, session: LearningSession) {
        self.learning = Some(session);
        self.screen = Screen::Learning;
    }

    fn toggle_mastery(&mut self, level: u32) -> Result<()> {
        if let Some(session) = &self.learning {
            let stores = Stores::new(&self.db);
            session.toggle_mastery(&stores.mastery, level)?;
        }
        self.refresh_data();
        Ok(())
    }

    fn speak_learning(&mut self) -> Result<()> {
        let effect = self.learning.as_ref().and_then(LearningSession::speak_current);
        self.execute(&effect.into_iter().collect::<Vec<_>>())
    }

    // Quiz

    fn start_quiz(&mut self) -> Result<()> {
        let Some(session) = &self.learning else {
            return Ok(());
        };
        let settings = self.config.quiz_settings();
        let mut quiz = Quiz::normal(
            session.words(),
            session.level(),
            &self.catalog,
            &settings,
            &mut self.rng,
        )?;
        quiz.start();
        self.open_quiz(quiz);
        Ok(())
    }

    fn start_remediation(&mut self) -> Result<()> {
        let settings = self.config.quiz_settings();
        let mut quiz = Quiz::remediation(&self.catalog, &self.incorrect, &settings, &mut self.rng)?;
        quiz.start();
        self.open_quiz(quiz);
        Ok(())
    }

    fn open_quiz(&mut self, quiz: Quiz) {
        debug!(questions = quiz.total(), "quiz opened");
        self.quiz = Some(quiz);
        self.answered_at = None;
        self.outcome = None;
        self.screen = Screen::Quiz;
    }

    fn answer(&mut self, option: usize, now: Instant) -> Result<()> {
        let Some(quiz) = &mut self.quiz else {
            return Ok(());
        };
        if quiz.is_locked() {
            return Ok(());
        }
        let effects = quiz.answer(option);
        if effects.is_empty() {
            return Ok(());
        }
        self.answered_at = Some(now);
        self.execute(&effects)
    }

    fn speak_quiz(&mut self) -> Result<()> {
        let effect = self.quiz.as_ref().and_then(Quiz::speak_current);
        self.execute(&effect.into_iter().collect::<Vec<_>>())
    }

    fn answer_delay(&self) -> Duration {
        Duration::from_millis(self.config.quiz.answer_delay_ms)
    }

    /// Runs the deferred move to the next question once the answer has been on screen long
    /// enough.
    pub fn tick(&mut self, now: Instant) {
        let Some(answered_at) = self.answered_at else {
            return;
        };
        // Hold the quiz where it is until the quit prompt is answered.
        if matches!(
            self.confirm,
            Some(Confirm {
                action: ConfirmAction::QuitQuiz,
                ..
            })
        ) {
            return;
        }
        if now.duration_since(answered_at) < self.answer_delay() {
            return;
        }
        self.answered_at = None;

        let Some(quiz) = &mut self.quiz else {
            return;
        };
        let effects = quiz.advance();
        let finished = quiz.score().map(|score| QuizOutcome {
            mode: quiz.mode(),
            score,
            correct: quiz.correct_count(),
            total: quiz.total(),
        });

        let result = self.execute(&effects);
        self.report(result);

        if let Some(outcome) = finished {
            self.quiz = None;
            self.refresh_data();
            self.show_result(Some(outcome));
        }
    }

    fn quit_quiz(&mut self) {
        if let Some(quiz) = &mut self.quiz {
            quiz.abort();
        }
        self.quiz = None;
        self.answered_at = None;
        self.screen = Screen::Welcome;
    }

    // Result / history

    fn show_result(&mut self, outcome: Option<QuizOutcome>) {
        self.chart_level = match outcome.map(|o| o.mode) {
            Some(QuizMode::Normal(level)) => level,
            _ => self.level,
        };
        self.outcome = outcome;
        self.screen = Screen::Result;
    }

    // Confirmation

    fn resolve_confirm(&mut self, accepted: bool) -> Result<()> {
        let Some(confirm) = self.confirm.take() else {
            return Ok(());
        };
        if !accepted {
            return Ok(());
        }

        match confirm.action {
            ConfirmAction::ReviewAllMastered(level, all) => {
                self.open_learning(LearningSession::new(level, all));
            }
            ConfirmAction::QuitQuiz => self.quit_quiz(),
            ConfirmAction::ResetAll => {
                let result = reset_all(&self.db);
                self.refresh_data();
                result?;
                self.message = Some("All records have been deleted.".to_string());
            }
        }
        Ok(())
    }

    fn ask(&mut self, action: ConfirmAction, prompt: &str) {
        self.confirm = Some(Confirm {
            action,
            prompt: prompt.to_string(),
        });
    }

    // Keys

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        self.handle_key_at(key, modifiers, Instant::now());
    }

    fn handle_key_at(&mut self, key: KeyCode, modifiers: KeyModifiers, now: Instant) {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        self.message = None;

        let result = if self.confirm.is_some() {
            match key {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.resolve_confirm(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.resolve_confirm(false),
                _ => Ok(()),
            }
        } else {
            match self.screen {
                Screen::Welcome => self.handle_welcome_key(key),
                Screen::Learning => self.handle_learning_key(key),
                Screen::Quiz => self.handle_quiz_key(key, now),
                Screen::Result => self.handle_result_key(key),
                Screen::Mastered => self.handle_mastered_key(key),
                Screen::IncorrectNote => self.handle_incorrect_key(key),
            }
        };
        self.report(result);
    }

    fn handle_welcome_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char('1') => self.start_learning(Level::Easy)?,
            KeyCode::Char('2') => self.start_learning(Level::Medium)?,
            KeyCode::Char('3') => self.start_learning(Level::Hard)?,
            KeyCode::Char('r') => {
                self.refresh_data();
                self.show_result(None);
            }
            KeyCode::Char('m') => {
                self.refresh_data();
                self.screen = Screen::Mastered;
            }
            KeyCode::Char('n') => {
                self.refresh_data();
                self.screen = Screen::IncorrectNote;
            }
            KeyCode::Char('X') => self.ask(
                ConfirmAction::ResetAll,
                "Delete your history, mastered words and incorrect notes?",
            ),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    fn handle_learning_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(session) = &mut self.learning {
                    session.prev();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(session) = &mut self.learning {
                    session.next();
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(session) = &mut self.learning {
                    session.toggle_meaning();
                }
            }
            KeyCode::Char('s') => self.speak_learning()?,
            KeyCode::Char(c @ '1'..='3') => self.toggle_mastery(c as u32 - '0' as u32)?,
            KeyCode::Char('t') => self.start_quiz()?,
            KeyCode::Esc | KeyCode::Char('q') => {
                self.learning = None;
                self.screen = Screen::Welcome;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_quiz_key(&mut self, key: KeyCode, now: Instant) -> Result<()> {
        match key {
            KeyCode::Char(c @ '1'..='9') => {
                let option = (c as u8 - b'1') as usize;
                self.answer(option, now)?;
            }
            KeyCode::Char('s') => self.speak_quiz()?,
            KeyCode::Esc | KeyCode::Char('q') => self.ask(
                ConfirmAction::QuitQuiz,
                "Quit the test? Your score will not be saved.",
            ),
            _ => {}
        }
        Ok(())
    }

    fn handle_result_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char('h') | KeyCode::Left => self.chart_level = self.chart_level.prev(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
                self.chart_level = self.chart_level.next()
            }
            KeyCode::Char('1') => self.chart_level = Level::Easy,
            KeyCode::Char('2') => self.chart_level = Level::Medium,
            KeyCode::Char('3') => self.chart_level = Level::Hard,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                self.outcome = None;
                self.screen = Screen::Welcome;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_mastered_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.mastered.next(),
            KeyCode::Char('k') | KeyCode::Up => self.mastered.previous(),
            KeyCode::Char('s') => {
                if let Some(word) = self.mastered.selected_item().map(|w| w.entry.word.clone()) {
                    self.execute(&[Effect::Speak(word)])?;
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.screen = Screen::Welcome,
            _ => {}
        }
        Ok(())
    }

    fn handle_incorrect_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.pending.next(),
            KeyCode::Char('k') | KeyCode::Up => self.pending.previous(),
            KeyCode::Char('s') => {
                if let Some(word) = self.pending.selected_item().map(|w| w.entry.word.clone()) {
                    self.execute(&[Effect::Speak(word)])?;
                }
            }
            KeyCode::Char('t') if !self.pending.items.is_empty() => self.start_remediation()?,
            KeyCode::Esc | KeyCode::Char('q') => self.screen = Screen::Welcome,
            _ => {}
        }
        Ok(())
    }
}

pub fn run(app: App) -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = app;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}
