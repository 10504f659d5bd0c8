//! Fire-and-forget speech and sound cues, plus the executor that carries out quiz effects.

use std::io::{self, Write};
use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use crate::db::KeyValueStore;
use crate::error::Result;
use crate::quiz::Effect;
use crate::store::Stores;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Correct,
    Wrong,
}

pub trait Feedback {
    /// Speaks `word`, cutting off anything still being spoken.
    fn speak(&mut self, word: &str);
    fn cue(&mut self, cue: Cue);
}

/// Ignores everything.
#[derive(Debug, Default)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn speak(&mut self, _word: &str) {}
    fn cue(&mut self, _cue: Cue) {}
}

/// Speaks through an external TTS program and rings the terminal bell on wrong answers.
pub struct SystemFeedback {
    speech_command: Option<Vec<String>>,
    sound: bool,
    utterance: Option<Child>,
}

impl SystemFeedback {
    pub fn new(speech_command: Option<&str>, sound: bool) -> Self {
        let speech_command = speech_command
            .map(|cmd| cmd.split_whitespace().map(String::from).collect::<Vec<_>>())
            .filter(|parts| !parts.is_empty());
        Self {
            speech_command,
            sound,
            utterance: None,
        }
    }

    fn cancel_utterance(&mut self) {
        if let Some(mut child) = self.utterance.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl Feedback for SystemFeedback {
    fn speak(&mut self, word: &str) {
        let Some(parts) = self.speech_command.clone() else {
            return;
        };
        let (program, args) = (&parts[0], &parts[1..]);

        self.cancel_utterance();
        let spawned = Command::new(program)
            .args(args)
            .arg(word)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                debug!(word, program = %program, "speaking");
                self.utterance = Some(child);
            }
            Err(e) => warn!(program = %program, error = %e, "speech command failed"),
        }
    }

    fn cue(&mut self, cue: Cue) {
        if !self.sound || cue != Cue::Wrong {
            return;
        }
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07").and_then(|_| stdout.flush());
    }
}

impl Drop for SystemFeedback {
    fn drop(&mut self) {
        self.cancel_utterance();
    }
}

/// Carries out `effects` in order: store effects against `stores`, the rest via `feedback`.
pub fn run_effects<S, F>(effects: &[Effect], stores: &Stores<'_, S>, feedback: &mut F) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    F: Feedback + ?Sized,
{
    for effect in effects {
        match effect {
            Effect::PlayCue(cue) => feedback.cue(*cue),
            Effect::Speak(word) => feedback.speak(word),
            other => stores.apply(other)?,
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Played {
        Spoke(String),
        Cue(Cue),
    }

    #[derive(Debug, Default)]
    pub struct RecordingFeedback {
        pub played: Vec<Played>,
    }

    impl Feedback for RecordingFeedback {
        fn speak(&mut self, word: &str) {
            self.played.push(Played::Spoke(word.to_string()));
        }

        fn cue(&mut self, cue: Cue) {
            self.played.push(Played::Cue(cue));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Played, RecordingFeedback};
    use super::*;
    use crate::db::testing::MemoryStore;
    use crate::models::Level;

    #[test]
    fn run_effects_splits_store_and_feedback() {
        let kv = MemoryStore::new();
        let stores = Stores::new(&kv);
        let mut feedback = RecordingFeedback::default();

        let effects = vec![
            Effect::PlayCue(Cue::Wrong),
            Effect::AddIncorrect("apple".to_string()),
            Effect::Speak("apple".to_string()),
            Effect::AppendHistory {
                score: 40,
                level: Level::Hard,
            },
        ];
        run_effects(&effects, &stores, &mut feedback).unwrap();

        assert_eq!(
            feedback.played,
            vec![
                Played::Cue(Cue::Wrong),
                Played::Spoke("apple".to_string())
            ]
        );
        assert!(stores.incorrect.contains("apple"));
        assert_eq!(stores.history.load()[0].score, 40);
    }

    #[test]
    fn silent_feedback_accepts_everything() {
        let mut feedback = SilentFeedback;
        feedback.speak("apple");
        feedback.cue(Cue::Correct);
    }

    #[test]
    fn system_feedback_without_command_is_silent() {
        let mut feedback = SystemFeedback::new(None, false);
        feedback.speak("apple");
        assert!(feedback.utterance.is_none());
    }

    #[test]
    fn blank_speech_command_is_ignored() {
        let feedback = SystemFeedback::new(Some("   "), true);
        assert!(feedback.speech_command.is_none());
    }

    #[test]
    fn speech_command_is_split_into_args() {
        let feedback = SystemFeedback::new(Some("espeak -v en-us"), true);
        assert_eq!(
            feedback.speech_command,
            Some(vec![
                "espeak".to_string(),
                "-v".to_string(),
                "en-us".to_string()
            ])
        );
    }

    #[test]
    fn missing_speech_program_does_not_panic() {
        let mut feedback = SystemFeedback::new(Some("definitely-not-a-tts-program"), false);
        feedback.speak("apple");
        assert!(feedback.utterance.is_none());
    }
}
