mod catalog;
mod config;
mod db;
mod error;
mod feedback;
mod logging;
mod models;
mod quiz;
mod session;
mod store;
mod tui;

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use config::Config;
use db::Database;
use error::VocabError;
use feedback::{Feedback, SilentFeedback, SystemFeedback};
use models::{mastery_label, JsonOutput, Level};
use session::{level_stats, mastered_words, pending_words, start_learning_with, words_with_mastery};
use store::{chart_window, reset_all, Stores};

#[derive(Parser)]
#[command(name = "vocab")]
#[command(about = "A vocabulary trainer with flashcards, quizzes and an incorrect-answer notebook")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Word catalog to use instead of the built-in list
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// List catalog words with their mastery
    Words {
        /// Filter by level: easy/medium/hard
        #[arg(long, short)]
        level: Option<String>,
    },

    /// Show the learning set for a level
    Learn {
        /// Level: easy/medium/hard
        level: String,

        /// Review every word when all of them are already mastered
        #[arg(long, short)]
        all: bool,
    },

    /// Set a word's mastery level (0 clears it)
    Mastery {
        /// The word
        word: String,

        /// Mastery level 0-3
        level: u32,
    },

    /// List mastered words
    Mastered,

    /// List words in the incorrect-answer notebook
    Incorrect,

    /// Show quiz history
    History {
        /// Show the chart window for one level
        #[arg(long, short)]
        level: Option<String>,
    },

    /// Show learning statistics
    Stats,

    /// Delete all history, mastery and incorrect notes
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Launch interactive terminal UI
    Tui,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(cli.command, Commands::Tui) {
        logging::init_file(&Config::log_path());
    } else {
        logging::init_stderr();
    }

    let config = Config::load();
    let db_path = Config::db_path();
    let db = Database::open(&db_path)?;
    db.init()?;

    match cli.command {
        Commands::Init => {
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", db_path.display());
                let keys = db.keys()?;
                if !keys.is_empty() {
                    println!("Existing records: {}", keys.join(", "));
                }
            }
        }

        Commands::Words { level } => {
            let level = level.as_deref().map(parse_level).transpose()?;
            let catalog = config.load_catalog(cli.catalog.as_deref())?;
            let mastery = Stores::new(&db).mastery.load();
            let words = words_with_mastery(&catalog, &mastery, level);

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&words))?);
            } else if words.is_empty() {
                println!("No words found.");
            } else {
                println!("{:<20} {:<8} {:<10} MEANING", "WORD", "LEVEL", "MASTERY");
                println!("{}", "-".repeat(70));
                for w in words {
                    println!(
                        "{:<20} {:<8} {:<10} {}",
                        truncate(&w.entry.word, 18),
                        w.entry.level.as_str(),
                        format!("{} {}", w.mastery, mastery_label(w.mastery)),
                        truncate(&w.entry.meaning, 40)
                    );
                }
            }
        }

        Commands::Learn { level, all } => {
            let level = parse_level(&level)?;
            let catalog = config.load_catalog(cli.catalog.as_deref())?;
            let mastery = Stores::new(&db).mastery.load();

            let session = start_learning_with(level, &catalog, &mastery, |_| all)?
                .ok_or(VocabError::AllMastered(level))?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(session.words()))?);
            } else {
                println!("=== {} learning set ({} words) ===", level.label(), session.words().len());
                println!();
                for (i, entry) in session.words().iter().enumerate() {
                    println!("{:>3}. {:<20} {}", i + 1, truncate(&entry.word, 18), entry.meaning);
                }
                println!();
                println!("Take the test in the terminal UI with: vocab tui");
            }
        }

        Commands::Mastery { word, level } => {
            let catalog = config.load_catalog(cli.catalog.as_deref())?;
            if catalog.find(&word).is_none() {
                return Err(VocabError::Catalog(format!("'{}' is not in the word list", word)).into());
            }
            let stores = Stores::new(&db);
            stores.mastery.set_level(&word, level)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "word": word,
                        "mastery": level
                    })))?
                );
            } else {
                println!("Mastery for '{}' set to {} ({}).", word, level, mastery_label(level));
            }
        }

        Commands::Mastered => {
            let catalog = config.load_catalog(cli.catalog.as_deref())?;
            let mastery = Stores::new(&db).mastery.load();
            let words = mastered_words(&catalog, &mastery);

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&words))?);
            } else if words.is_empty() {
                println!("No mastered words yet.");
            } else {
                println!("{:<20} {:<8} MEANING", "WORD", "LEVEL");
                println!("{}", "-".repeat(60));
                for w in words {
                    println!(
                        "{:<20} {:<8} {}",
                        truncate(&w.entry.word, 18),
                        w.entry.level.as_str(),
                        truncate(&w.entry.meaning, 40)
                    );
                }
            }
        }

        Commands::Incorrect => {
            let catalog = config.load_catalog(cli.catalog.as_deref())?;
            let incorrect = Stores::new(&db).incorrect.load();
            let words = pending_words(&catalog, &incorrect);
            let graduation = config.remediation.graduation;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&words))?);
            } else if words.is_empty() {
                println!("No incorrect notes. Nicely done!");
            } else {
                println!("{:<20} {:<8} {:<10} MEANING", "WORD", "LEVEL", "PROGRESS");
                println!("{}", "-".repeat(70));
                for w in words {
                    println!(
                        "{:<20} {:<8} {:<10} {}",
                        truncate(&w.entry.word, 18),
                        w.entry.level.as_str(),
                        format!("({}/{})", w.successes, graduation),
                        truncate(&w.entry.meaning, 40)
                    );
                }
            }
        }

        Commands::History { level } => {
            let history = Stores::new(&db).history.load();

            match level.as_deref().map(parse_level).transpose()? {
                Some(level) => {
                    let points = chart_window(&history, level, config.history.chart_window);
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&points))?);
                    } else if points.is_empty() {
                        println!("No {} test records yet.", level.label());
                    } else {
                        println!("{:<8} {:<18} SCORE", "ATTEMPT", "DATE");
                        println!("{}", "-".repeat(40));
                        for p in points {
                            println!(
                                "{:<8} {:<18} {:>3} {}",
                                format!("#{}", p.attempt),
                                p.record.date.format("%Y-%m-%d %H:%M"),
                                p.record.score,
                                score_bar(p.record.score)
                            );
                        }
                    }
                }
                None => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&history))?);
                    } else if history.is_empty() {
                        println!("No test records yet.");
                    } else {
                        println!("{:<18} {:<8} SCORE", "DATE", "LEVEL");
                        println!("{}", "-".repeat(40));
                        for record in history {
                            println!(
                                "{:<18} {:<8} {:>3}",
                                record.date.format("%Y-%m-%d %H:%M"),
                                record.level.as_str(),
                                record.score
                            );
                        }
                    }
                }
            }
        }

        Commands::Stats => {
            let catalog = config.load_catalog(cli.catalog.as_deref())?;
            let stores = Stores::new(&db);
            let mastery = stores.mastery.load();
            let incorrect = stores.incorrect.load();
            let history = stores.history.load();

            let stats: Vec<(Level, models::LevelStats)> = Level::ALL
                .iter()
                .map(|&level| {
                    (
                        level,
                        level_stats(&catalog, &mastery, &incorrect, &history, level),
                    )
                })
                .collect();

            if cli.json {
                let by_level: serde_json::Map<String, serde_json::Value> = stats
                    .iter()
                    .map(|(level, s)| Ok((level.as_str().to_string(), serde_json::to_value(s)?)))
                    .collect::<Result<_, serde_json::Error>>()?;
                println!("{}", serde_json::to_string(&JsonOutput::ok(by_level))?);
            } else {
                println!("=== Learning Statistics ===");
                for (level, s) in stats {
                    println!();
                    println!("{}:", level.label());
                    println!("  Words: {}", s.words);
                    println!("  Mastered: {}", s.mastered);
                    println!("  Incorrect notes: {}", s.pending_remediation);
                    println!("  Tests taken: {}", s.quizzes);
                    println!("  Average score: {:.1}", s.avg_score);
                }
            }
        }

        Commands::Reset { yes } => {
            if !yes && !confirm("Delete your history, mastered words and incorrect notes?")? {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::<()>::err("Cancelled"))?);
                } else {
                    println!("Cancelled.");
                }
                return Ok(());
            }

            reset_all(&db)?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("All records have been deleted.");
            }
        }

        Commands::Tui => {
            let catalog = config.load_catalog(cli.catalog.as_deref())?;
            let speech = config.speech.effective_command();
            let feedback: Box<dyn Feedback> = if speech.is_none() && !config.sound.enabled {
                Box::new(SilentFeedback)
            } else {
                Box::new(SystemFeedback::new(speech, config.sound.enabled))
            };
            let app = tui::App::new(db, config, catalog, feedback);
            tui::run(app)?;
        }
    }

    Ok(())
}

fn parse_level(s: &str) -> Result<Level, VocabError> {
    Level::from_str(s).ok_or_else(|| VocabError::InvalidLevel(s.to_string()))
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn score_bar(score: u32) -> String {
    "█".repeat((score / 10) as usize)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
