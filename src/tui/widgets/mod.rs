pub mod learning;
pub mod quiz;
pub mod result;
pub mod welcome;
pub mod word_list;

use ratatui::style::Color;

use crate::models::{Level, MASTERED_LEVEL};

pub fn level_color(level: Level) -> Color {
    match level {
        Level::Easy => Color::Cyan,
        Level::Medium => Color::Magenta,
        Level::Hard => Color::LightRed,
    }
}

pub fn mastery_bar(level: u32) -> String {
    let filled = level.min(MASTERED_LEVEL) as usize;
    let empty = MASTERED_LEVEL as usize - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}
