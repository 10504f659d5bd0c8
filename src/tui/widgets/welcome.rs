use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::level_color;
use crate::models::Level;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title
            Constraint::Length(7), // Levels
            Constraint::Min(0),    // Other menus
        ])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Vocabulary Trainer",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Pick a level to start learning",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, chunks[0]);

    let levels: Vec<Line> = Level::ALL
        .iter()
        .enumerate()
        .map(|(i, &level)| {
            let total = app.catalog_count(level);
            let mastered = app.mastered_count(level);
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{:<14}", level.label()),
                    Style::default()
                        .fg(level_color(level))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{}/{} mastered", mastered, total),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Levels ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(levels).block(block), chunks[1]);

    let others = vec![
        menu_line("r", "Learning records", None),
        menu_line("m", "Mastered words", Some(app.mastered.items.len())),
        menu_line("n", "Incorrect notes", Some(app.pending.items.len())),
        menu_line("X", "Reset all records", None),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" More ")
        .title_style(Style::default().fg(Color::Magenta));
    f.render_widget(Paragraph::new(others).block(block), chunks[2]);
}

fn menu_line(key: &str, label: &str, count: Option<usize>) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(Color::Cyan)),
        Span::styled(label.to_string(), Style::default().fg(Color::White)),
    ];
    if let Some(count) = count {
        spans.push(Span::styled(
            format!(" ({})", count),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}
