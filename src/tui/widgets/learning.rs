use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{level_color, mastery_bar};
use crate::models::mastery_label;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(session) = &app.learning else {
        return;
    };
    let Some(entry) = session.current() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Level + progress
            Constraint::Min(7),    // Card
            Constraint::Length(3), // Mastery
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} ", session.level().label()),
            Style::default()
                .fg(level_color(session.level()))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(session.progress_label(), Style::default().fg(Color::Gray)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Learning "));
    f.render_widget(header, chunks[0]);

    let meaning = if session.meaning_revealed() {
        Span::styled(entry.meaning.clone(), Style::default().fg(Color::White))
    } else {
        Span::styled(
            "press <Space> to show the meaning",
            Style::default().fg(Color::DarkGray),
        )
    };

    let nav = Line::from(vec![
        Span::styled(
            if session.has_prev() { "< prev" } else { "      " },
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("        "),
        Span::styled(
            if session.has_next() { "next >" } else { "      " },
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let card = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            entry.word.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(meaning),
        Line::from(""),
        nav,
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(card, chunks[1]);

    let level = app.mastery_of(&entry.word);
    let mastery = Paragraph::new(Line::from(vec![
        Span::styled("Mastery: ", Style::default().fg(Color::Gray)),
        Span::styled(mastery_bar(level), Style::default().fg(Color::Green)),
        Span::styled(
            format!(" {} ({})", level, mastery_label(level)),
            Style::default().fg(Color::Yellow),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(mastery, chunks[2]);
}
