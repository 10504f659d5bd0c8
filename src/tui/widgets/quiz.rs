use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

use crate::quiz::QuizMode;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(quiz) = &app.quiz else {
        return;
    };
    let Some(question) = quiz.current() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Length(5), // Prompt
            Constraint::Min(0),    // Options
        ])
        .split(area);

    let title = match quiz.mode() {
        QuizMode::Normal(level) => format!(" Test: {} ", level.label()),
        QuizMode::Remediation => " Incorrect notes test ".to_string(),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(quiz.progress_ratio().clamp(0.0, 1.0))
        .label(quiz.progress_label());
    f.render_widget(gauge, chunks[0]);

    let prompt = Paragraph::new(vec![
        Line::from(Span::styled(
            question.target.word.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Pick the meaning of this word",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(prompt, chunks[1]);

    let answered = quiz.answered();
    let answer_index = question.answer_index();
    let items: Vec<ListItem> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = match answered {
                Some(_) if answer_index == Some(i) => Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                Some(a) if a.selected == i => Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::CROSSED_OUT),
                Some(_) => Style::default().fg(Color::DarkGray),
                None => Style::default().fg(Color::White),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {}  ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(option.meaning.clone(), style),
            ]))
        })
        .collect();

    let (verdict, color) = match answered {
        Some(a) if a.correct => (" Correct! ", Color::Green),
        Some(_) => (" Wrong ", Color::Red),
        None => (" Options ", Color::Cyan),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(verdict)
        .title_style(Style::default().fg(color));
    f.render_widget(List::new(items).block(block), chunks[2]);
}
