use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::level_color;
use crate::quiz::{result_message, QuizMode};
use crate::store::chart_window;
use crate::tui::{App, QuizOutcome};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    match app.outcome {
        Some(outcome) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(6), Constraint::Min(0)])
                .split(area);
            draw_score(f, outcome, chunks[0]);
            draw_chart(f, app, chunks[1]);
        }
        None => draw_chart(f, app, area),
    }
}

fn draw_score(f: &mut Frame, outcome: QuizOutcome, area: Rect) {
    let color = match outcome.score {
        90.. => Color::Green,
        50..=89 => Color::Yellow,
        _ => Color::Red,
    };
    let title = match outcome.mode {
        QuizMode::Normal(level) => format!(" {} result ", level.label()),
        QuizMode::Remediation => " Incorrect notes result ".to_string(),
    };

    let text = vec![
        Line::from(Span::styled(
            format!("{} points", outcome.score),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} questions, {} correct", outcome.total, outcome.correct),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            result_message(outcome.score),
            Style::default().fg(Color::White),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(paragraph, area);
}

fn draw_chart(f: &mut Frame, app: &App, area: Rect) {
    let level = app.chart_level;
    let points = chart_window(&app.history, level, app.config().history.chart_window);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Score history: {} ", level.label()))
        .title_style(Style::default().fg(level_color(level)));

    if points.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            format!("No {} test records yet.", level.label()),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let data: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.attempt as f64, p.record.score as f64))
        .collect();

    let first = points.first().map(|p| p.attempt).unwrap_or(1);
    let last = points.last().map(|p| p.attempt).unwrap_or(first);
    // A single point still needs a non-empty x range.
    let x_max = if last > first { last as f64 } else { first as f64 + 1.0 };

    let dataset = Dataset::default()
        .name("score")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(level_color(level)))
        .data(&data);

    let x_labels = vec![
        Span::raw(format!("#{}", first)),
        Span::raw(format!("#{}", last)),
    ];
    let y_labels = vec![Span::raw("0"), Span::raw("50"), Span::raw("100")];

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("attempt")
                .style(Style::default().fg(Color::Gray))
                .bounds([first as f64, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("score")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, 100.0])
                .labels(y_labels),
        );
    f.render_widget(chart, area);
}
