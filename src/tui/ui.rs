use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use super::widgets::{learning, quiz, result, welcome, word_list};
use super::{App, Screen};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);

    if let Some(confirm) = &app.confirm {
        draw_confirm(f, &confirm.prompt);
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tab_titles = vec!["Home", "Learn", "Test", "Records", "Mastered", "Notes"];
    let selected = match app.screen {
        Screen::Welcome => 0,
        Screen::Learning => 1,
        Screen::Quiz => 2,
        Screen::Result => 3,
        Screen::Mastered => 4,
        Screen::IncorrectNote => 5,
    };

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" Vocab "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.screen {
        Screen::Welcome => welcome::draw(f, app, area),
        Screen::Learning => learning::draw(f, app, area),
        Screen::Quiz => quiz::draw(f, app, area),
        Screen::Result => result::draw(f, app, area),
        Screen::Mastered => word_list::draw_mastered(f, app, area),
        Screen::IncorrectNote => word_list::draw_incorrect(f, app, area),
    }
}

fn key(k: &str) -> Span<'_> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    if let Some(message) = &app.message {
        let help = Paragraph::new(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Yellow),
        ))
        .style(Style::default().bg(Color::DarkGray));
        f.render_widget(help, area);
        return;
    }

    let help_text = if app.confirm.is_some() {
        vec![key("y"), Span::raw(" Yes  "), key("n/<Esc>"), Span::raw(" No")]
    } else {
        match app.screen {
            Screen::Welcome => vec![
                key("1-3"),
                Span::raw(" Level  "),
                key("r"),
                Span::raw(" Records  "),
                key("m"),
                Span::raw(" Mastered  "),
                key("n"),
                Span::raw(" Notes  "),
                key("q"),
                Span::raw(" Quit"),
            ],
            Screen::Learning => vec![
                key("h/l"),
                Span::raw(" Prev/Next  "),
                key("<Space>"),
                Span::raw(" Meaning  "),
                key("s"),
                Span::raw(" Speak  "),
                key("1-3"),
                Span::raw(" Mastery  "),
                key("t"),
                Span::raw(" Test  "),
                key("<Esc>"),
                Span::raw(" Back"),
            ],
            Screen::Quiz => vec![
                key("1-4"),
                Span::raw(" Answer  "),
                key("s"),
                Span::raw(" Speak  "),
                key("q"),
                Span::raw(" Quit test"),
            ],
            Screen::Result => vec![
                key("h/l"),
                Span::raw(" Level  "),
                key("<CR>/<Esc>"),
                Span::raw(" Home"),
            ],
            Screen::Mastered => vec![
                key("j/k"),
                Span::raw(" Nav  "),
                key("s"),
                Span::raw(" Speak  "),
                key("<Esc>"),
                Span::raw(" Back"),
            ],
            Screen::IncorrectNote => vec![
                key("j/k"),
                Span::raw(" Nav  "),
                key("s"),
                Span::raw(" Speak  "),
                key("t"),
                Span::raw(" Test notes  "),
                key("<Esc>"),
                Span::raw(" Back"),
            ],
        }
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}

fn draw_confirm(f: &mut Frame, prompt: &str) {
    let area = centered(f.area(), 50, 7);
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(prompt, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(vec![key("y"), Span::raw(" yes   "), key("n"), Span::raw(" no")]),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .title_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
