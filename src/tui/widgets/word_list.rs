use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{level_color, mastery_bar};
use crate::models::WordEntry;
use crate::tui::{App, StatefulList};

pub fn draw_mastered(f: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .mastered
        .items
        .iter()
        .map(|w| row(&w.entry, mastery_bar(w.mastery), Color::Green))
        .collect();
    draw_list(
        f,
        area,
        rows,
        &app.mastered,
        " Mastered words ",
        "No mastered words yet.",
    );
}

pub fn draw_incorrect(f: &mut Frame, app: &App, area: Rect) {
    let graduation = app.config().remediation.graduation;
    let rows = app
        .pending
        .items
        .iter()
        .map(|w| {
            row(
                &w.entry,
                format!("{}/{} correct", w.successes, graduation),
                Color::Yellow,
            )
        })
        .collect();
    draw_list(
        f,
        area,
        rows,
        &app.pending,
        " Incorrect notes ",
        "No incorrect notes. Nicely done!",
    );
}

fn row(entry: &WordEntry, badge: String, badge_color: Color) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<20}", entry.word),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:<8}", entry.level.as_str()),
            Style::default().fg(level_color(entry.level)),
        ),
        Span::styled(format!("{:<14}", badge), Style::default().fg(badge_color)),
        Span::styled(entry.meaning.clone(), Style::default().fg(Color::Gray)),
    ]))
}

fn draw_list<T>(
    f: &mut Frame,
    area: Rect,
    rows: Vec<ListItem<'static>>,
    list: &StatefulList<T>,
    title: &str,
    empty: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_style(Style::default().fg(Color::Cyan));

    if rows.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            empty.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let widget = List::new(rows)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(list.selected);
    f.render_stateful_widget(widget, area, &mut state);
}
