//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! The layout is a two-row split: the news list on top and a one-line status
//! bar at the bottom.  Each row shows how long ago the story was published,
//! its chapéu (section label) and its title.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::paging::RequestState;
use crate::source::NewsItem;
use crate::time::time_ago;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    draw_news_list(app, frame, main_area, Utc::now());
    draw_status_bar(app, frame, status_area);
}

fn news_line(item: &NewsItem, now: DateTime<Utc>) -> Line<'_> {
    let age = item
        .publication
        .map(|ms| time_ago(ms, now))
        .unwrap_or_else(|| "no date".into());

    let mut spans = vec![
        Span::styled(format!("{age:<16}"), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
    ];
    if let Some(chapeu) = &item.chapeu {
        spans.push(Span::styled(
            format!("{} ", chapeu.to_uppercase()),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::styled(
        item.title.as_deref().unwrap_or("(untitled)"),
        Style::default().fg(Color::White),
    ));
    Line::from(spans)
}

fn draw_news_list(app: &mut App, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
    let list_items: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| ListItem::new(news_line(item, now)))
        .collect();

    let title = if app.is_loading() {
        " News (loading…) "
    } else {
        " News "
    };

    let list = List::new(list_items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status_colour = if app.has_failure() {
        Color::Red
    } else {
        Color::Yellow
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(&app.status, Style::default().fg(status_colour)),
        Span::raw("  "),
        Span::styled(
            format!("{} items", app.items.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  r: refresh  R: retry  ⏎: link"),
    ]));
    frame.render_widget(status, area);
}
