//! Pure render functions.
//!
//! Everything here reads `&SessionState` and draws to a ratatui `Frame`;
//! nothing mutates state.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use slk_core::SessionState;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SIDEBAR_PERCENT: u16 = 30;
const CHAT_PERCENT: u16 = 80;

/// Screen regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub channels: Rect,
    pub chat: Rect,
    pub input: Rect,
}

pub fn layout(area: Rect) -> ScreenLayout {
    let [channels, main] = Layout::horizontal([
        Constraint::Percentage(SIDEBAR_PERCENT),
        Constraint::Percentage(100 - SIDEBAR_PERCENT),
    ])
    .areas(area);
    let [chat, input] = Layout::vertical([
        Constraint::Percentage(CHAT_PERCENT),
        Constraint::Percentage(100 - CHAT_PERCENT),
    ])
    .areas(main);
    ScreenLayout {
        channels,
        chat,
        input,
    }
}

pub fn render(state: &SessionState, frame: &mut Frame) {
    let areas = layout(frame.area());
    render_channels(state, frame, areas.channels);
    render_chat(state, frame, areas.chat);
    render_input(state, frame, areas.input);
}

fn render_channels(state: &SessionState, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Channels ");
    let inner = block.inner(area);
    let width = usize::from(inner.width);
    let active = state.active_channel();

    let lines: Vec<Line> = state
        .channels
        .member_channels()
        .into_iter()
        .map(|channel| {
            let mut label = channel.display_name();
            let unread = state.unread_count(&channel.key);
            if unread > 0 {
                label.push_str(&format!(" ({unread})"));
            }
            let style = if active == Some(channel.key.as_str()) {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if unread > 0 {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(truncate_to_width(&label, width), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chat(state: &SessionState, frame: &mut Frame, area: Rect) {
    let title = match state.active_channel() {
        Some(key) => {
            let name = state.channels.display_name(key);
            if state.channel.is_switching() {
                format!(" {name} (loading) ")
            } else {
                format!(" {name} ")
            }
        }
        None => " slk ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    let height = usize::from(inner.height);
    let width = usize::from(inner.width);

    let messages = state.history.render(height);
    // Bottom-aligned: newest message on the last row.
    let padding = height.saturating_sub(messages.len());
    let lines: Vec<Line> = std::iter::repeat_n(Line::default(), padding)
        .chain(
            messages
                .iter()
                .map(|message| Line::raw(truncate_to_width(&message.line(), width))),
        )
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_input(state: &SessionState, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Message ");
    let inner = block.inner(area);
    // Leave one cell for the cursor.
    let visible = tail_to_width(state.input.as_str(), usize::from(inner.width).saturating_sub(1));
    let cursor_x = inner.x + visible.width() as u16;

    frame.render_widget(Paragraph::new(visible).block(block), area);
    if inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

/// Longest prefix of `text` that fits in `max_width` columns.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut width = 0;
    let mut truncated = String::new();
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        width += ch_width;
        truncated.push(ch);
    }
    truncated
}

/// Longest suffix of `text` that fits in `max_width` columns.
pub fn tail_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut width = 0;
    let mut tail: Vec<char> = Vec::new();
    for ch in text.chars().rev() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        width += ch_width;
        tail.push(ch);
    }
    tail.into_iter().rev().collect()
}
