//! Terminal UI for the chat panel.
//!
//! Renders from a `RenderState` snapshot and never mutates application
//! state. Layout, top to bottom: title bar, message list, input box, hint
//! line. The emoji grid and the file picker are drawn as overlays.

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::chat::ImagePreview;
use crate::graphics::{halfblock_lines, Graphics};
use crate::picker::FilePicker;
use crate::render::{MessageBody, MessageView, RenderState};
use crate::tea::update::EMOJI_COLUMNS;
use crate::tea::{Mode, Notification, NotificationLevel};
use crate::util::{format_bytes, truncate};

const TITLE: &str = "Ephemeral Chat";
const PLACEHOLDER: &str = "Type a message...";

const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_LINK: Color = Color::Cyan;
const COLOR_IMAGE: Color = Color::Magenta;
const COLOR_WARN: Color = Color::Yellow;

const MAX_INPUT_LINES: u16 = 4;
const PICKER_MAX_HEIGHT: u16 = 16;
const PICKER_MAX_WIDTH: u16 = 60;

pub fn draw(frame: &mut Frame, state: &RenderState, graphics: &mut Graphics) {
    let area = frame.area();
    let input_lines = (state.draft.split('\n').count() as u16).clamp(1, MAX_INPUT_LINES);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(input_lines + 2),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, state, chunks[0]);
    render_messages(frame, state, graphics, chunks[1]);
    render_input(frame, state, chunks[2]);
    render_statusbar(frame, state, chunks[3]);

    if state.emoji_picker_visible && state.mode == Mode::Chat {
        render_emoji_picker(frame, state, chunks[2]);
    }
    if let (Mode::FilePicker, Some(picker)) = (state.mode, state.picker.as_ref()) {
        render_file_picker(frame, picker, area);
    }
}

fn render_title(frame: &mut Frame, state: &RenderState, area: Rect) {
    let count = match state.messages.len() {
        0 => String::new(),
        1 => "1 message".to_string(),
        n => format!("{} messages", n),
    };
    let title_width = TITLE.chars().count();
    let spacer = (area.width as usize)
        .saturating_sub(title_width)
        .saturating_sub(count.chars().count());

    let line = Line::from(vec![
        Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(spacer)),
        Span::styled(count, Style::default().fg(COLOR_TEXT_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the message list, pinned to the newest entry unless scrolled.
fn render_messages(frame: &mut Frame, state: &RenderState, graphics: &mut Graphics, area: Rect) {
    if graphics.has_protocol() {
        let live: HashSet<u64> = state
            .messages
            .iter()
            .filter_map(|m| match &m.body {
                MessageBody::Image { preview: Some(p), .. } => Some(p.id),
                _ => None,
            })
            .collect();
        graphics.retain(&live);
    }

    if state.messages.is_empty() {
        let msg = Line::from(Span::styled(
            "No messages yet. Nothing here survives quitting.",
            Style::default().fg(COLOR_TEXT_MUTED),
        ));
        frame.render_widget(Paragraph::new(msg), area);
        return;
    }

    let layout = message_lines(
        &state.messages,
        area.width as usize,
        state.image_tile_width,
        state.selected_link,
    );
    let (start, end) = visible_window(layout.lines.len(), area.height as usize, state.scroll);
    let visible: Vec<Line> = layout.lines.into_iter().skip(start).take(end - start).collect();
    frame.render_widget(Paragraph::new(visible), area);

    // Protocol images cannot be clipped, so only fully visible ones are painted.
    for placement in layout.images {
        let first = placement.line;
        let last = first + placement.height as usize;
        if first < start || last > end {
            continue;
        }
        let rect = Rect {
            x: area.x,
            y: area.y + (first - start) as u16,
            width: placement.width.min(area.width),
            height: placement.height,
        };
        graphics.render(frame, &placement.preview, rect);
    }
}

/// Slice of `total` lines that fits `height`, `scroll` lines above the bottom.
pub(crate) fn visible_window(total: usize, height: usize, scroll: usize) -> (usize, usize) {
    let max_scroll = total.saturating_sub(height);
    let scroll = scroll.min(max_scroll);
    let end = total - scroll;
    (end.saturating_sub(height), end)
}

/// Where an inline image sits in the message lines.
#[derive(Debug)]
pub(crate) struct ImagePlacement {
    pub line: usize,
    pub width: u16,
    pub height: u16,
    pub preview: ImagePreview,
}

#[derive(Debug, Default)]
pub(crate) struct MessageLayout {
    pub lines: Vec<Line<'static>>,
    pub images: Vec<ImagePlacement>,
}

/// Every message as display lines: content, then a dim timestamp, then a gap.
pub(crate) fn message_lines(
    messages: &[MessageView],
    width: usize,
    tile_width: u16,
    selected_link: Option<usize>,
) -> MessageLayout {
    let mut layout = MessageLayout::default();
    for (idx, message) in messages.iter().enumerate() {
        if idx > 0 {
            layout.lines.push(Line::default());
        }
        match &message.body {
            MessageBody::Text(body) => {
                layout.lines.extend(wrap(body, width).into_iter().map(Line::from));
            }
            MessageBody::Link(text) => {
                let mut style = Style::default()
                    .fg(COLOR_LINK)
                    .add_modifier(Modifier::UNDERLINED);
                if selected_link == Some(idx) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                layout.lines.extend(
                    wrap(text, width)
                        .into_iter()
                        .map(|l| Line::from(Span::styled(l, style))),
                );
            }
            MessageBody::Image {
                media_type,
                byte_len,
                preview: Some(preview),
            } => {
                let max_width = (tile_width as usize).min(width);
                let rows = halfblock_lines(&preview.thumbnail, max_width);
                let cols = rows.first().map_or(0, |r| r.spans.len());
                layout.images.push(ImagePlacement {
                    line: layout.lines.len(),
                    width: cols as u16,
                    height: rows.len() as u16,
                    preview: preview.clone(),
                });
                layout.lines.extend(rows);
                layout.lines.push(Line::from(Span::styled(
                    truncate(&format!("{} · {}", media_type, format_bytes(*byte_len)), width),
                    Style::default().fg(COLOR_IMAGE),
                )));
            }
            MessageBody::Image {
                media_type,
                byte_len,
                preview: None,
            } => {
                let inner = (tile_width as usize).min(width).saturating_sub(2);
                layout.lines.extend(image_tile(media_type, *byte_len, inner));
            }
        }
        layout.lines.push(Line::from(Span::styled(
            message.timestamp.clone(),
            Style::default().fg(COLOR_TEXT_MUTED),
        )));
    }
    layout
}

/// A bordered box standing in for an image that did not decode.
fn image_tile(media_type: &str, byte_len: usize, inner: usize) -> Vec<Line<'static>> {
    let style = Style::default().fg(COLOR_IMAGE);
    let row = |text: String| {
        let text = truncate(&text, inner);
        let pad = inner.saturating_sub(text.chars().count());
        Line::from(Span::styled(format!("│{}{}│", text, " ".repeat(pad)), style))
    };
    vec![
        Line::from(Span::styled(format!("┌{}┐", "─".repeat(inner)), style)),
        row(format!(" image  {}", media_type)),
        row(format!(" {}", format_bytes(byte_len))),
        Line::from(Span::styled(format!("└{}┘", "─".repeat(inner)), style)),
    ]
}

/// Hard-wrap on explicit newlines and at `width` display columns.
/// Zero-width characters stay attached to the preceding glyph.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;
        for ch in raw_line.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if ch_width > 0 && current_width + ch_width > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
        out.push(current);
    }
    out
}

fn render_input(frame: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_TEXT_MUTED));

    let lines: Vec<Line> = if state.draft.is_empty() {
        vec![Line::from(vec![
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            Span::styled(PLACEHOLDER, Style::default().fg(COLOR_TEXT_MUTED)),
        ])]
    } else {
        let all: Vec<&str> = state.draft.split('\n').collect();
        // Keep the tail visible while composing long multi-line drafts.
        let skip = all.len().saturating_sub(MAX_INPUT_LINES as usize);
        let last = all.len() - 1;
        all.into_iter()
            .enumerate()
            .skip(skip)
            .map(|(i, l)| {
                let mut spans = vec![Span::raw(l.to_string())];
                if i == last {
                    spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
                }
                Line::from(spans)
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Keymap hints, pending uploads and the current notification.
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let line = match &state.notification {
        Some(notification) => notification_line(notification),
        None => keymap_line(state),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn notification_line(notification: &Notification) -> Line<'static> {
    let style = match notification.level {
        NotificationLevel::Info => Style::default().fg(COLOR_TEXT_DIMMED),
        NotificationLevel::Warn => Style::default().fg(COLOR_WARN),
    };
    Line::from(Span::styled(notification.message.clone(), style))
}

fn keymap_line(state: &RenderState) -> Line<'static> {
    let bindings: &[(&str, &str)] = match (state.mode, state.emoji_picker_visible) {
        (Mode::FilePicker, _) => &[("↑↓", "select"), ("Enter", "open"), ("⌫", "up"), ("Esc", "cancel")],
        (Mode::Chat, true) => &[("←→↑↓", "move"), ("Enter/1-0", "pick"), ("Esc", "close")],
        (Mode::Chat, false) => &[
            ("Enter", "send"),
            ("Alt+Enter", "newline"),
            ("^E", "emoji"),
            ("^F", "image"),
            ("^P/^N", "link"),
            ("^O", "open"),
            ("^L", "clear"),
            ("^C", "quit"),
        ],
    };

    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", desc_style));
        }
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(format!(" {}", desc), desc_style));
    }
    if state.pending_uploads > 0 {
        spans.push(Span::styled(
            format!("  │ uploading {}", state.pending_uploads),
            Style::default().fg(COLOR_IMAGE),
        ));
    }
    Line::from(spans)
}

/// Emoji grid floating just above the input box.
fn render_emoji_picker(frame: &mut Frame, state: &RenderState, input_area: Rect) {
    if state.emojis.is_empty() {
        return;
    }
    let rows = state.emojis.len().div_ceil(EMOJI_COLUMNS) as u16;
    // Each cell is "n glyph " (digit, space, 2-wide glyph, space).
    let width = (EMOJI_COLUMNS as u16 * 5 + 2).min(input_area.width);
    let height = (rows + 2).min(input_area.y);
    if height < 3 {
        return;
    }
    let popup = Rect {
        x: input_area.x,
        y: input_area.y - height,
        width,
        height,
    };

    let lines: Vec<Line> = state
        .emojis
        .chunks(EMOJI_COLUMNS)
        .enumerate()
        .map(|(row, chunk)| {
            let mut spans = Vec::new();
            for (col, emoji) in chunk.iter().enumerate() {
                let idx = row * EMOJI_COLUMNS + col;
                let digit = if idx < 10 {
                    ((idx + 1) % 10).to_string()
                } else {
                    " ".to_string()
                };
                let style = if idx == state.emoji_cursor {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(digit, Style::default().fg(COLOR_TEXT_MUTED)));
                spans.push(Span::styled(format!("{} ", emoji), style));
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("emoji")),
        popup,
    );
}

/// Centered directory browser.
fn render_file_picker(frame: &mut Frame, picker: &FilePicker, area: Rect) {
    let width = PICKER_MAX_WIDTH.min(area.width);
    let height = PICKER_MAX_HEIGHT.min(area.height);
    if width < 6 || height < 3 {
        return;
    }
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let inner_width = width.saturating_sub(2) as usize;
    let inner_height = height.saturating_sub(2) as usize;

    let lines: Vec<Line> = if picker.entries.is_empty() {
        vec![Line::from(Span::styled(
            "No images here",
            Style::default().fg(COLOR_TEXT_MUTED),
        ))]
    } else {
        // Keep the selection centered as the list scrolls.
        let start = picker
            .selected
            .saturating_sub(inner_height / 2)
            .min(picker.entries.len().saturating_sub(inner_height));
        picker
            .entries
            .iter()
            .enumerate()
            .skip(start)
            .take(inner_height)
            .map(|(idx, entry)| {
                let name = if entry.is_dir {
                    format!("{}/", entry.name)
                } else {
                    entry.name.clone()
                };
                let mut style = if entry.is_dir {
                    Style::default().fg(COLOR_TEXT_DIMMED)
                } else {
                    Style::default()
                };
                if idx == picker.selected {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(truncate(&name, inner_width), style))
            })
            .collect()
    };

    let title = truncate(&picker.dir.display().to_string(), inner_width);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        popup,
    );
}
