//! Update function for the chat panel.
//!
//! Takes a model and a message, mutates the model and returns the commands
//! to execute. No I/O happens here.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::chat::{classify, first_url, is_blank};
use crate::picker::FilePicker;
use crate::{elog, elog_debug, elog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{Mode, Model, Notification, NotificationLevel};

/// Emoji grid columns.
pub const EMOJI_COLUMNS: usize = 5;

const SCROLL_PAGE: usize = 5;

fn notify(model: &mut Model, level: NotificationLevel, message: String) {
    model.notification = Some(Notification { level, message });
    model.dirty = true;
}

pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.notification = None;
            model.dirty = true;
            if is_ctrl(&key, 'c') {
                cmds.push(Command::Quit);
                return cmds;
            }
            match model.mode {
                Mode::FilePicker => update_picker_mode(model, key, &mut cmds),
                Mode::Chat if model.emoji_picker_visible => update_emoji_mode(model, key, &mut cmds),
                Mode::Chat => update_chat_mode(model, key, &mut cmds),
            }
        }

        Message::Paste(text) => {
            if model.mode == Mode::Chat {
                model.draft.push_str(&text);
                model.dirty = true;
            }
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::ImageIngested { message, preview } => {
            model.pending_uploads = model.pending_uploads.saturating_sub(1);
            elog_debug!(
                "Message::ImageIngested pending={} preview={}",
                model.pending_uploads,
                preview.is_some()
            );
            model.append_image(message, preview);
        }

        Message::ImageIngestFailed { path, error } => {
            // Silent for the user; only the log records it.
            model.pending_uploads = model.pending_uploads.saturating_sub(1);
            elog_warn!("Image ingest failed path={} err={}", path.display(), error);
            model.dirty = true;
        }

        Message::DirListed { dir, entries } => {
            elog_debug!("Message::DirListed dir={} entries={}", dir.display(), entries.len());
            model.picker_dir = dir.clone();
            model.picker = Some(FilePicker::new(dir, entries));
            model.mode = Mode::FilePicker;
            model.emoji_picker_visible = false;
            model.dirty = true;
        }

        Message::DirListFailed { dir, error } => {
            elog_warn!("Directory listing failed dir={} err={}", dir.display(), error);
            notify(
                model,
                NotificationLevel::Warn,
                format!("Cannot open {}: {}", dir.display(), error),
            );
        }
    }

    cmds
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

fn update_chat_mode(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        // A modified Enter keeps composing instead of sending.
        KeyCode::Enter if !key.modifiers.is_empty() => {
            model.draft.push('\n');
        }

        KeyCode::Enter => submit(model),

        KeyCode::Char('e') if ctrl => toggle_emoji_picker(model),

        KeyCode::Char('f') if ctrl => {
            cmds.push(Command::ListDir {
                dir: model.picker_dir.clone(),
            });
        }

        KeyCode::Char('l') if ctrl => {
            elog!("Chat cleared ({} messages)", model.store.len());
            model.clear();
        }

        KeyCode::Char('o') if ctrl => {
            let target = model.selected_link.or_else(|| model.store.last_link());
            if let Some(url) = target.and_then(|idx| link_url(model, idx)) {
                cmds.push(Command::OpenLink { url });
            }
        }

        KeyCode::Char('p') if ctrl => {
            if let Some(idx) = model.store.previous_link(model.selected_link) {
                select_link(model, Some(idx));
            }
        }

        KeyCode::Char('n') if ctrl => {
            if let Some(current) = model.selected_link {
                let next = model.store.next_link(current);
                select_link(model, next);
            }
        }

        KeyCode::Char(_) if ctrl => {}

        KeyCode::Char(c) => model.draft.push(c),

        KeyCode::Backspace => {
            model.draft.pop();
        }

        KeyCode::Up => model.scroll = model.scroll.saturating_add(1),
        KeyCode::Down => model.scroll = model.scroll.saturating_sub(1),
        KeyCode::PageUp => model.scroll = model.scroll.saturating_add(SCROLL_PAGE),
        KeyCode::PageDown => model.scroll = model.scroll.saturating_sub(SCROLL_PAGE),
        KeyCode::End => model.scroll = 0,

        KeyCode::Esc if model.draft.is_empty() => cmds.push(Command::Quit),

        _ => {}
    }
}

fn link_url(model: &Model, idx: usize) -> Option<String> {
    model
        .store
        .get(idx)
        .and_then(|m| first_url(m.content()))
        .map(str::to_string)
}

/// Move the link highlight; `None` returns Ctrl+O to the newest link.
fn select_link(model: &mut Model, idx: Option<usize>) {
    model.selected_link = idx;
    if let Some(url) = idx.and_then(|idx| link_url(model, idx)) {
        notify(model, NotificationLevel::Info, format!("^O opens {}", url));
    }
}

/// Classify and append a non-blank draft, then reset it. Blank drafts are
/// left exactly as they are.
fn submit(model: &mut Model) {
    if is_blank(&model.draft) {
        return;
    }
    let message = classify(&model.draft, model.clock.as_ref(), &model.config.timestamp_format);
    elog_debug!("submit kind={}", message.kind().label());
    model.append(message);
    model.draft.clear();
}

fn toggle_emoji_picker(model: &mut Model) {
    model.emoji_picker_visible = !model.emoji_picker_visible;
    model.emoji_cursor = 0;
}

fn pick_emoji(model: &mut Model, index: usize) {
    if let Some(emoji) = model.config.emojis.get(index) {
        model.draft.push_str(emoji);
    }
    model.emoji_picker_visible = false;
}

fn update_emoji_mode(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    let count = model.config.emojis.len();

    match key.code {
        KeyCode::Esc => model.emoji_picker_visible = false,

        KeyCode::Enter => pick_emoji(model, model.emoji_cursor),

        KeyCode::Char(d) if d.is_ascii_digit() && key.modifiers.is_empty() => {
            // '1'..'9' then '0' for the tenth cell
            let index = (d as usize + 9 - '0' as usize) % 10;
            if index < count {
                pick_emoji(model, index);
            }
        }

        KeyCode::Right if count > 0 => model.emoji_cursor = (model.emoji_cursor + 1) % count,
        KeyCode::Left if count > 0 => {
            model.emoji_cursor = model.emoji_cursor.checked_sub(1).unwrap_or(count - 1);
        }
        KeyCode::Down if count > 0 => {
            model.emoji_cursor = (model.emoji_cursor + EMOJI_COLUMNS).min(count - 1);
        }
        KeyCode::Up => model.emoji_cursor = model.emoji_cursor.saturating_sub(EMOJI_COLUMNS),

        // Everything else keeps editing the draft underneath.
        _ => update_chat_mode(model, key, cmds),
    }
}

fn update_picker_mode(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    let Some(picker) = model.picker.as_mut() else {
        model.mode = Mode::Chat;
        return;
    };

    match key.code {
        KeyCode::Down => picker.select_next(),
        KeyCode::Up => picker.select_prev(),

        KeyCode::Enter => match picker.selected_entry().cloned() {
            Some(entry) if entry.is_dir => cmds.push(Command::ListDir { dir: entry.path }),
            Some(entry) => {
                close_picker(model);
                model.pending_uploads += 1;
                notify(model, NotificationLevel::Info, format!("Uploading {}", entry.name));
                cmds.push(Command::IngestImage { path: entry.path });
            }
            None => {}
        },

        KeyCode::Backspace | KeyCode::Left => {
            if let Some(parent) = picker.parent_dir() {
                cmds.push(Command::ListDir { dir: parent });
            }
        }

        KeyCode::Esc => close_picker(model),

        _ => {}
    }
}

fn close_picker(model: &mut Model) {
    model.picker = None;
    model.mode = Mode::Chat;
}
