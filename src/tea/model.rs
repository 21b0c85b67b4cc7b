//! Model for the chat panel.
//!
//! Pure state: no channels, no handles. Everything here lives only as long
//! as the process.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::chat::{ChatMessage, Clock, DataUri, ImagePreview, MessageStore, SystemClock};
use crate::config::Config;
use crate::picker::FilePicker;
use crate::render::{next_version, MessageBody, MessageView, RenderState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    /// Picker problems only. Chat failures are never surfaced.
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Chat,
    FilePicker,
}

pub struct Model {
    pub store: MessageStore,
    /// Decoded previews keyed by store index.
    pub previews: HashMap<usize, ImagePreview>,
    /// Store index of the link chosen with Ctrl+P/Ctrl+N.
    pub selected_link: Option<usize>,
    pub draft: String,
    pub emoji_picker_visible: bool,
    /// Highlighted cell in the emoji grid.
    pub emoji_cursor: usize,
    pub mode: Mode,
    pub picker: Option<FilePicker>,
    /// Directory the file picker reopens at.
    pub picker_dir: PathBuf,
    /// Lines scrolled up from the newest message; 0 follows the latest.
    pub scroll: usize,
    /// Ingests started but not yet completed or failed.
    pub pending_uploads: usize,
    pub notification: Option<Notification>,

    // Set when state changes and a render is needed
    pub dirty: bool,

    pub config: Config,
    pub clock: Arc<dyn Clock>,
}

impl Model {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let picker_dir = config.effective_picker_dir();
        Self {
            store: MessageStore::new(),
            previews: HashMap::new(),
            selected_link: None,
            draft: String::new(),
            emoji_picker_visible: false,
            emoji_cursor: 0,
            mode: Mode::default(),
            picker: None,
            picker_dir,
            scroll: 0,
            pending_uploads: 0,
            notification: None,
            dirty: true,
            config,
            clock,
        }
    }

    /// Append and jump back to the newest message.
    pub fn append(&mut self, message: ChatMessage) {
        self.store.append(message);
        self.scroll = 0;
        self.dirty = true;
    }

    pub fn append_image(&mut self, message: ChatMessage, preview: Option<ImagePreview>) {
        if let Some(preview) = preview {
            self.previews.insert(self.store.len(), preview);
        }
        self.append(message);
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.previews.clear();
        self.selected_link = None;
        self.scroll = 0;
        self.dirty = true;
    }

    /// Immutable snapshot for the render thread.
    ///
    /// Image payloads are reduced to media type and size so a snapshot
    /// never copies encoded image data.
    pub fn snapshot(&self) -> RenderState {
        let messages = self
            .store
            .all()
            .iter()
            .enumerate()
            .map(|(idx, message)| message_view(message, self.previews.get(&idx)))
            .collect();

        RenderState {
            version: next_version(),
            messages,
            draft: self.draft.clone(),
            emoji_picker_visible: self.emoji_picker_visible,
            emoji_cursor: self.emoji_cursor,
            emojis: self.config.emojis.clone(),
            mode: self.mode,
            picker: self.picker.clone(),
            selected_link: self.selected_link,
            scroll: self.scroll,
            pending_uploads: self.pending_uploads,
            notification: self.notification.clone(),
            image_tile_width: self.config.image_tile_width,
        }
    }
}

fn message_view(message: &ChatMessage, preview: Option<&ImagePreview>) -> MessageView {
    let body = match message {
        ChatMessage::Text { body, .. } => MessageBody::Text(body.clone()),
        ChatMessage::Link { url, .. } => MessageBody::Link(url.clone()),
        ChatMessage::Image { data_uri, .. } => match DataUri::parse(data_uri) {
            Some(uri) => MessageBody::Image {
                media_type: uri.media_type.to_string(),
                byte_len: uri.decoded_len(),
                preview: preview.cloned(),
            },
            None => MessageBody::Image {
                media_type: "unknown".to_string(),
                byte_len: 0,
                preview: None,
            },
        },
    };
    MessageView {
        body,
        timestamp: message.timestamp().to_string(),
    }
}
