use crate::chat::ImagePreview;
use crate::picker::FilePicker;
use crate::tea::{Mode, Notification};
use std::sync::atomic::{AtomicU64, Ordering};

/// What the UI draws for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    /// Whole submitted text, drawn as one link region.
    Link(String),
    /// `preview` shares the decoded pixels; `None` draws a metadata tile.
    Image {
        media_type: String,
        byte_len: usize,
        preview: Option<ImagePreview>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub body: MessageBody,
    pub timestamp: String,
}

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub messages: Vec<MessageView>,
    pub draft: String,
    pub emoji_picker_visible: bool,
    pub emoji_cursor: usize,
    pub emojis: Vec<String>,
    pub mode: Mode,
    pub picker: Option<FilePicker>,
    /// Index into `messages` of the highlighted link.
    pub selected_link: Option<usize>,
    pub scroll: usize,
    pub pending_uploads: usize,
    pub notification: Option<Notification>,
    pub image_tile_width: u16,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            messages: Vec::new(),
            draft: String::new(),
            emoji_picker_visible: false,
            emoji_cursor: 0,
            emojis: Vec::new(),
            mode: Mode::Chat,
            picker: None,
            selected_link: None,
            scroll: 0,
            pending_uploads: 0,
            notification: None,
            image_tile_width: crate::config::DEFAULT_IMAGE_TILE_WIDTH,
        }
    }
}
