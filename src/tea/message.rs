//! Inputs to the update function: terminal events and background results.

use std::path::PathBuf;

use crossterm::event::KeyEvent;

use crate::chat::{ChatMessage, ImagePreview};
use crate::picker::PickerEntry;

#[derive(Debug)]
pub enum Message {
    // Terminal events
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),

    // Ingest completions, in completion order
    ImageIngested {
        message: ChatMessage,
        /// `None` when the bytes do not decode as an image.
        preview: Option<ImagePreview>,
    },
    ImageIngestFailed { path: PathBuf, error: String },

    // File picker listings
    DirListed {
        dir: PathBuf,
        entries: Vec<PickerEntry>,
    },
    DirListFailed { dir: PathBuf, error: String },
}
