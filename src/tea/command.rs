//! Side effects returned by `update` and executed by the logic thread.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read an image file in the background; completes with
    /// `Message::ImageIngested` or `Message::ImageIngestFailed`.
    IngestImage { path: PathBuf },

    /// List a directory for the file picker.
    ListDir { dir: PathBuf },

    /// Hand a URL to the system browser, detached from this process.
    OpenLink { url: String },

    Quit,
}
