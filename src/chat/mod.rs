//! Chat core: the message model, the append-only store, the link
//! classifier, the image ingestor and decoded image previews.
//!
//! Nothing in here knows about the terminal. The TEA layer in [`crate::tea`]
//! drives these pieces and the UI renders their output.

pub mod classify;
pub mod clock;
pub mod ingest;
pub mod message;
pub mod preview;
pub mod store;

pub use classify::{classify, first_url, is_blank};
pub use clock::{Clock, FixedClock, SystemClock};
pub use ingest::{ingest_file, ingest_reader, DataUri};
pub use message::{ChatMessage, MessageKind};
pub use preview::{decode_preview, ImagePreview};
pub use store::MessageStore;
