pub mod chat;
pub mod config;
pub mod error;
pub mod log;
pub mod picker;
pub mod util;

// Decoupled logic/render loop
pub mod app;
pub mod graphics;
pub mod render;
pub mod tea;
pub mod ui;

pub use chat::{ChatMessage, MessageStore};
pub use error::{Error, Result};
