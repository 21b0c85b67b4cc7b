//! The Elm Architecture (TEA) layer for the chat panel.
//!
//! - `Model`: the message store, draft and UI flags
//! - `Message`: key presses, pastes and background completions
//! - `Command`: side effects requested by `update` (file reads, listings)
//! - `update`: applies one message to the model

pub mod command;
pub mod message;
pub mod model;
pub mod update;

pub use command::Command;
pub use message::Message;
pub use model::{Mode, Model, Notification, NotificationLevel};
pub use update::update;
