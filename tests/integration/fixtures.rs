//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - A model with a frozen clock
//! - Key events and typing
//! - Temporary image files

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

use ephemera::chat::FixedClock;
use ephemera::config::Config;
use ephemera::tea::{update, Command, Message, Model};

pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

pub fn clock() -> FixedClock {
    FixedClock(Local.with_ymd_and_hms(2024, 8, 9, 10, 11, 12).unwrap())
}

pub fn model() -> Model {
    let config = Config {
        timestamp_format: TIMESTAMP_FORMAT.to_string(),
        ..Config::default()
    };
    Model::with_clock(config, Arc::new(clock()))
}

pub fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::empty()))
}

pub fn ctrl(c: char) -> Message {
    Message::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

pub fn type_str(model: &mut Model, s: &str) -> Vec<Command> {
    s.chars()
        .flat_map(|c| update(model, key(KeyCode::Char(c))))
        .collect()
}

/// A temporary directory holding image files.
pub struct ImageDir {
    pub temp_dir: TempDir,
}

impl ImageDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, bytes).expect("Failed to write image fixture");
        path
    }
}

/// `len` bytes of deterministic filler.
pub fn filler(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// A real PNG of `w`x`h` opaque pixels.
pub fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([30, 60, 90, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    out.into_inner()
}
