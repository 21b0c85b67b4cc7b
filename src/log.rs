//! File logging for ephemera.
//!
//! The terminal belongs to the TUI, so every log line goes to
//! `~/.ephemera/ephemera.log` (truncated at startup). Nothing a user types
//! is ever written here; entries describe events, not message content.
//!
//! Debug mode is enabled with `--debug` or `EPHEMERA_DEBUG=1`.
//! `EPHEMERA_DEBUG=trace` also logs every published frame.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

const DEBUG_ENV: &str = "EPHEMERA_DEBUG";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Initialize logging under `~/.ephemera/`. `debug` raises the level to DEBUG;
/// so does a truthy `EPHEMERA_DEBUG`.
pub fn init(debug: bool) {
    let env = std::env::var(DEBUG_ENV).ok().and_then(|v| env_level(&v));
    let level = match env {
        Some(level) => level,
        None if debug => LogLevel::Debug,
        None => LogLevel::Info,
    };
    set_level(level);

    if let Some(dir) = dirs::home_dir().map(|h| h.join(".ephemera")) {
        init_at(&dir.join("ephemera.log"));
    }
}

/// Point the logger at an explicit file. Only the first call wins.
pub fn init_at(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(path, "");
    LOG_PATH.set(path.to_path_buf()).ok();
}

fn env_level(v: &str) -> Option<LogLevel> {
    if v.eq_ignore_ascii_case("trace") {
        Some(LogLevel::Trace)
    } else if is_truthy(v) {
        Some(LogLevel::Debug)
    } else {
        None
    }
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

pub fn is_debug() -> bool {
    get_level() >= LogLevel::Debug
}

pub fn set_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

pub fn get_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

fn format_line(level: LogLevel, msg: &str) -> String {
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    format!("[{}] [{}] {}", timestamp, level.as_str(), msg)
}

pub fn log_at(level: LogLevel, msg: &str) {
    if level > get_level() {
        return;
    }

    if let Some(path) = LOG_PATH.get() {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", format_line(level, msg));
        }
    }
}

pub fn error(msg: &str) {
    log_at(LogLevel::Error, msg);
}

pub fn warn(msg: &str) {
    log_at(LogLevel::Warn, msg);
}

pub fn info(msg: &str) {
    log_at(LogLevel::Info, msg);
}

pub fn debug(msg: &str) {
    log_at(LogLevel::Debug, msg);
}

pub fn trace(msg: &str) {
    log_at(LogLevel::Trace, msg);
}

/// INFO level.
#[macro_export]
macro_rules! elog {
    ($($arg:tt)*) => {
        $crate::log::info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! elog_error {
    ($($arg:tt)*) => {
        $crate::log::error(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! elog_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(&format!($($arg)*))
    };
}

/// DEBUG level, only written in debug mode.
#[macro_export]
macro_rules! elog_debug {
    ($($arg:tt)*) => {
        $crate::log::debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! elog_trace {
    ($($arg:tt)*) => {
        $crate::log::trace(&format!($($arg)*))
    };
}
