use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use crossterm::event::{self, Event, KeyEventKind, KeyboardEnhancementFlags};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::chat::{decode_preview, ingest_file, Clock};
use crate::config::Config;
use crate::picker::list_dir;
use crate::render::RenderState;
use crate::tea::{update, Command, Message, Model};
use crate::util::blocking_with_timeout;
use crate::{elog, elog_debug, elog_trace, elog_warn, Result};

const MAX_BG_MESSAGES: usize = 50;
const LIST_DIR_TIMEOUT: Duration = Duration::from_secs(2);

/// Pushed where the terminal supports it, so Shift+Enter and Ctrl+Enter
/// arrive with their modifiers instead of as a bare Enter.
pub const KEYBOARD_FLAGS: KeyboardEnhancementFlags =
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES.union(KeyboardEnhancementFlags::REPORT_EVENT_TYPES);

/// Owns the model and runs the event loop on its own thread.
pub struct LogicThread;

impl LogicThread {
    pub fn run(config: Config, state_tx: Sender<RenderState>, shutdown: Arc<AtomicBool>) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        let mut model = Model::new(config);
        elog_debug!("LogicThread::run_async picker_dir={}", model.picker_dir.display());

        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
        send_state(&state_tx, &mut model);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Terminal input first
            while event::poll(Duration::ZERO)? {
                let Some(msg) = translate_event(event::read()?) else {
                    continue;
                };
                if dispatch(&mut model, msg, &msg_tx) {
                    shutdown.store(true, Ordering::Relaxed);
                    return Ok(());
                }
            }

            // Background completions (bounded per tick)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                if dispatch(&mut model, msg, &msg_tx) {
                    shutdown.store(true, Ordering::Relaxed);
                    return Ok(());
                }
            }

            send_state(&state_tx, &mut model);

            tokio::time::sleep(Duration::from_micros(500)).await;
        }

        Ok(())
    }
}

fn translate_event(event: Event) -> Option<Message> {
    match event {
        // Releases only arrive with REPORT_EVENT_TYPES pushed
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(Message::Key(key)),
        Event::Paste(text) => Some(Message::Paste(text)),
        Event::Resize(w, h) => Some(Message::Resize(w, h)),
        _ => None,
    }
}

/// Apply one message and run the commands it produced. Returns true on quit.
pub fn dispatch(model: &mut Model, msg: Message, msg_tx: &mpsc::UnboundedSender<Message>) -> bool {
    for cmd in update(model, msg) {
        if execute_command(model, cmd, msg_tx) {
            return true;
        }
    }
    false
}

/// Run a command's side effect. Async work is spawned and reports back over
/// `msg_tx`, so completions are applied on this thread in completion order.
pub fn execute_command(model: &Model, cmd: Command, msg_tx: &mpsc::UnboundedSender<Message>) -> bool {
    match cmd {
        Command::IngestImage { path } => {
            elog_debug!("Command::IngestImage path={}", path.display());
            spawn_ingest(path, IngestContext::from_model(model), msg_tx.clone());
        }

        Command::ListDir { dir } => {
            elog_debug!("Command::ListDir dir={}", dir.display());
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                let listing = {
                    let dir = dir.clone();
                    blocking_with_timeout(LIST_DIR_TIMEOUT, move || list_dir(&dir)).await
                };
                let msg = match listing {
                    Ok(entries) => Message::DirListed { dir, entries },
                    Err(e) => Message::DirListFailed {
                        dir,
                        error: e.to_string(),
                    },
                };
                let _ = tx.send(msg);
            });
        }

        Command::OpenLink { url } => {
            open_link(&url, |url| open::that_detached(url));
        }

        Command::Quit => {
            elog_debug!("Command::Quit");
            return true;
        }
    }

    false
}

/// Launch `url` with `launch`. Only the event is logged, never the URL.
fn open_link(url: &str, launch: impl FnOnce(&str) -> std::io::Result<()>) {
    elog!("Opening link");
    if let Err(e) = launch(url) {
        elog_warn!("Failed to open link: {}", e.kind());
    }
}

/// What a background ingest needs from the model.
#[derive(Clone)]
pub struct IngestContext {
    pub clock: Arc<dyn Clock>,
    pub timestamp_format: String,
    /// Preview bound in cells.
    pub tile_width: u16,
}

impl IngestContext {
    pub fn from_model(model: &Model) -> Self {
        Self {
            clock: model.clock.clone(),
            timestamp_format: model.config.timestamp_format.clone(),
            tile_width: model.config.image_tile_width,
        }
    }
}

/// Read one image and decode its preview in a background task; exactly one
/// completion message is sent.
pub fn spawn_ingest(
    path: std::path::PathBuf,
    ctx: IngestContext,
    msg_tx: mpsc::UnboundedSender<Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let msg = match ingest_file(&path, ctx.clock.as_ref(), &ctx.timestamp_format).await {
            Ok(message) => {
                let preview = decode_preview(&message, ctx.tile_width).await;
                Message::ImageIngested { message, preview }
            }
            Err(e) => Message::ImageIngestFailed {
                path,
                error: e.to_string(),
            },
        };
        let _ = msg_tx.send(msg);
    })
}

/// Publish a snapshot if anything changed. The model stays dirty while the
/// render thread still holds the previous one, so the next tick retries.
fn send_state(state_tx: &Sender<RenderState>, model: &mut Model) {
    if !model.dirty {
        return;
    }
    match state_tx.try_send(model.snapshot()) {
        Ok(()) => {
            elog_trace!("published snapshot messages={}", model.store.len());
            model.dirty = false;
        }
        Err(TrySendError::Full(_)) => {}
        Err(TrySendError::Disconnected(_)) => model.dirty = false,
    }
}
