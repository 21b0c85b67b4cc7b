use std::io::{self, stdout, Stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use ephemera::app::{LogicThread, KEYBOARD_FLAGS};
use ephemera::config::Config;
use ephemera::graphics::Graphics;
use ephemera::render::RenderState;
use ephemera::{elog, elog_debug, elog_error, ui, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// Ephemera - a chat panel that forgets everything when you quit
#[derive(Parser, Debug)]
#[command(name = "ephemera")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    EPHEMERA_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.ephemera/ephemera.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Directory the image picker starts in
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Write the default config to ~/.ephemera/config.toml and exit
    #[arg(long)]
    pub write_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    ephemera::log::init(cli.debug);

    if cli.write_config {
        Config::default().save()?;
        println!("Wrote {}", Config::config_path()?.display());
        return Ok(());
    }

    if ephemera::log::is_debug() {
        elog!("Ephemera starting (debug mode enabled)");
    } else {
        elog!("Ephemera starting");
    }

    let mut config = Config::load()?;
    if let Some(dir) = cli.dir {
        config.picker_dir = Some(dir.to_string_lossy().into_owned());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let mut terminal = setup_terminal()?;
    let keyboard_enhanced = enable_keyboard_enhancement();
    // The graphics query reads stdin, so it runs before the event reader exists.
    let mut graphics = Graphics::detect();

    let shutdown_clone = shutdown.clone();
    let logic_handle = thread::spawn(move || LogicThread::run(config, state_tx, shutdown_clone));

    let result = render_loop(&mut terminal, state_rx, &shutdown, &mut graphics);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle.join();
    restore_terminal(&mut terminal, keyboard_enhanced)?;
    elog!("Ephemera exiting");

    match logic_result {
        Ok(Err(e)) => {
            elog_error!("Logic thread failed: {}", e);
            Err(e)
        }
        _ => result,
    }
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
    graphics: &mut Graphics,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state, graphics))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

/// Report modified Enter distinctly where the terminal supports it.
/// Elsewhere Alt+Enter is the newline key.
fn enable_keyboard_enhancement() -> bool {
    if !matches!(supports_keyboard_enhancement(), Ok(true)) {
        elog_debug!("Keyboard enhancement unsupported");
        return false;
    }
    match execute!(io::stdout(), PushKeyboardEnhancementFlags(KEYBOARD_FLAGS)) {
        Ok(()) => true,
        Err(e) => {
            elog_debug!("Keyboard enhancement failed: {}", e);
            false
        }
    }
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    keyboard_enhanced: bool,
) -> Result<()> {
    if keyboard_enhanced {
        execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
    }
    terminal.show_cursor()?;
    execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
