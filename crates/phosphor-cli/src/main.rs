//! Phosphor terminal front end.
//!
//! Loads a `.phos` project (the zstd+CBOR snapshot codec) or imports an
//! ANSI/CP437 file, then runs an edit loop over the canvas: keystrokes go
//! through the canvas's input surface, the frame writer repaints only when
//! the canvas revision moves, and session state (theme, tool params) is
//! persisted on exit.

use std::io::stdout;
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use phosphor_canvas::canvas::Canvas;
use phosphor_canvas::codec::{self, ProjectFile};
use phosphor_canvas::input::{apply_key, KeyToken, NamedKey};
use phosphor_canvas::snapshot::CanvasSnapshot;
use phosphor_canvas::UndoEngine;
use phosphor_session::Dirs;
use phosphor_terminal::{map_key_event, CrosstermBackend, FrameCache, TerminalBackend};

#[derive(Parser, Debug)]
#[command(name = "phosphor", version, about = "Phosphor terminal art editor")]
struct Args {
    /// Path to open at startup: a `.phos` project or a raw ANSI/CP437 file.
    /// Omit to start from a blank 80-column canvas.
    path: Option<PathBuf>,
}

struct Startup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

impl Startup {
    fn new() -> Self {
        Self { backend: CrosstermBackend::new(), log_guard: None }
    }

    fn configure_logging(&mut self) {
        let log_dir = std::path::Path::new(".");
        let file_appender = tracing_appender::rolling::never(log_dir, "phosphor.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Load the canvas and its undo/redo history named by `path`. A `.phos`
/// project restores both; any other file is an ANSI/CP437 import and starts
/// with empty history. No path starts a blank 80-column canvas.
fn load_canvas(path: Option<&PathBuf>) -> Result<(Canvas, UndoEngine)> {
    let Some(path) = path else {
        return Ok((Canvas::new(80), UndoEngine::default()));
    };
    let is_project = path.extension().and_then(|e| e.to_str()) == Some("phos");
    let mut canvas = Canvas::new(80);
    if is_project {
        let bytes = std::fs::read(path).with_context(|| format!("reading project {}", path.display()))?;
        let project = codec::decode(&bytes).with_context(|| format!("decoding project {}", path.display()))?;
        project.current.restore_into(&mut canvas);
        let undo = UndoEngine::from_parts(project.undo_limit, project.undo, project.redo);
        Ok((canvas, undo))
    } else {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let opt = phosphor_ansi::Options::default();
        let snapshot: CanvasSnapshot = phosphor_ansi::import_bytes(&bytes, &opt);
        snapshot.restore_into(&mut canvas);
        Ok((canvas, UndoEngine::default()))
    }
}

/// Persist the canvas and its undo/redo history back to `path` as a `.phos`
/// project.
fn save_canvas(path: &PathBuf, canvas: &Canvas, undo: &UndoEngine) -> Result<()> {
    let project = ProjectFile {
        current: CanvasSnapshot::capture(canvas),
        undo_limit: undo.history_limit(),
        undo: undo.undo_snapshots(),
        redo: undo.redo_snapshots(),
    };
    let bytes = codec::encode(&project).with_context(|| format!("encoding project {}", path.display()))?;
    std::fs::write(path, bytes).with_context(|| format!("writing project {}", path.display()))
}

fn run(args: &Args) -> Result<()> {
    let dirs = Dirs::discover();
    let session = phosphor_session::load(&dirs).unwrap_or_default();

    let (mut canvas, mut undo) = load_canvas(args.path.as_ref())?;
    let registry = phosphor_palette::PaletteRegistry::new();
    let palette = phosphor_palette::PaletteId::XTERM256;

    let mut startup = Startup::new();
    startup.backend.set_title("Phosphor")?;
    let guard = startup.backend.enter_guard()?;

    let mut frame_cache = FrameCache::new();
    let mut out = stdout();

    info!(target: "runtime", "entering edit loop");
    loop {
        frame_cache.render(&mut out, &canvas, &registry, palette)?;

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }
        match event::read()? {
            Event::Key(key_event) => {
                let Some(parts) = map_key_event(&key_event) else { continue };
                if matches!(parts.token, KeyToken::Named(NamedKey::Esc)) {
                    break;
                }
                if parts.repeat {
                    continue;
                }
                apply_key(&mut canvas, &mut undo, parts.token, parts.mods);
            }
            Event::Resize(_, _) => {
                // composite_cell geometry is driven by the canvas, not the
                // terminal size; a resize just forces a repaint next loop.
                frame_cache = FrameCache::new();
            }
            _ => {}
        }
    }

    drop(guard);

    if let Some(path) = args.path.as_ref() {
        if path.extension().and_then(|e| e.to_str()) == Some("phos") {
            if let Err(e) = save_canvas(path, &canvas, &undo) {
                error!(target: "runtime", error = %e, "failed to save project");
            }
        }
    }
    phosphor_session::save(&session, &dirs).ok();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = Startup::new();
    startup.configure_logging();
    Startup::install_panic_hook();

    if let Err(e) = run(&args) {
        error!(target: "runtime", error = %e, "fatal");
        return Err(e);
    }
    Ok(())
}
