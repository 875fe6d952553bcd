//! Embedded scripting sandbox: compiles a Lua chunk exposing `render(ctx,
//! layer)` (or a classic `main(coord, context, cursor, buffer)` shimmed
//! into one), paces its ticks against wall-clock time, and exchanges
//! parameters and tool commands with the host.

mod commands;
mod context;
mod engine;
mod error;
mod glyph_ink;
mod layer_buffer;
mod params;
mod scheduler;
mod settings;
mod stdlib;

pub use commands::ToolCommand;
pub use context::{CursorState, FrameContext, TickPhase};
pub use engine::ScriptEngine;
pub use error::ScriptError;
pub use glyph_ink::{BuiltinGlyphInk, GlyphInk};
pub use params::{LayoutHints, ParamSpec, ParamStore, ParamType, ParamValue};
pub use scheduler::Scheduler;
pub use settings::ScriptSettings;
