//! Crossterm terminal I/O: the RAII backend guard, key-event translation,
//! and the composite-cell frame writer that turns a canvas into terminal
//! output. Nothing outside this crate imports crossterm directly.

pub mod frame;
pub mod guard;
pub mod keys;

pub use frame::FrameCache;
pub use guard::{CrosstermBackend, TerminalBackend, TerminalGuard};
pub use keys::{map_key_event, map_key_token, map_mod_mask, KeyPressParts};
