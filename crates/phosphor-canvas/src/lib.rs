//! The layered canvas: cell grid, compositing, undo/redo, project codec, and
//! a terminal-agnostic input surface.

pub mod canvas;
pub mod capture;
pub mod cell;
pub mod codec;
pub mod error;
pub mod input;
pub mod layer;
pub mod snapshot;

pub use canvas::{Canvas, CompositeCell};
pub use capture::UndoEngine;
pub use cell::{Attrs, BLANK_CODEPOINT};
pub use error::CodecError;
pub use input::{apply_key, queue_text, KeyToken, ModMask, NamedKey};
pub use layer::Layer;
pub use snapshot::CanvasSnapshot;
