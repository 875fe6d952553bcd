//! ANSI/CP437 art import: CSI state machine, SAUCE detection, and the
//! UTF-8/CP437 auto-detect heuristic.

mod cp437;
mod encoding;
mod error;
mod import;
mod options;
mod sauce;

pub use error::ImportError;
pub use import::{import_bytes, import_file};
pub use options::{Options, WrapPolicy};
pub use sauce::{parse as parse_sauce, SauceInfo};
