//! Error types for the canvas crate.

use thiserror::Error;

/// Failure modes for reading or writing the project snapshot wire format.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported project version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("truncated project header: got {len} bytes, need at least {min}")]
    TruncatedHeader { len: usize, min: usize },

    #[error("zstd compression failed: {0}")]
    Zstd(String),

    #[error("CBOR encode failed: {0}")]
    CborEncode(String),

    #[error("CBOR decode failed: {0}")]
    CborDecode(String),

    #[error("decompressed payload size mismatch: header said {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("layer {layer} array length mismatch: cells has {expected} entries, a color/attrs array has {actual}")]
    LayerSizeMismatch { layer: usize, expected: usize, actual: usize },
}
