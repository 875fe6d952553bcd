//! Project snapshot wire format: a small header wrapping zstd-compressed
//! CBOR, with fallback to decoding raw (uncompressed, unheadered) CBOR for
//! files written by older tooling.

use serde::{Deserialize, Serialize};

use crate::capture::DEFAULT_HISTORY_LIMIT;
use crate::error::CodecError;
use crate::layer::Layer;
use crate::snapshot::CanvasSnapshot;

const MAGIC: &[u8; 4] = b"U8PZ";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 8;
const CBOR_MAGIC: &str = "utf8-art-editor";

/// The current canvas state plus its undo/redo history: the whole project,
/// not just one snapshot of it.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub current: CanvasSnapshot,
    pub undo_limit: usize,
    pub undo: Vec<CanvasSnapshot>,
    pub redo: Vec<CanvasSnapshot>,
}

/// The CBOR object actually written to disk: `current`/`undo`/`redo` plus
/// the fixed `magic`/`version` fields the spec's wire format names.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectFileCbor {
    magic: String,
    version: u32,
    undo_limit: usize,
    current: CanvasSnapshot,
    undo: Vec<CanvasSnapshot>,
    redo: Vec<CanvasSnapshot>,
}

fn has_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[0..4] == MAGIC
}

/// Encode a project as `U8PZ` + LE version + LE uncompressed length + zstd(CBOR).
pub fn encode(project: &ProjectFile) -> Result<Vec<u8>, CodecError> {
    let wire = ProjectFileCbor {
        magic: CBOR_MAGIC.to_string(),
        version: VERSION,
        undo_limit: project.undo_limit,
        current: project.current.clone(),
        undo: project.undo.clone(),
        redo: project.redo.clone(),
    };

    let mut cbor = Vec::new();
    ciborium::into_writer(&wire, &mut cbor).map_err(|e| CodecError::CborEncode(e.to_string()))?;

    let compressed = zstd::stream::encode_all(cbor.as_slice(), 0).map_err(|e| CodecError::Zstd(e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(cbor.len() as u64).to_le_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decode a project file, accepting either the `U8PZ` wrapper (current
/// snapshot plus undo/redo history) or a bare CBOR `CanvasSnapshot`
/// payload (pre-history project files, which come back with empty undo/redo
/// stacks and the default history limit).
pub fn decode(bytes: &[u8]) -> Result<ProjectFile, CodecError> {
    if has_magic(bytes) {
        decode_wrapped(bytes)
    } else {
        decode_raw_cbor(bytes)
    }
}

fn decode_wrapped(bytes: &[u8]) -> Result<ProjectFile, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TruncatedHeader {
            len: bytes.len(),
            min: HEADER_LEN,
        });
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if version != VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: version,
            expected: VERSION,
        });
    }
    let uncompressed_len = u64::from_le_bytes(bytes[8..16].try_into().unwrap());

    let compressed = &bytes[HEADER_LEN..];
    let cbor = zstd::stream::decode_all(compressed).map_err(|e| CodecError::Zstd(e.to_string()))?;

    if cbor.len() as u64 != uncompressed_len {
        return Err(CodecError::SizeMismatch {
            expected: uncompressed_len,
            actual: cbor.len() as u64,
        });
    }

    let mut wire: ProjectFileCbor = ciborium::from_reader(cbor.as_slice()).map_err(|e| CodecError::CborDecode(e.to_string()))?;

    validate_snapshot(&mut wire.current)?;
    for snap in wire.undo.iter_mut().chain(wire.redo.iter_mut()) {
        validate_snapshot(snap)?;
    }

    Ok(ProjectFile {
        current: wire.current,
        undo_limit: wire.undo_limit,
        undo: wire.undo,
        redo: wire.redo,
    })
}

fn decode_raw_cbor(bytes: &[u8]) -> Result<ProjectFile, CodecError> {
    let mut current: CanvasSnapshot = ciborium::from_reader(bytes).map_err(|e| CodecError::CborDecode(e.to_string()))?;
    validate_snapshot(&mut current)?;
    Ok(ProjectFile {
        current,
        undo_limit: DEFAULT_HISTORY_LIMIT,
        undo: Vec::new(),
        redo: Vec::new(),
    })
}

/// Check every layer's parallel arrays agree in length, backfilling a
/// missing (zero-length) `attrs` array for backward compatibility but
/// treating any other mismatch as a typed decode error rather than
/// silently padding or truncating it.
fn validate_snapshot(snapshot: &mut CanvasSnapshot) -> Result<(), CodecError> {
    for (i, layer) in snapshot.layers.iter_mut().enumerate() {
        validate_layer(i, layer)?;
    }
    Ok(())
}

fn validate_layer(index: usize, layer: &mut Layer) -> Result<(), CodecError> {
    let expected = layer.cells.len();
    if layer.fg.len() != expected {
        return Err(CodecError::LayerSizeMismatch { layer: index, expected, actual: layer.fg.len() });
    }
    if layer.bg.len() != expected {
        return Err(CodecError::LayerSizeMismatch { layer: index, expected, actual: layer.bg.len() });
    }
    if layer.attrs.is_empty() && expected > 0 {
        layer.backfill_attrs();
    } else if !layer.invariants_hold() {
        return Err(CodecError::LayerSizeMismatch { layer: index, expected, actual: layer.attrs.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::cell::Attrs;
    use phosphor_palette::ColorIndex;

    fn sample_snapshot() -> CanvasSnapshot {
        let mut canvas = Canvas::new(8);
        canvas.set_active_cell(2, 0, 'Q' as u32, ColorIndex::new(4), ColorIndex::new(1), Attrs::UNDERLINE);
        CanvasSnapshot::capture(&canvas)
    }

    fn sample_project() -> ProjectFile {
        ProjectFile {
            current: sample_snapshot(),
            undo_limit: 256,
            undo: vec![sample_snapshot()],
            redo: Vec::new(),
        }
    }

    #[test]
    fn round_trips_through_the_wrapped_format() {
        let project = sample_project();
        let bytes = encode(&project).unwrap();
        assert!(has_magic(&bytes));

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.current.columns, project.current.columns);
        assert_eq!(decoded.current.layers[0].cells[2], 'Q' as u32);
        assert_eq!(decoded.undo_limit, 256);
        assert_eq!(decoded.undo.len(), 1);
        assert!(decoded.redo.is_empty());
    }

    #[test]
    fn falls_back_to_raw_cbor_without_a_magic_header() {
        let snap = sample_snapshot();
        let mut cbor = Vec::new();
        ciborium::into_writer(&snap, &mut cbor).unwrap();

        let decoded = decode(&cbor).unwrap();
        assert_eq!(decoded.current.layers[0].cells[2], 'Q' as u32);
        assert_eq!(decoded.undo_limit, DEFAULT_HISTORY_LIMIT);
        assert!(decoded.undo.is_empty());
        assert!(decoded.redo.is_empty());
    }

    #[test]
    fn rejects_truncated_header() {
        let err = decode(b"U8PZ\x01\x00").unwrap_err();
        assert!(matches!(err, CodecError::TruncatedHeader { .. }));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut bytes = encode(&sample_project()).unwrap();
        bytes[4] = 9; // stomp the LE version field
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVersion { found: 9, .. }));
    }

    #[test]
    fn rejects_a_layer_with_mismatched_color_arrays() {
        let mut snap = sample_snapshot();
        snap.layers[0].fg.pop();
        let mut cbor = Vec::new();
        ciborium::into_writer(&snap, &mut cbor).unwrap();

        let err = decode(&cbor).unwrap_err();
        assert!(matches!(err, CodecError::LayerSizeMismatch { layer: 0, .. }));
    }

    #[test]
    fn backfills_a_missing_attrs_array_instead_of_erroring() {
        let mut snap = sample_snapshot();
        snap.layers[0].attrs.clear();
        let mut cbor = Vec::new();
        ciborium::into_writer(&snap, &mut cbor).unwrap();

        let decoded = decode(&cbor).unwrap();
        assert_eq!(decoded.current.layers[0].attrs.len(), decoded.current.layers[0].cells.len());
    }
}
