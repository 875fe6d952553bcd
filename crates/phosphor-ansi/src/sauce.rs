//! SAUCE metadata trailer detection (the 128-byte record some ANSI art files
//! append after EOF to record intended dimensions).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SauceInfo {
    pub columns: u16,
    /// `0` means the record didn't specify a usable row count.
    pub rows: u16,
}

const RECORD_LEN: usize = 128;

/// Look for a trailing SAUCE record and pull out its column/row hints.
/// Returns `None` if the file is too short or the record's magic doesn't
/// match — SAUCE is purely advisory, so callers treat absence as "no hint".
pub fn parse(bytes: &[u8]) -> Option<SauceInfo> {
    if bytes.len() < RECORD_LEN {
        return None;
    }
    let off = bytes.len() - RECORD_LEN;
    if &bytes[off..off + 5] != b"SAUCE" {
        return None;
    }

    let u16le = |field_off: usize| -> u16 { u16::from_le_bytes([bytes[off + field_off], bytes[off + field_off + 1]]) };

    // TInfo1 (offset 92) and TInfo2 (offset 94) hold columns/rows for ANSI files.
    let cols = u16le(92);
    let rows = u16le(94);
    if cols == 0 || cols > 4096 {
        return None;
    }
    Some(SauceInfo {
        columns: cols,
        rows: if rows > 0 && rows <= 16384 { rows } else { 0 },
    })
}
