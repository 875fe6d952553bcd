//! Process-wide palette registry.
//!
//! Replaces the source's static-lifetime palette singletons with an explicit
//! registry value that callers pass around. Two built-ins are always present
//! (`Xterm256`, `Ansi16`); additional palettes can be registered at runtime
//! and are addressed by a stable numeric UID, never by pointer or index.

use std::collections::HashMap;

use crate::Rgb8;

/// Identifies a built-in palette table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinPalette {
    Xterm256,
    Ansi16,
}

/// Stable identity for any palette known to a [`PaletteRegistry`]: either a
/// built-in table or a numeric UID assigned at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteId {
    Builtin(BuiltinPalette),
    Custom(u32),
}

impl PaletteId {
    pub const XTERM256: PaletteId = PaletteId::Builtin(BuiltinPalette::Xterm256);
    pub const ANSI16: PaletteId = PaletteId::Builtin(BuiltinPalette::Ansi16);

    /// A compact key suitable for use in cache lookups.
    pub(crate) fn cache_key(self) -> u64 {
        match self {
            PaletteId::Builtin(BuiltinPalette::Xterm256) => 0,
            PaletteId::Builtin(BuiltinPalette::Ansi16) => 1,
            PaletteId::Custom(uid) => 0x1_0000_0000 | uid as u64,
        }
    }
}

struct PaletteEntry {
    rgb: Vec<Rgb8>,
    /// Exact 24-bit RGB to index fast path, populated from `rgb` at registration.
    exact: HashMap<u32, u8>,
}

fn build_exact(rgb: &[Rgb8]) -> HashMap<u32, u8> {
    let mut map = HashMap::with_capacity(rgb.len());
    for (i, c) in rgb.iter().enumerate() {
        if i > u8::MAX as usize {
            break;
        }
        map.entry(c.as_u24()).or_insert(i as u8);
    }
    map
}

pub struct PaletteRegistry {
    xterm256: PaletteEntry,
    ansi16: PaletteEntry,
    custom: HashMap<u32, PaletteEntry>,
    next_uid: u32,
}

impl Default for PaletteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteRegistry {
    pub fn new() -> Self {
        let xterm_rgb = crate::xterm256::build().to_vec();
        let ansi_rgb = crate::ansi16::build().to_vec();
        Self {
            xterm256: PaletteEntry {
                exact: build_exact(&xterm_rgb),
                rgb: xterm_rgb,
            },
            ansi16: PaletteEntry {
                exact: build_exact(&ansi_rgb),
                rgb: ansi_rgb,
            },
            custom: HashMap::new(),
            next_uid: 1,
        }
    }

    /// Register a custom palette (at most 256 entries) and return its UID.
    pub fn register(&mut self, rgb: Vec<Rgb8>) -> PaletteId {
        let uid = self.next_uid;
        self.next_uid += 1;
        let entry = PaletteEntry {
            exact: build_exact(&rgb),
            rgb,
        };
        self.custom.insert(uid, entry);
        PaletteId::Custom(uid)
    }

    fn entry(&self, id: PaletteId) -> Option<&PaletteEntry> {
        match id {
            PaletteId::Builtin(BuiltinPalette::Xterm256) => Some(&self.xterm256),
            PaletteId::Builtin(BuiltinPalette::Ansi16) => Some(&self.ansi16),
            PaletteId::Custom(uid) => self.custom.get(&uid),
        }
    }

    pub fn rgb_table(&self, id: PaletteId) -> Option<&[Rgb8]> {
        self.entry(id).map(|e| e.rgb.as_slice())
    }

    pub fn rgb_at(&self, id: PaletteId, index: u8) -> Option<Rgb8> {
        self.entry(id).and_then(|e| e.rgb.get(index as usize).copied())
    }

    pub(crate) fn exact_match(&self, id: PaletteId, u24: u32) -> Option<u8> {
        self.entry(id).and_then(|e| e.exact.get(&u24).copied())
    }

    pub fn is_xterm256(&self, id: PaletteId) -> bool {
        matches!(id, PaletteId::Builtin(BuiltinPalette::Xterm256))
    }
}
