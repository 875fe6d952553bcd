//! A single rectangular plane of cells.

use phosphor_palette::ColorIndex;
use serde::{Deserialize, Serialize};

use crate::cell::{Attrs, BLANK_CODEPOINT};

/// One full-canvas plane: a name, a visibility flag, and four parallel
/// arrays (codepoint, fg, bg, attrs) all sharing `rows * columns` length,
/// indexed `row * columns + col`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub cells: Vec<u32>,
    pub fg: Vec<u16>,
    pub bg: Vec<u16>,
    #[serde(default = "default_attrs_vec")]
    pub attrs: Vec<u8>,
}

fn default_attrs_vec() -> Vec<u8> {
    Vec::new()
}

impl Layer {
    /// Build a blank layer of the given dimensions: all cells U+0020, both
    /// colors *unset*, attrs cleared.
    pub fn blank(name: impl Into<String>, columns: u16, rows: u16) -> Self {
        let count = columns as usize * rows as usize;
        Self {
            name: name.into(),
            visible: true,
            cells: vec![BLANK_CODEPOINT; count],
            fg: vec![ColorIndex::UNSET.0; count],
            bg: vec![ColorIndex::UNSET.0; count],
            attrs: vec![0u8; count],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Ensure `attrs` has caught up with `cells` in length (backward
    /// compatibility with project files that omitted it).
    pub(crate) fn backfill_attrs(&mut self) {
        if self.attrs.len() != self.cells.len() {
            self.attrs.resize(self.cells.len(), 0);
        }
    }

    pub fn invariants_hold(&self) -> bool {
        let n = self.cells.len();
        self.fg.len() == n && self.bg.len() == n && self.attrs.len() == n
    }

    pub fn get(&self, idx: usize) -> Option<(u32, ColorIndex, ColorIndex, Attrs)> {
        if idx >= self.cells.len() {
            return None;
        }
        Some((
            self.cells[idx],
            ColorIndex::new(self.fg[idx]),
            ColorIndex::new(self.bg[idx]),
            Attrs::from_bits_retain(self.attrs[idx]),
        ))
    }

    /// Resize to `new_columns x new_rows`, preserving cell contents within
    /// the intersection of the old and new rectangles. New cells are blank.
    pub fn resize(&mut self, old_columns: u16, old_rows: u16, new_columns: u16, new_rows: u16) {
        let new_count = new_columns as usize * new_rows as usize;
        let mut cells = vec![BLANK_CODEPOINT; new_count];
        let mut fg = vec![ColorIndex::UNSET.0; new_count];
        let mut bg = vec![ColorIndex::UNSET.0; new_count];
        let mut attrs = vec![0u8; new_count];

        let common_cols = old_columns.min(new_columns) as usize;
        let common_rows = old_rows.min(new_rows) as usize;
        for row in 0..common_rows {
            let old_base = row * old_columns as usize;
            let new_base = row * new_columns as usize;
            for col in 0..common_cols {
                let oi = old_base + col;
                let ni = new_base + col;
                if oi < self.cells.len() {
                    cells[ni] = self.cells[oi];
                    fg[ni] = self.fg[oi];
                    bg[ni] = self.bg[oi];
                    attrs[ni] = self.attrs[oi];
                }
            }
        }

        self.cells = cells;
        self.fg = fg;
        self.bg = bg;
        self.attrs = attrs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_layer_has_matching_array_lengths() {
        let l = Layer::blank("Base", 10, 4);
        assert!(l.invariants_hold());
        assert_eq!(l.len(), 40);
        assert_eq!(l.cells[0], BLANK_CODEPOINT);
        assert_eq!(l.fg[0], ColorIndex::UNSET.0);
    }

    #[test]
    fn resize_preserves_intersection() {
        let mut l = Layer::blank("Base", 4, 2);
        l.cells[0] = 'X' as u32; // (0,0)
        l.cells[5] = 'Y' as u32; // (1,1)
        l.resize(4, 2, 2, 2);
        assert_eq!(l.cells[0], 'X' as u32);
        assert_eq!(l.cells[3], 'Y' as u32); // (1,1) at new width 2 -> idx 1*2+1=3
        assert!(l.invariants_hold());
    }

    #[test]
    fn backfill_attrs_extends_short_vector() {
        let mut l = Layer::blank("Base", 2, 2);
        l.attrs = vec![1];
        l.backfill_attrs();
        assert_eq!(l.attrs.len(), 4);
        assert_eq!(l.attrs[0], 1);
        assert_eq!(l.attrs[1], 0);
    }
}
