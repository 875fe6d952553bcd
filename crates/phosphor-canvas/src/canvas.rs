//! The layered grid: geometry, cell access, and compositing.

use phosphor_palette::ColorIndex;
use serde::{Deserialize, Serialize};

use crate::cell::Attrs;
use crate::layer::Layer;

/// Result of compositing every visible layer down to one visible cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeCell {
    pub cp: u32,
    pub fg: ColorIndex,
    pub bg: ColorIndex,
    pub attrs: Attrs,
}

impl Default for CompositeCell {
    fn default() -> Self {
        Self {
            cp: crate::cell::BLANK_CODEPOINT,
            fg: ColorIndex::UNSET,
            bg: ColorIndex::UNSET,
            attrs: Attrs::empty(),
        }
    }
}

/// The document: fixed column count, layers of equal dimensions, one active
/// layer, one caret position, and a revision counter bumped on every mutation
/// (so renderers can cheaply detect "nothing changed since last frame").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canvas {
    pub(crate) columns: u16,
    pub(crate) rows: u16,
    pub(crate) layers: Vec<Layer>,
    pub(crate) active_layer: usize,
    pub(crate) caret_row: u16,
    pub(crate) caret_col: u16,
    #[serde(skip, default)]
    pub(crate) revision: u64,
}

impl Canvas {
    /// A fresh canvas with one layer named "Base", `columns` wide and one row tall.
    pub fn new(columns: u16) -> Self {
        let columns = columns.max(1);
        let base = Layer::blank("Base", columns, 1);
        Self {
            columns,
            rows: 1,
            layers: vec![base],
            active_layer: 0,
            caret_row: 0,
            caret_col: 0,
            revision: 0,
        }
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn active_layer_index(&self) -> usize {
        self.active_layer
    }

    pub fn caret(&self) -> (u16, u16) {
        (self.caret_col, self.caret_row)
    }

    fn cell_index(&self, row: u16, col: u16) -> usize {
        row as usize * self.columns as usize + col as usize
    }

    /// Grow every layer so `row` is addressable, filling new rows with blank
    /// cells. Columns never change once the canvas is created.
    pub fn ensure_rows(&mut self, row: u16) {
        let needed = row.saturating_add(1);
        if needed <= self.rows {
            return;
        }
        for layer in &mut self.layers {
            layer.resize(self.columns, self.rows, self.columns, needed);
        }
        self.rows = needed;
        self.revision += 1;
    }

    pub fn set_caret(&mut self, col: u16, row: u16) {
        let col = col.min(self.columns.saturating_sub(1));
        self.ensure_rows(row);
        self.caret_col = col;
        self.caret_row = row;
    }

    pub fn set_active_layer(&mut self, index: usize) -> bool {
        if index < self.layers.len() {
            self.active_layer = index;
            true
        } else {
            false
        }
    }

    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        let layer = Layer::blank(name, self.columns, self.rows);
        self.layers.push(layer);
        self.revision += 1;
        self.layers.len() - 1
    }

    /// Remove a layer by index, refusing to drop the last remaining one.
    /// The active index is clamped to stay in bounds afterward.
    pub fn remove_layer(&mut self, index: usize) -> bool {
        if self.layers.len() <= 1 || index >= self.layers.len() {
            return false;
        }
        self.layers.remove(index);
        if self.active_layer >= self.layers.len() {
            self.active_layer = self.layers.len() - 1;
        } else if self.active_layer > index {
            self.active_layer -= 1;
        }
        self.revision += 1;
        true
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.visible = visible;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.name = name.into();
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        if from >= self.layers.len() || to >= self.layers.len() || from == to {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        if self.active_layer == from {
            self.active_layer = to;
        } else if from < self.active_layer && self.active_layer <= to {
            self.active_layer -= 1;
        } else if to <= self.active_layer && self.active_layer < from {
            self.active_layer += 1;
        }
        self.revision += 1;
        true
    }

    /// Write a single cell into the active layer at `(col, row)`, growing the
    /// document to fit if needed.
    pub fn set_active_cell(
        &mut self,
        col: u16,
        row: u16,
        cp: u32,
        fg: ColorIndex,
        bg: ColorIndex,
        attrs: Attrs,
    ) {
        let col = col.min(self.columns.saturating_sub(1));
        self.ensure_rows(row);
        let idx = self.cell_index(row, col);
        let layer = &mut self.layers[self.active_layer];
        layer.cells[idx] = cp;
        layer.fg[idx] = fg.0;
        layer.bg[idx] = bg.0;
        layer.attrs[idx] = attrs.bits();
        self.revision += 1;
    }

    /// Two-pass top-down composite: the first visible non-space glyph (from
    /// the topmost layer down) supplies codepoint, fg, and attrs; the first
    /// visible non-unset background supplies bg. The two scans are
    /// independent, so a lower, bg-only layer can tint a cell whose glyph
    /// comes from a layer above it.
    pub fn composite_cell(&self, col: u16, row: u16) -> CompositeCell {
        let mut out = CompositeCell::default();
        if col >= self.columns || row >= self.rows || self.layers.is_empty() {
            return out;
        }
        let idx = self.cell_index(row, col);

        for layer in self.layers.iter().rev() {
            if !layer.visible || idx >= layer.bg.len() {
                continue;
            }
            let bg = ColorIndex::new(layer.bg[idx]);
            if !bg.is_unset() {
                out.bg = bg;
                break;
            }
        }

        for layer in self.layers.iter().rev() {
            if !layer.visible || idx >= layer.cells.len() {
                continue;
            }
            let cp = layer.cells[idx];
            if cp == crate::cell::BLANK_CODEPOINT {
                continue;
            }
            out.cp = cp;
            out.fg = ColorIndex::new(layer.fg[idx]);
            out.attrs = Attrs::from_bits_retain(layer.attrs[idx]);
            break;
        }

        out
    }

    /// Read a cell from an arbitrary layer without going through active-layer
    /// routing. Used by the script host, which addresses layers by index.
    pub fn layer_cell(&self, layer_index: usize, col: u16, row: u16) -> Option<(u32, ColorIndex, ColorIndex, Attrs)> {
        let layer = self.layers.get(layer_index)?;
        if col >= self.columns || row >= self.rows {
            return None;
        }
        layer.get(self.cell_index(row, col))
    }

    /// Write a cell into an arbitrary layer, clipping out-of-bounds
    /// coordinates to a no-op instead of growing the canvas. Unlike
    /// [`Canvas::set_active_cell`] this does not bump `revision`; callers
    /// that perform many of these in one tick should call
    /// [`Canvas::bump_revision`] once when done.
    pub fn set_layer_cell(&mut self, layer_index: usize, col: u16, row: u16, cp: u32, fg: ColorIndex, bg: ColorIndex, attrs: Attrs) -> bool {
        if col >= self.columns || row >= self.rows {
            return false;
        }
        let idx = self.cell_index(row, col);
        match self.layers.get_mut(layer_index) {
            Some(layer) if idx < layer.len() => {
                layer.cells[idx] = cp;
                layer.fg[idx] = fg.0;
                layer.bg[idx] = bg.0;
                layer.attrs[idx] = attrs.bits();
                true
            }
            _ => false,
        }
    }

    /// Reset every cell of a layer to `cp` with both colors unset. Used by
    /// scripts that clear their target layer before drawing a fresh frame.
    pub fn clear_layer(&mut self, layer_index: usize, cp: u32) -> bool {
        match self.layers.get_mut(layer_index) {
            Some(layer) => {
                layer.cells.fill(cp);
                layer.fg.fill(ColorIndex::UNSET.0);
                layer.bg.fill(ColorIndex::UNSET.0);
                layer.attrs.fill(0);
                true
            }
            None => false,
        }
    }

    /// Write codepoints across one row starting at column 0, clipping at the
    /// right edge. Colors and attrs of overwritten cells are left unset.
    pub fn set_layer_row(&mut self, layer_index: usize, row: u16, text: impl Iterator<Item = char>) -> bool {
        if row >= self.rows {
            return false;
        }
        if !self.layers.get(layer_index).is_some() {
            return false;
        }
        for (col, ch) in (0..self.columns).zip(text) {
            let idx = self.cell_index(row, col);
            let layer = &mut self.layers[layer_index];
            layer.cells[idx] = ch as u32;
            layer.fg[idx] = ColorIndex::UNSET.0;
            layer.bg[idx] = ColorIndex::UNSET.0;
            layer.attrs[idx] = 0;
        }
        true
    }

    /// Bump the revision counter once. Used after a batch of per-cell writes
    /// that skipped their own bump (see [`Canvas::set_layer_cell`]).
    pub fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// Re-establish structural invariants after deserializing or applying an
    /// undo snapshot: every layer's arrays must match `columns * rows`, and
    /// the active index and caret must be in bounds.
    pub(crate) fn normalize(&mut self) {
        if self.columns == 0 {
            self.columns = 80;
        }
        if self.rows == 0 {
            self.rows = 1;
        }
        if self.layers.is_empty() {
            self.layers.push(Layer::blank("Base", self.columns, self.rows));
        }
        for layer in &mut self.layers {
            layer.backfill_attrs();
            if layer.len() != self.columns as usize * self.rows as usize {
                layer.resize(self.columns, self.rows, self.columns, self.rows);
            }
        }
        if self.active_layer >= self.layers.len() {
            self.active_layer = self.layers.len() - 1;
        }
        self.caret_col = self.caret_col.min(self.columns.saturating_sub(1));
        self.caret_row = self.caret_row.min(self.rows.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_prefers_topmost_nonspace_glyph() {
        let mut c = Canvas::new(4);
        c.add_layer("Over");
        c.set_active_layer(0);
        c.set_active_cell(0, 0, 'A' as u32, ColorIndex::new(1), ColorIndex::UNSET, Attrs::empty());
        c.set_active_layer(1);
        c.set_active_cell(0, 0, 'B' as u32, ColorIndex::new(2), ColorIndex::UNSET, Attrs::empty());

        let cell = c.composite_cell(0, 0);
        assert_eq!(cell.cp, 'B' as u32);
        assert_eq!(cell.fg, ColorIndex::new(2));
    }

    #[test]
    fn composite_bg_and_glyph_scans_are_independent() {
        let mut c = Canvas::new(4);
        c.add_layer("Over");
        c.set_active_layer(0);
        c.set_active_cell(0, 0, ' ' as u32, ColorIndex::UNSET, ColorIndex::new(5), Attrs::empty());
        c.set_active_layer(1);
        // Blank glyph on top layer must not hide the lower layer's glyph...
        c.set_active_cell(0, 0, 'X' as u32, ColorIndex::new(9), ColorIndex::UNSET, Attrs::empty());

        let cell = c.composite_cell(0, 0);
        assert_eq!(cell.cp, 'X' as u32);
        assert_eq!(cell.fg, ColorIndex::new(9));
        // bg comes from the bottom layer since the top layer left it unset.
        assert_eq!(cell.bg, ColorIndex::new(5));
    }

    #[test]
    fn hidden_layer_is_skipped_by_compositing() {
        let mut c = Canvas::new(4);
        c.add_layer("Over");
        c.set_active_layer(1);
        c.set_active_cell(0, 0, 'X' as u32, ColorIndex::new(1), ColorIndex::UNSET, Attrs::empty());
        c.layers[1].visible = false;

        let cell = c.composite_cell(0, 0);
        assert_eq!(cell.cp, crate::cell::BLANK_CODEPOINT);
    }

    #[test]
    fn remove_layer_refuses_to_drop_the_last_one() {
        let mut c = Canvas::new(4);
        assert!(!c.remove_layer(0));
        assert_eq!(c.layers().len(), 1);
    }

    #[test]
    fn set_active_cell_grows_rows_and_bumps_revision() {
        let mut c = Canvas::new(4);
        let rev = c.revision();
        c.set_active_cell(0, 5, 'Z' as u32, ColorIndex::UNSET, ColorIndex::UNSET, Attrs::empty());
        assert_eq!(c.rows(), 6);
        assert!(c.revision() > rev);
    }

    #[test]
    fn set_layer_cell_clips_instead_of_growing() {
        let mut c = Canvas::new(4);
        assert!(!c.set_layer_cell(0, 0, 9, 'Z' as u32, ColorIndex::UNSET, ColorIndex::UNSET, Attrs::empty()));
        assert_eq!(c.rows(), 1);
        assert!(c.set_layer_cell(0, 1, 0, 'Z' as u32, ColorIndex::new(3), ColorIndex::UNSET, Attrs::empty()));
        assert_eq!(c.layer(0).unwrap().cells[1], 'Z' as u32);
    }

    #[test]
    fn set_layer_row_clips_at_the_right_edge() {
        let mut c = Canvas::new(4);
        assert!(c.set_layer_row(0, 0, "hello".chars()));
        assert_eq!(c.layer(0).unwrap().cells, vec!['h' as u32, 'e' as u32, 'l' as u32, 'l' as u32]);
    }

    #[test]
    fn move_layer_keeps_active_layer_pointed_at_the_same_layer() {
        let mut c = Canvas::new(4);
        c.add_layer("Middle");
        c.add_layer("Top");
        c.set_active_layer(2);
        assert!(c.move_layer(2, 0));
        assert_eq!(c.active_layer_index(), 0);
        assert_eq!(c.layers()[0].name, "Top");
    }

    #[test]
    fn rename_layer_bumps_revision() {
        let mut c = Canvas::new(4);
        let rev = c.revision();
        assert!(c.rename_layer(0, "Sketch"));
        assert_eq!(c.layer(0).unwrap().name, "Sketch");
        assert!(c.revision() > rev);
        assert!(!c.rename_layer(5, "Nope"));
    }
}
