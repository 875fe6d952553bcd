//! The `layer` handle scripts receive each tick.
//!
//! A tick copies its target layer into an owned [`LayerBuffer`], runs the
//! script against that buffer, then copies the result back into the canvas.
//! This keeps the Lua userdata `'static` (so it needs no borrow-scoping
//! machinery) while still giving the handle tick-scoped identity: the
//! `Rc<RefCell<_>>` a script stashed in a global is simply a handle to a
//! buffer nothing reads back after the tick ends.

use std::cell::RefCell;
use std::rc::Rc;

use phosphor_canvas::{Attrs, Canvas, BLANK_CODEPOINT};
use phosphor_palette::ColorIndex;

#[derive(Debug, Clone)]
pub struct LayerBuffer {
    pub columns: u16,
    pub rows: u16,
    pub cells: Vec<u32>,
    pub fg: Vec<u16>,
    pub bg: Vec<u16>,
    pub attrs: Vec<u8>,
    /// Cells actually written by `set`/`set_row`/`clear` since this buffer
    /// was built. `write_back` only copies these back, so cells a script
    /// never touches keep whatever the canvas already had there.
    touched: Vec<bool>,
}

impl LayerBuffer {
    pub fn from_canvas_layer(canvas: &Canvas, layer_index: usize) -> Option<Self> {
        let layer = canvas.layer(layer_index)?;
        let len = layer.cells.len();
        Some(Self {
            columns: canvas.columns(),
            rows: canvas.rows(),
            cells: layer.cells.clone(),
            fg: layer.fg.clone(),
            bg: layer.bg.clone(),
            attrs: layer.attrs.clone(),
            touched: vec![false; len],
        })
    }

    fn idx(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as u16 >= self.columns || y as u16 >= self.rows {
            return None;
        }
        Some(y as usize * self.columns as usize + x as usize)
    }

    pub fn set(&mut self, x: i64, y: i64, cp: u32, fg: Option<u16>, bg: Option<u16>) {
        let Some(idx) = self.idx(x, y) else { return };
        self.cells[idx] = cp;
        if let Some(fg) = fg {
            self.fg[idx] = fg;
        }
        if let Some(bg) = bg {
            self.bg[idx] = bg;
        }
        self.touched[idx] = true;
    }

    pub fn get(&self, x: i64, y: i64) -> Option<(u32, ColorIndex, ColorIndex)> {
        let idx = self.idx(x, y)?;
        Some((self.cells[idx], ColorIndex::new(self.fg[idx]), ColorIndex::new(self.bg[idx])))
    }

    pub fn clear(&mut self, cp: u32) {
        self.cells.fill(cp);
        self.fg.fill(ColorIndex::UNSET.0);
        self.bg.fill(ColorIndex::UNSET.0);
        self.attrs.fill(Attrs::empty().bits());
        self.touched.fill(true);
    }

    pub fn set_row(&mut self, y: i64, text: &str) {
        if y < 0 || y as u16 >= self.rows {
            return;
        }
        for (col, ch) in (0..self.columns).zip(text.chars()) {
            let idx = y as usize * self.columns as usize + col as usize;
            self.cells[idx] = ch as u32;
            self.touched[idx] = true;
        }
    }

    /// Copy this buffer back into the canvas layer it was built from,
    /// clipping nothing since dimensions are unchanged. Only cells touched
    /// by `set`/`set_row`/`clear` are written; untouched cells are left
    /// alone regardless of their final value. Bumps the canvas revision
    /// exactly once.
    pub fn write_back(&self, canvas: &mut Canvas, layer_index: usize) {
        for row in 0..self.rows {
            for col in 0..self.columns {
                let idx = row as usize * self.columns as usize + col as usize;
                if !self.touched[idx] {
                    continue;
                }
                canvas.set_layer_cell(
                    layer_index,
                    col,
                    row,
                    self.cells[idx],
                    ColorIndex::new(self.fg[idx]),
                    ColorIndex::new(self.bg[idx]),
                    Attrs::from_bits_retain(self.attrs[idx]),
                );
            }
        }
        canvas.bump_revision();
    }
}

/// The Lua-visible handle: `layer:set(...)`, `layer:get(...)`,
/// `layer:clear(...)`, `layer:set_row(...)`.
#[derive(Clone)]
pub struct LayerHandle(pub Rc<RefCell<LayerBuffer>>);

impl mlua::UserData for LayerHandle {
    fn add_methods<M: mlua::UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method(
            "set",
            |_, this, (x, y, cp, fg, bg): (i64, i64, mlua::Value, Option<i64>, Option<i64>)| {
                let Some(cp) = value_to_codepoint(&cp) else {
                    return Ok(());
                };
                this.0.borrow_mut().set(x, y, cp, fg.map(|v| v as u16), bg.map(|v| v as u16));
                Ok(())
            },
        );

        methods.add_method("get", |_, this, (x, y): (i64, i64)| {
            match this.0.borrow().get(x, y) {
                Some((cp, fg, bg)) => {
                    let ch = char::from_u32(cp).unwrap_or(' ').to_string();
                    let fg = if fg.is_unset() { None } else { Some(fg.0 as i64) };
                    let bg = if bg.is_unset() { None } else { Some(bg.0 as i64) };
                    Ok((ch, fg, bg))
                }
                None => Ok((String::new(), None, None)),
            }
        });

        methods.add_method("clear", |_, this, cp: Option<mlua::Value>| {
            let cp = cp.as_ref().and_then(value_to_codepoint).unwrap_or(BLANK_CODEPOINT);
            this.0.borrow_mut().clear(cp);
            Ok(())
        });

        methods.add_method("set_row", |_, this, (y, text): (i64, String)| {
            this.0.borrow_mut().set_row(y, &text);
            Ok(())
        });
    }
}

fn value_to_codepoint(value: &mlua::Value) -> Option<u32> {
    match value {
        mlua::Value::Integer(i) => char::from_u32(*i as u32).map(|_| *i as u32),
        mlua::Value::Number(n) => char::from_u32(*n as u32).map(|_| *n as u32),
        mlua::Value::String(s) => s.to_str().ok()?.chars().next().map(|c| c as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf() -> LayerBuffer {
        LayerBuffer {
            columns: 4,
            rows: 2,
            cells: vec![BLANK_CODEPOINT; 8],
            fg: vec![ColorIndex::UNSET.0; 8],
            bg: vec![ColorIndex::UNSET.0; 8],
            attrs: vec![0; 8],
            touched: vec![false; 8],
        }
    }

    #[test]
    fn set_and_get_round_trip_inside_bounds() {
        let mut b = buf();
        b.set(1, 0, 'X' as u32, Some(3), None);
        let (cp, fg, bg) = b.get(1, 0).unwrap();
        assert_eq!(cp, 'X' as u32);
        assert_eq!(fg, ColorIndex::new(3));
        assert!(bg.is_unset());
    }

    #[test]
    fn out_of_bounds_coordinates_are_clipped_to_a_no_op() {
        let mut b = buf();
        b.set(99, 99, 'X' as u32, None, None);
        assert!(b.get(99, 99).is_none());
    }

    #[test]
    fn set_row_writes_across_columns_and_clips() {
        let mut b = buf();
        b.set_row(1, "toolong");
        assert_eq!(b.cells[4], 't' as u32);
        assert_eq!(b.cells[7], 'l' as u32);
    }

    #[test]
    fn write_back_skips_untouched_cells_but_bumps_revision_once() {
        let mut canvas = Canvas::new(4);
        canvas.ensure_rows(1);
        let mut b = LayerBuffer::from_canvas_layer(&canvas, 0).unwrap();
        b.set(0, 0, 'Z' as u32, None, None);
        let rev = canvas.revision();
        b.write_back(&mut canvas, 0);
        assert_eq!(canvas.layer(0).unwrap().cells[0], 'Z' as u32);
        assert!(canvas.revision() > rev);
    }

    #[test]
    fn clear_then_write_back_erases_preexisting_content() {
        let mut canvas = Canvas::new(4);
        canvas.ensure_rows(1);
        canvas.set_active_cell(1, 0, 'Q' as u32, ColorIndex::new(2), ColorIndex::UNSET, Attrs::empty());

        let mut b = LayerBuffer::from_canvas_layer(&canvas, 0).unwrap();
        b.clear(BLANK_CODEPOINT);
        b.write_back(&mut canvas, 0);

        assert_eq!(canvas.layer(0).unwrap().cells[1], BLANK_CODEPOINT);
    }
}
