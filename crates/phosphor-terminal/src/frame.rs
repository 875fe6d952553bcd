//! Composite-cell frame writer: walks a canvas's visible geometry and emits
//! the minimal crossterm SGR+text stream, skipping redraw entirely when the
//! canvas's revision counter hasn't moved since the last frame.

use std::io::Write;

use crossterm::{
    QueueableCommand,
    cursor::MoveTo,
    style::{Color, SetBackgroundColor, SetForegroundColor},
};
use phosphor_canvas::canvas::Canvas;
use phosphor_palette::registry::PaletteRegistry;
use phosphor_palette::{Color32, PaletteId};

/// Tracks the last-rendered revision so unchanged frames cost one syscall
/// check instead of a full repaint.
#[derive(Debug, Default)]
pub struct FrameCache {
    last_revision: Option<u64>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `canvas` to `out` if its revision changed since the last call,
    /// returning whether a repaint actually happened.
    pub fn render(&mut self, out: &mut impl Write, canvas: &Canvas, registry: &PaletteRegistry, palette: PaletteId) -> anyhow::Result<bool> {
        if self.last_revision == Some(canvas.revision()) {
            return Ok(false);
        }
        for row in 0..canvas.rows() {
            out.queue(MoveTo(0, row))?;
            let mut last_fg: Option<Color32> = None;
            let mut last_bg: Option<Color32> = None;
            for col in 0..canvas.columns() {
                let cell = canvas.composite_cell(col, row);
                let fg = phosphor_palette::quantize::index_to_color32(registry, palette, cell.fg);
                let bg = phosphor_palette::quantize::index_to_color32(registry, palette, cell.bg);
                if last_fg != Some(fg) {
                    out.queue(SetForegroundColor(to_crossterm_color(fg)))?;
                    last_fg = Some(fg);
                }
                if last_bg != Some(bg) {
                    out.queue(SetBackgroundColor(to_crossterm_color(bg)))?;
                    last_bg = Some(bg);
                }
                let ch = char::from_u32(cell.cp).unwrap_or(' ');
                write!(out, "{ch}")?;
            }
        }
        out.flush()?;
        self.last_revision = Some(canvas.revision());
        Ok(true)
    }
}

fn to_crossterm_color(c: Color32) -> Color {
    match c.unpack_rgb() {
        Some((r, g, b)) => Color::Rgb { r, g, b },
        None => Color::Reset,
    }
}
