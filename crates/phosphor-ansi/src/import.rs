//! The CSI (`ESC [`) state machine that turns a byte stream into a
//! single-layer canvas snapshot.

use phosphor_canvas::{Attrs, BLANK_CODEPOINT};
use phosphor_canvas::{CanvasSnapshot, Layer};
use phosphor_palette::quantize::color32_to_index;
use phosphor_palette::{Color32, PaletteId, PaletteRegistry, QuantizePolicy, Rgb8};
use tracing::debug;

use crate::encoding;
use crate::options::{Options, WrapPolicy};
use crate::sauce;

const LF: u8 = b'\n';
const CR: u8 = b'\r';
const TAB: u8 = b'\t';
const SUB: u8 = 26;
const ESC: u8 = 27;
const SEQ_MAX_LEN: usize = 64;

fn clamp_columns(columns: i32) -> u16 {
    columns.clamp(1, 4096) as u16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorMode {
    Palette16,
    Xterm256,
    TrueColor,
}

fn color_from_ansi16(registry: &PaletteRegistry, idx: i32) -> Color32 {
    let idx = idx.clamp(0, 15) as u8;
    match registry.rgb_at(PaletteId::XTERM256, idx) {
        Some(Rgb8 { r, g, b }) => Color32::opaque(r, g, b),
        None => Color32::UNSET,
    }
}

#[derive(Debug, Clone, Copy)]
struct Pen {
    bold: bool,
    blink: bool,
    invert: bool,
    fg_mode: ColorMode,
    bg_mode: ColorMode,
    fg_idx: i32,
    bg_idx: i32,
    fg: Color32,
    bg: Color32,
    attrs: Attrs,
}

impl Pen {
    fn defaults(opt: &Options, registry: &PaletteRegistry) -> Self {
        let fg = if opt.default_fg.is_unset() {
            color_from_ansi16(registry, 7)
        } else {
            opt.default_fg
        };
        let bg = if opt.default_bg_unset {
            Color32::UNSET
        } else if opt.default_bg.is_unset() {
            color_from_ansi16(registry, 0)
        } else {
            opt.default_bg
        };
        Self {
            bold: false,
            blink: false,
            invert: false,
            fg_mode: ColorMode::Palette16,
            bg_mode: ColorMode::Palette16,
            fg_idx: 7,
            bg_idx: 0,
            fg,
            bg,
            attrs: Attrs::empty(),
        }
    }
}

/// Split a CSI parameter string (`"1;31"`) into its integer fields. Missing
/// fields and a bare trailing `;` both yield `0`, matching the wire format's
/// common "omitted means default" convention.
fn parse_params(s: &str) -> Vec<i64> {
    let mut out = Vec::new();
    let mut cur: i64 = 0;
    let mut have = false;
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            have = true;
            cur = cur * 10 + (ch as u8 - b'0') as i64;
        } else if ch == ';' {
            out.push(if have { cur } else { 0 });
            cur = 0;
            have = false;
        }
    }
    out.push(if have { cur } else { 0 });
    out
}

fn param(params: &[i64], idx: usize, default: i64) -> i64 {
    params.get(idx).copied().unwrap_or(default)
}

struct Doc {
    columns: u16,
    cells: Vec<u32>,
    fg: Vec<u16>,
    bg: Vec<u16>,
    attrs: Vec<u8>,
}

impl Doc {
    fn new(columns: u16) -> Self {
        let mut d = Self {
            columns,
            cells: Vec::new(),
            fg: Vec::new(),
            bg: Vec::new(),
            attrs: Vec::new(),
        };
        d.ensure_rows(1);
        d
    }

    fn ensure_rows(&mut self, rows_needed: u16) {
        let rows_needed = rows_needed.max(1);
        let need = rows_needed as usize * self.columns as usize;
        if self.cells.len() < need {
            self.cells.resize(need, BLANK_CODEPOINT);
            self.fg.resize(need, phosphor_palette::ColorIndex::UNSET.0);
            self.bg.resize(need, phosphor_palette::ColorIndex::UNSET.0);
            self.attrs.resize(need, 0);
        }
    }

    fn idx_of(&self, row: i32, col: i32) -> usize {
        let row = row.max(0);
        let col = col.clamp(0, self.columns as i32 - 1);
        row as usize * self.columns as usize + col as usize
    }
}

struct Importer<'a> {
    opt: &'a Options,
    registry: PaletteRegistry,
    doc: Doc,
    pen: Pen,
    row: i32,
    col: i32,
    row_max: i32,
    saved_row: i32,
    saved_col: i32,
}

impl<'a> Importer<'a> {
    fn new(opt: &'a Options, columns: u16) -> Self {
        let registry = PaletteRegistry::new();
        let pen = Pen::defaults(opt, &registry);
        Self {
            opt,
            doc: Doc::new(columns),
            registry,
            pen,
            row: 0,
            col: 0,
            row_max: 0,
            saved_row: 0,
            saved_col: 0,
        }
    }

    fn to_index(&self, c: Color32) -> u16 {
        color32_to_index(&self.registry, PaletteId::XTERM256, c, QuantizePolicy::default()).0
    }

    /// Write one glyph at the caret, applying the libansilove
    /// invert-at-put-time rule. At the right edge, either wraps to column 0
    /// of the next row (`WrapPolicy::Eager`) or stays put, overwriting the
    /// last column (`WrapPolicy::PutOnly`).
    fn put(&mut self, cp: char) {
        if self.col == self.doc.columns as i32 {
            match self.opt.wrap_policy {
                WrapPolicy::Eager => {
                    self.row += 1;
                    self.col = 0;
                }
                WrapPolicy::PutOnly => {
                    self.col = self.doc.columns as i32 - 1;
                }
            }
        }
        self.row = self.row.max(0);
        self.col = self.col.clamp(0, self.doc.columns as i32 - 1);

        self.doc.ensure_rows((self.row + 1) as u16);
        let at = self.doc.idx_of(self.row, self.col);

        let (out_fg, out_bg) = if self.pen.invert {
            if self.pen.fg_mode == ColorMode::Palette16 && self.pen.bg_mode == ColorMode::Palette16 {
                let fg_idx = self.pen.fg_idx.clamp(0, 15);
                let bg_idx = self.pen.bg_idx.clamp(0, 15);
                let inv_bg = fg_idx % 8;
                let inv_fg = bg_idx + (fg_idx & 8);
                (color_from_ansi16(&self.registry, inv_fg), color_from_ansi16(&self.registry, inv_bg))
            } else {
                (self.pen.bg, self.pen.fg)
            }
        } else {
            (self.pen.fg, self.pen.bg)
        };

        self.doc.cells[at] = cp as u32;
        self.doc.fg[at] = self.to_index(out_fg);
        self.doc.bg[at] = self.to_index(out_bg);
        self.doc.attrs[at] = self.pen.attrs.bits();

        self.row_max = self.row_max.max(self.row);
        self.col += 1;
    }

    fn apply_sgr(&mut self, params: &[i64]) {
        let params: Vec<i64> = if params.is_empty() { vec![0] } else { params.to_vec() };
        let mut k = 0usize;
        while k < params.len() {
            let code = params[k];
            match code {
                0 => self.pen = Pen::defaults(self.opt, &self.registry),
                1 => {
                    if self.pen.fg_mode == ColorMode::Palette16 && (0..8).contains(&self.pen.fg_idx) {
                        self.pen.fg_idx += 8;
                        self.pen.fg = color_from_ansi16(&self.registry, self.pen.fg_idx);
                    }
                    self.pen.bold = true;
                    self.pen.attrs.insert(Attrs::BOLD);
                }
                2 => self.pen.attrs.insert(Attrs::DIM),
                3 => self.pen.attrs.insert(Attrs::ITALIC),
                4 => self.pen.attrs.insert(Attrs::UNDERLINE),
                5 => {
                    if self.opt.icecolors && self.pen.bg_mode == ColorMode::Palette16 && (0..8).contains(&self.pen.bg_idx) {
                        self.pen.bg_idx += 8;
                        self.pen.bg = color_from_ansi16(&self.registry, self.pen.bg_idx);
                    }
                    self.pen.blink = true;
                    self.pen.attrs.insert(Attrs::BLINK);
                }
                7 => {
                    self.pen.invert = true;
                    self.pen.attrs.insert(Attrs::REVERSE);
                }
                9 => self.pen.attrs.insert(Attrs::STRIKETHROUGH),
                22 => {
                    self.pen.bold = false;
                    self.pen.attrs.remove(Attrs::BOLD);
                }
                23 => self.pen.attrs.remove(Attrs::ITALIC),
                24 => self.pen.attrs.remove(Attrs::UNDERLINE),
                25 => {
                    self.pen.blink = false;
                    self.pen.attrs.remove(Attrs::BLINK);
                }
                27 => {
                    self.pen.invert = false;
                    self.pen.attrs.remove(Attrs::REVERSE);
                }
                29 => self.pen.attrs.remove(Attrs::STRIKETHROUGH),
                39 => {
                    self.pen.fg_mode = ColorMode::Palette16;
                    self.pen.fg_idx = 7;
                    self.pen.fg = if self.opt.default_fg.is_unset() {
                        color_from_ansi16(&self.registry, 7)
                    } else {
                        self.opt.default_fg
                    };
                }
                49 => {
                    self.pen.bg_mode = ColorMode::Palette16;
                    self.pen.bg_idx = 0;
                    self.pen.bg = if self.opt.default_bg_unset {
                        Color32::UNSET
                    } else if self.opt.default_bg.is_unset() {
                        color_from_ansi16(&self.registry, 0)
                    } else {
                        self.opt.default_bg
                    };
                }
                30..=37 => {
                    self.pen.fg_mode = ColorMode::Palette16;
                    self.pen.fg_idx = (code - 30) as i32 + if self.pen.bold { 8 } else { 0 };
                    self.pen.fg = color_from_ansi16(&self.registry, self.pen.fg_idx);
                }
                90..=97 => {
                    self.pen.fg_mode = ColorMode::Palette16;
                    self.pen.fg_idx = (code - 90) as i32 + 8;
                    self.pen.fg = color_from_ansi16(&self.registry, self.pen.fg_idx);
                }
                40..=47 => {
                    self.pen.bg_mode = ColorMode::Palette16;
                    self.pen.bg_idx = (code - 40) as i32 + if self.pen.blink && self.opt.icecolors { 8 } else { 0 };
                    self.pen.bg = color_from_ansi16(&self.registry, self.pen.bg_idx);
                }
                100..=107 => {
                    self.pen.bg_mode = ColorMode::Palette16;
                    self.pen.bg_idx = (code - 100) as i32 + 8;
                    self.pen.bg = color_from_ansi16(&self.registry, self.pen.bg_idx);
                }
                38 | 48 => {
                    let is_fg = code == 38;
                    let mode = param(&params, k + 1, -1);
                    if mode == 5 {
                        let idx = param(&params, k + 2, -1);
                        if (0..=255).contains(&idx) {
                            let rgb = self.registry.rgb_at(PaletteId::XTERM256, idx as u8).unwrap();
                            let col32 = Color32::opaque(rgb.r, rgb.g, rgb.b);
                            if is_fg {
                                self.pen.fg_mode = ColorMode::Xterm256;
                                self.pen.fg_idx = idx as i32;
                                self.pen.fg = col32;
                            } else {
                                self.pen.bg_mode = ColorMode::Xterm256;
                                self.pen.bg_idx = idx as i32;
                                self.pen.bg = col32;
                            }
                        }
                        k += 2;
                    } else if mode == 2 {
                        let r = param(&params, k + 2, -1);
                        let g = param(&params, k + 3, -1);
                        let b = param(&params, k + 4, -1);
                        if r >= 0 && g >= 0 && b >= 0 {
                            let col32 = Color32::opaque(r.clamp(0, 255) as u8, g.clamp(0, 255) as u8, b.clamp(0, 255) as u8);
                            if is_fg {
                                self.pen.fg_mode = ColorMode::TrueColor;
                                self.pen.fg = col32;
                            } else {
                                self.pen.bg_mode = ColorMode::TrueColor;
                                self.pen.bg = col32;
                            }
                        }
                        k += 4;
                    }
                }
                _ => {}
            }
            k += 1;
        }
    }

    fn apply_pablodraw_truecolor(&mut self, params: &[i64]) {
        if params.len() < 4 {
            return;
        }
        let which = params[0];
        let r = params[1].clamp(0, 255) as u8;
        let g = params[2].clamp(0, 255) as u8;
        let b = params[3].clamp(0, 255) as u8;
        let col32 = Color32::opaque(r, g, b);
        if which == 0 {
            self.pen.bg_mode = ColorMode::TrueColor;
            self.pen.bg = col32;
        } else if which == 1 {
            self.pen.fg_mode = ColorMode::TrueColor;
            self.pen.fg = col32;
        }
    }

    fn erase_display(&mut self) {
        self.row = 0;
        self.col = 0;
        self.saved_row = 0;
        self.saved_col = 0;
        self.row_max = 0;
        let cols = self.doc.columns as usize;
        self.doc.cells.truncate(cols);
        self.doc.cells.fill(BLANK_CODEPOINT);
        self.doc.fg.truncate(cols);
        self.doc.fg.fill(phosphor_palette::ColorIndex::UNSET.0);
        self.doc.bg.truncate(cols);
        self.doc.bg.fill(self.to_index(self.pen.bg));
        self.doc.attrs.truncate(cols);
        self.doc.attrs.fill(0);
    }

    fn apply_csi(&mut self, final_byte: char, params: &[i64]) {
        match final_byte {
            'H' | 'f' => {
                let r1 = param(params, 0, 1);
                let c1 = param(params, 1, 1);
                self.row = ((if r1 != 0 { r1 } else { 1 }) - 1).max(0) as i32;
                self.col = ((if c1 != 0 { c1 } else { 1 }) - 1).max(0) as i32;
            }
            'A' => {
                let n = param(params, 0, 0);
                self.row = (self.row - (if n != 0 { n } else { 1 }) as i32).max(0);
            }
            'B' => {
                let n = param(params, 0, 0);
                self.row += (if n != 0 { n } else { 1 }) as i32;
            }
            'C' => {
                let n = param(params, 0, 0);
                self.col = (self.col + (if n != 0 { n } else { 1 }) as i32).min(self.doc.columns as i32);
            }
            'D' => {
                let n = param(params, 0, 0);
                self.col = (self.col - (if n != 0 { n } else { 1 }) as i32).max(0);
            }
            'G' => {
                let c1 = param(params, 0, 1);
                self.col = ((if c1 != 0 { c1 } else { 1 }) - 1).max(0) as i32;
            }
            's' => {
                self.saved_row = self.row;
                self.saved_col = self.col;
            }
            'u' => {
                self.row = self.saved_row;
                self.col = self.saved_col;
            }
            'J' => {
                if param(params, 0, 0) == 2 {
                    self.erase_display();
                }
            }
            'm' => self.apply_sgr(params),
            't' => self.apply_pablodraw_truecolor(params),
            'p' | 'h' | 'l' | 'K' | '!' => {}
            other => debug!(target: "ansi.import", final = %other, "unhandled CSI final byte"),
        }
    }

    fn run(&mut self, bytes: &[u8], decode_cp437: bool) {
        #[derive(PartialEq, Eq)]
        enum State {
            Text,
            Sequence,
            End,
        }

        let mut state = State::Text;
        let mut i = 0usize;

        while i < bytes.len() && state != State::End {
            if state == State::Text && self.col == self.doc.columns as i32 && self.opt.wrap_policy == WrapPolicy::Eager {
                self.row += 1;
                self.col = 0;
            }

            let b = bytes[i];
            if state == State::Text {
                match b {
                    LF => {
                        self.row += 1;
                        self.col = 0;
                        self.row_max = self.row_max.max(self.row);
                        i += 1;
                    }
                    CR => {
                        self.col = 0;
                        i += 1;
                    }
                    TAB => {
                        let next = ((self.col / 8) + 1) * 8;
                        let target = next.min(self.doc.columns as i32);
                        while self.col < target {
                            self.put(' ');
                        }
                        i += 1;
                    }
                    SUB => state = State::End,
                    ESC => {
                        if i + 1 < bytes.len() && bytes[i + 1] == b'[' {
                            state = State::Sequence;
                            i += 2;
                        } else {
                            i += 1;
                        }
                    }
                    _ => {
                        let cp = if decode_cp437 {
                            let c = crate::cp437::decode_byte(b);
                            i += 1;
                            c
                        } else {
                            let mut pos = i;
                            let c = encoding::decode_one(bytes, &mut pos).unwrap_or('\u{FFFD}');
                            i = pos;
                            c
                        };
                        if decode_cp437 || (cp as u32) >= 0x20 {
                            self.put(cp);
                        }
                    }
                }
                continue;
            }

            // Sequence state: scan for a CSI final byte.
            let seq_start = i;
            let mut j = i;
            let mut consumed = 0usize;
            let mut final_byte = None;
            while j < bytes.len() && consumed < SEQ_MAX_LEN {
                let b = bytes[j];
                if (0x40..=0x7E).contains(&b) || b == b'!' {
                    final_byte = Some(b as char);
                    break;
                }
                j += 1;
                consumed += 1;
            }

            let Some(final_byte) = final_byte else {
                state = State::Text;
                i = (seq_start + consumed + 1).min(bytes.len());
                continue;
            };

            let params_str = std::str::from_utf8(&bytes[seq_start..j]).unwrap_or("");
            let params = parse_params(params_str);
            self.apply_csi(final_byte, &params);

            state = State::Text;
            i = j + 1;
        }
    }

    fn into_snapshot(mut self) -> CanvasSnapshot {
        let out_rows = (self.row_max + 1).max(1) as u16;
        self.doc.ensure_rows(out_rows);

        let columns = self.doc.columns;
        let count = columns as usize * out_rows as usize;
        let layer = Layer {
            name: "Base".to_string(),
            visible: true,
            cells: self.doc.cells[..count].to_vec(),
            fg: self.doc.fg[..count].to_vec(),
            bg: self.doc.bg[..count].to_vec(),
            attrs: self.doc.attrs[..count].to_vec(),
        };

        CanvasSnapshot {
            columns,
            rows: out_rows,
            layers: vec![layer],
            active_layer: 0,
            caret_row: 0,
            caret_col: 0,
        }
    }
}

/// Read `path` and import it as a single-layer ("Base") canvas snapshot.
pub fn import_file(path: &std::path::Path, opt: &Options) -> Result<CanvasSnapshot, crate::error::ImportError> {
    let bytes = std::fs::read(path)?;
    Ok(import_bytes(&bytes, opt))
}

/// Import raw ANSI/CP437 bytes into a single-layer ("Base") canvas snapshot.
pub fn import_bytes(bytes: &[u8], opt: &Options) -> CanvasSnapshot {
    let sauce = sauce::parse(bytes);
    let columns = if opt.columns > 0 {
        clamp_columns(opt.columns as i32)
    } else if let Some(s) = sauce {
        clamp_columns(s.columns as i32)
    } else {
        80
    };

    if bytes.is_empty() {
        let importer = Importer::new(opt, columns);
        return importer.into_snapshot();
    }

    let mut decode_cp437 = opt.cp437;
    if opt.cp437 && !encoding::contains_esc(bytes) && encoding::looks_like_utf8(bytes) {
        decode_cp437 = false;
    }

    let mut importer = Importer::new(opt, columns);
    importer.run(bytes, decode_cp437);
    importer.into_snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_palette::ColorIndex;

    #[test]
    fn plain_ascii_line_fills_one_row() {
        let snap = import_bytes(b"hi there", &Options { columns: 10, ..Default::default() });
        assert_eq!(snap.columns, 10);
        assert_eq!(snap.rows, 1);
        assert_eq!(snap.layers[0].cells[0], 'h' as u32);
        assert_eq!(snap.layers[0].cells[1], 'i' as u32);
    }

    #[test]
    fn sgr_color_sets_foreground_index() {
        // ESC[31m = red foreground, then "X".
        let bytes = b"\x1b[31mX";
        let snap = import_bytes(bytes, &Options { columns: 10, ..Default::default() });
        let fg = ColorIndex::new(snap.layers[0].fg[0]);
        assert!(!fg.is_unset());
    }

    #[test]
    fn cr_lf_advances_rows() {
        let bytes = b"ab\r\ncd";
        let snap = import_bytes(bytes, &Options { columns: 10, ..Default::default() });
        assert_eq!(snap.rows, 2);
        assert_eq!(snap.layers[0].cells[10], 'c' as u32);
    }

    #[test]
    fn cup_moves_caret_to_one_based_row_col() {
        // ESC[2;3H then "Z"
        let bytes = b"\x1b[2;3HZ";
        let snap = import_bytes(bytes, &Options { columns: 10, ..Default::default() });
        assert_eq!(snap.rows, 2);
        assert_eq!(snap.layers[0].cells[1 * 10 + 2], 'Z' as u32);
    }

    #[test]
    fn pablodraw_truecolor_sets_an_exact_fg() {
        let bytes = b"\x1b[1;10;20;30tX";
        let snap = import_bytes(bytes, &Options { columns: 10, ..Default::default() });
        assert!(!ColorIndex::new(snap.layers[0].fg[0]).is_unset());
    }

    #[test]
    fn empty_input_yields_a_blank_single_row() {
        let snap = import_bytes(b"", &Options { columns: 12, ..Default::default() });
        assert_eq!(snap.rows, 1);
        assert_eq!(snap.columns, 12);
        assert_eq!(snap.layers[0].cells[0], BLANK_CODEPOINT);
    }

    #[test]
    fn put_only_wrap_policy_overwrites_the_last_column_instead_of_wrapping() {
        let opt = Options { columns: 3, wrap_policy: crate::options::WrapPolicy::PutOnly, ..Default::default() };
        let snap = import_bytes(b"abcd", &opt);
        assert_eq!(snap.rows, 1);
        assert_eq!(snap.layers[0].cells[2], 'd' as u32);
    }

    #[test]
    fn default_bg_unset_leaves_background_unset_after_sgr_reset() {
        let opt = Options { columns: 10, default_bg_unset: true, ..Default::default() };
        let snap = import_bytes(b"\x1b[0mX", &opt);
        assert!(ColorIndex::new(snap.layers[0].bg[0]).is_unset());
    }

    #[test]
    fn sauce_columns_are_used_when_options_columns_is_zero() {
        let mut body = b"hello world this line is longer than forty".to_vec();
        let mut rec = vec![0u8; 128];
        rec[0..5].copy_from_slice(b"SAUCE");
        rec[92..94].copy_from_slice(&40u16.to_le_bytes());
        rec[94..96].copy_from_slice(&1u16.to_le_bytes());
        body.extend(rec);

        let snap = import_bytes(&body, &Options::default());
        assert_eq!(snap.columns, 40);
    }
}
