//! A terminal-agnostic key/text input surface for the canvas.
//!
//! This module knows nothing about crossterm or any other terminal crate —
//! translating real key events into [`KeyToken`]/[`ModMask`] is a host
//! concern. Keeping that translation out of this crate lets the same canvas
//! logic run headless (scripted tests, the script host) without pulling in
//! terminal I/O.

use bitflags::bitflags;

use crate::canvas::Canvas;
use crate::capture::UndoEngine;
use crate::cell::{Attrs, BLANK_CODEPOINT};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModMask: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
        const SUPER = 0b0000_1000;
        const META  = 0b0001_0000;
    }
}

/// Named (non-character) keys the canvas reacts to directly. A few of
/// these (`Esc`, `Tab`, `PageUp`/`PageDown`, `Insert`, `F`) have no caret
/// behavior of their own here and exist so a host's key translator has
/// nowhere it needs to drop a token on the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Delete,
    Insert,
    Enter,
    Esc,
    Tab,
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
}

/// Move the caret by `(dx, dy)`, clamping columns to the document width and
/// growing rows downward as needed (never clamping row upward).
fn move_caret(canvas: &mut Canvas, dx: i32, dy: i32) {
    let (col, row) = canvas.caret();
    let new_col = (col as i32 + dx).max(0) as u16;
    let new_row = (row as i32 + dy).max(0) as u16;
    canvas.set_caret(new_col, new_row);
}

/// Apply one key press (already translated by the host) to the canvas,
/// wrapped in its own capture scope. Returns `true` if it was handled.
pub fn apply_key(canvas: &mut Canvas, undo: &mut UndoEngine, token: KeyToken, mods: ModMask) -> bool {
    undo.begin_capture();
    let handled = match token {
        KeyToken::Named(NamedKey::Left) => {
            move_caret(canvas, -1, 0);
            true
        }
        KeyToken::Named(NamedKey::Right) => {
            move_caret(canvas, 1, 0);
            true
        }
        KeyToken::Named(NamedKey::Up) => {
            move_caret(canvas, 0, -1);
            true
        }
        KeyToken::Named(NamedKey::Down) => {
            move_caret(canvas, 0, 1);
            true
        }
        KeyToken::Named(NamedKey::Home) => {
            let (_, row) = canvas.caret();
            canvas.set_caret(0, row);
            true
        }
        KeyToken::Named(NamedKey::End) => {
            let (_, row) = canvas.caret();
            canvas.set_caret(canvas.columns().saturating_sub(1), row);
            true
        }
        KeyToken::Named(NamedKey::Enter) => {
            let (_, row) = canvas.caret();
            canvas.set_caret(0, row + 1);
            true
        }
        KeyToken::Named(NamedKey::Backspace) => {
            let (col, row) = canvas.caret();
            if col > 0 {
                undo.note_mutation(canvas);
                canvas.set_active_cell(
                    col - 1,
                    row,
                    BLANK_CODEPOINT,
                    phosphor_palette::ColorIndex::UNSET,
                    phosphor_palette::ColorIndex::UNSET,
                    Attrs::empty(),
                );
                canvas.set_caret(col - 1, row);
            }
            true
        }
        KeyToken::Named(NamedKey::Delete) => {
            let (col, row) = canvas.caret();
            undo.note_mutation(canvas);
            canvas.set_active_cell(
                col,
                row,
                BLANK_CODEPOINT,
                phosphor_palette::ColorIndex::UNSET,
                phosphor_palette::ColorIndex::UNSET,
                Attrs::empty(),
            );
            true
        }
        KeyToken::Char(c) if !mods.contains(ModMask::CTRL) && !mods.contains(ModMask::ALT) => {
            type_char(canvas, undo, c);
            true
        }
        KeyToken::Char(_) => false,
        KeyToken::Named(NamedKey::PageUp | NamedKey::PageDown | NamedKey::Insert | NamedKey::Esc | NamedKey::Tab | NamedKey::F(_)) => false,
    };
    undo.end_capture();
    handled
}

fn type_char(canvas: &mut Canvas, undo: &mut UndoEngine, c: char) {
    let (col, row) = canvas.caret();
    undo.note_mutation(canvas);
    canvas.set_active_cell(
        col,
        row,
        c as u32,
        phosphor_palette::ColorIndex::UNSET,
        phosphor_palette::ColorIndex::UNSET,
        Attrs::empty(),
    );
    let next_col = col + 1;
    if next_col >= canvas.columns() {
        canvas.set_caret(0, row + 1);
    } else {
        canvas.set_caret(next_col, row);
    }
}

/// Insert a run of typed text at the caret, one capture scope per call.
pub fn queue_text(canvas: &mut Canvas, undo: &mut UndoEngine, text: &str) {
    undo.begin_capture();
    for c in text.chars() {
        if c == '\n' {
            let (_, row) = canvas.caret();
            canvas.set_caret(0, row + 1);
            continue;
        }
        type_char(canvas, undo, c);
    }
    undo.end_capture();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_advances_caret_and_wraps_at_column_edge() {
        let mut canvas = Canvas::new(3);
        let mut undo = UndoEngine::default();
        queue_text(&mut canvas, &mut undo, "abcd");

        assert_eq!(canvas.composite_cell(0, 0).cp, 'a' as u32);
        assert_eq!(canvas.composite_cell(2, 0).cp, 'c' as u32);
        assert_eq!(canvas.composite_cell(0, 1).cp, 'd' as u32);
        assert_eq!(canvas.caret(), (1, 1));
    }

    #[test]
    fn backspace_clears_previous_cell_and_moves_caret_back() {
        let mut canvas = Canvas::new(4);
        let mut undo = UndoEngine::default();
        queue_text(&mut canvas, &mut undo, "ab");
        apply_key(&mut canvas, &mut undo, KeyToken::Named(NamedKey::Backspace), ModMask::empty());

        assert_eq!(canvas.composite_cell(1, 0).cp, BLANK_CODEPOINT);
        assert_eq!(canvas.caret(), (1, 0));
    }

    #[test]
    fn typing_is_undoable_as_one_scope_per_call() {
        let mut canvas = Canvas::new(4);
        let mut undo = UndoEngine::default();
        queue_text(&mut canvas, &mut undo, "ab");
        assert_eq!(undo.undo_depth(), 1);
        assert!(undo.undo(&mut canvas));
        assert_eq!(canvas.composite_cell(0, 0).cp, BLANK_CODEPOINT);
    }

    #[test]
    fn ctrl_chars_are_not_typed() {
        let mut canvas = Canvas::new(4);
        let mut undo = UndoEngine::default();
        let handled = apply_key(&mut canvas, &mut undo, KeyToken::Char('c'), ModMask::CTRL);
        assert!(!handled);
        assert_eq!(canvas.composite_cell(0, 0).cp, BLANK_CODEPOINT);
    }
}
