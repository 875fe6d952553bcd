//! End-to-end scenarios spanning editing, undo, and the project codec.

use phosphor_canvas::codec::{self, ProjectFile};
use phosphor_canvas::{apply_key, queue_text, Canvas, CanvasSnapshot, KeyToken, ModMask, NamedKey, UndoEngine};
use phosphor_palette::ColorIndex;

#[test]
fn codec_round_trip_across_undo() {
    let mut canvas = Canvas::new(10);
    let mut undo = UndoEngine::default();

    queue_text(&mut canvas, &mut undo, "hello");
    assert_eq!(canvas.composite_cell(0, 0).cp, 'h' as u32);
    queue_text(&mut canvas, &mut undo, " world");

    // Undo back to "hello", leaving one redo entry, then persist everything.
    assert!(undo.undo(&mut canvas));
    assert_eq!(undo.undo_depth(), 1);
    assert_eq!(undo.redo_depth(), 1);

    let project = ProjectFile {
        current: CanvasSnapshot::capture(&canvas),
        undo_limit: undo.history_limit(),
        undo: undo.undo_snapshots(),
        redo: undo.redo_snapshots(),
    };
    let bytes = codec::encode(&project).unwrap();

    let restored = codec::decode(&bytes).unwrap();
    assert_eq!(restored.undo.len(), 1);
    assert_eq!(restored.redo.len(), 1);
    assert_eq!(restored.undo_limit, undo.history_limit());

    let mut restored_canvas = Canvas::new(10);
    restored.current.restore_into(&mut restored_canvas);
    assert_eq!(restored_canvas.composite_cell(0, 0).cp, 'h' as u32);

    let mut restored_undo = UndoEngine::from_parts(restored.undo_limit, restored.undo, restored.redo);
    assert!(restored_undo.redo(&mut restored_canvas));
    assert_eq!(restored_canvas.composite_cell(6, 0).cp, 'w' as u32);

    // Original live undo engine is untouched by persisting a copy of it.
    assert!(undo.redo(&mut canvas));
    assert_eq!(canvas.composite_cell(6, 0).cp, 'w' as u32);
}

#[test]
fn layered_edit_then_hide_then_undo_restores_visibility() {
    let mut canvas = Canvas::new(6);
    let mut undo = UndoEngine::default();

    canvas.add_layer("Sparkle");
    canvas.set_active_layer(1);
    canvas.set_active_cell(0, 0, '*' as u32, ColorIndex::new(11), ColorIndex::UNSET, phosphor_canvas::Attrs::empty());
    assert_eq!(canvas.composite_cell(0, 0).cp, '*' as u32);

    undo.begin_capture();
    undo.note_mutation(&canvas);
    canvas.set_layer_visible(1, false);
    undo.end_capture();
    assert_eq!(canvas.composite_cell(0, 0).cp, phosphor_canvas::BLANK_CODEPOINT);

    assert!(undo.undo(&mut canvas));
    assert_eq!(canvas.composite_cell(0, 0).cp, '*' as u32);
}

#[test]
fn typed_run_and_arrow_navigation_share_the_document() {
    let mut canvas = Canvas::new(5);
    let mut undo = UndoEngine::default();

    queue_text(&mut canvas, &mut undo, "ab");
    apply_key(&mut canvas, &mut undo, KeyToken::Named(NamedKey::Left), ModMask::empty());
    apply_key(&mut canvas, &mut undo, KeyToken::Char('X'), ModMask::empty());

    assert_eq!(canvas.composite_cell(0, 0).cp, 'a' as u32);
    assert_eq!(canvas.composite_cell(1, 0).cp, 'X' as u32);
}

#[test]
fn canvas_invariants_hold_after_growth_and_layer_ops() {
    let mut canvas = Canvas::new(7);
    canvas.add_layer("A");
    canvas.add_layer("B");
    canvas.set_active_cell(0, 12, 'z' as u32, ColorIndex::UNSET, ColorIndex::UNSET, phosphor_canvas::Attrs::empty());
    canvas.remove_layer(1);

    for layer in canvas.layers() {
        assert_eq!(layer.cells.len(), canvas.columns() as usize * canvas.rows() as usize);
        assert!(layer.invariants_hold());
    }
    assert!(canvas.active_layer_index() < canvas.layers().len());
}
