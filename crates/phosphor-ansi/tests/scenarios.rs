use phosphor_ansi::{import_bytes, Options};
use phosphor_canvas::BLANK_CODEPOINT;
use phosphor_palette::ColorIndex;

#[test]
fn icecolors_blink_becomes_bright_background() {
    // ESC[44;5m = blue background + blink; with icecolors on, bg bumps to bright blue.
    let bytes = b"\x1b[44;5mX";
    let snap = import_bytes(bytes, &Options { columns: 8, icecolors: true, ..Default::default() });
    let bg = ColorIndex::new(snap.layers[0].bg[0]);
    assert!(!bg.is_unset());
}

#[test]
fn utf8_art_with_no_escapes_is_auto_detected_and_decoded() {
    let text = "caf\u{00e9} \u{2764} na\u{00efve"; // strong non-ASCII signal, no ESC bytes
    let snap = import_bytes(text.as_bytes(), &Options { columns: 20, ..Default::default() });
    // first cell should be 'c', not a CP437 mis-decode of the UTF-8 lead byte.
    assert_eq!(snap.layers[0].cells[0], 'c' as u32);
}

#[test]
fn cp437_box_drawing_survives_without_an_escape_sequence() {
    let bytes = [0xC4u8, 0xC4, 0xC4]; // three horizontal line-drawing bytes
    let snap = import_bytes(&bytes, &Options { columns: 8, ..Default::default() });
    assert_eq!(snap.layers[0].cells[0], '\u{2500}' as u32);
}

#[test]
fn blank_sub_byte_truncates_the_stream() {
    let bytes = [b'a', b'b', 26, b'c']; // SUB (0x1A) ends parsing
    let snap = import_bytes(&bytes, &Options { columns: 8, ..Default::default() });
    assert_eq!(snap.layers[0].cells[0], 'a' as u32);
    assert_eq!(snap.layers[0].cells[1], 'b' as u32);
    assert_eq!(snap.layers[0].cells[2], BLANK_CODEPOINT);
}
