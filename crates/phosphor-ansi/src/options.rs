//! Import options.

use phosphor_palette::Color32;

/// How the caret behaves when a glyph is written at the last column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapPolicy {
    /// Advance to column 0 of the next row (the common terminal/ANSI-art
    /// convention).
    #[default]
    Eager,
    /// Stay in place, overwriting the last column on repeated writes. Used
    /// by importers that want a fixed-height single-row strip.
    PutOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Logical column count. `0` means "use the SAUCE hint if present, else 80".
    pub columns: u16,
    /// Interpret SGR 5 (blink) as "bright background" (ICE colors), the
    /// common convention for ANSI art rather than literal blinking text.
    pub icecolors: bool,
    /// Colors substituted when the stream resets attributes (SGR 0/39/49).
    /// `Color32::UNSET` means "use the ANSI default" (light gray on black).
    pub default_fg: Color32,
    pub default_bg: Color32,
    /// Prefer CP437, auto-switching to UTF-8 when the byte stream strongly
    /// resembles valid UTF-8 and contains no escape sequences. When `false`,
    /// always decode as UTF-8.
    pub cp437: bool,
    /// Caret behavior at the right edge.
    pub wrap_policy: WrapPolicy,
    /// When `true`, an SGR reset (0/49) leaves the background unset instead
    /// of forcing `default_bg`, so cells keep whatever background the
    /// compositor would otherwise show through.
    pub default_bg_unset: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            columns: 0,
            icecolors: true,
            default_fg: Color32::UNSET,
            default_bg: Color32::UNSET,
            cp437: true,
            wrap_policy: WrapPolicy::Eager,
            default_bg_unset: false,
        }
    }
}
