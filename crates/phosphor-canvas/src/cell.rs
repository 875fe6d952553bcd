//! Cell-level types: codepoints and the typographic attribute bitset.

/// The blank glyph used to fill newly grown cells and layers.
pub const BLANK_CODEPOINT: u32 = 0x20;

bitflags::bitflags! {
    /// Typographic attribute bits. Unused bits must round-trip unchanged, so
    /// this is backed by a plain `u8` rather than an enum.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
    pub struct Attrs: u8 {
        const BOLD          = 0b0000_0001;
        const DIM            = 0b0000_0010;
        const ITALIC         = 0b0000_0100;
        const UNDERLINE      = 0b0000_1000;
        const BLINK          = 0b0001_0000;
        const REVERSE        = 0b0010_0000;
        const STRIKETHROUGH  = 0b0100_0000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_bit_round_trips() {
        let a = Attrs::from_bits_retain(0b1000_0000 | Attrs::BOLD.bits());
        assert!(a.contains(Attrs::BOLD));
        assert_eq!(a.bits(), 0b1000_0001);
    }
}
