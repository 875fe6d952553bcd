//! The 16-entry ANSI base palette, exposed as its own built-in identity.
//!
//! Most art tools quantize against the full xterm256 cube, but some legacy
//! importers and low-color exports want to land exactly on the 16 named
//! colors. We reuse the same RGB values xterm256 uses for indices 0..16 so
//! `Ansi16` round-trips against `Xterm256` for those entries.

use crate::Rgb8;

pub(crate) fn build() -> [Rgb8; 16] {
    let full = crate::xterm256::build();
    let mut out = [Rgb8::new(0, 0, 0); 16];
    out.copy_from_slice(&full[0..16]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_xterm256_prefix() {
        let a = build();
        let x = crate::xterm256::build();
        assert_eq!(&a[..], &x[0..16]);
    }
}
