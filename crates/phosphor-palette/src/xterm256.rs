//! The built-in 256-color xterm palette and its canonical nearest-index projection.
//!
//! Layout: 0..16 are the standard ANSI colors, 16..232 are a 6x6x6 color cube,
//! and 232..256 are a 24-step grayscale ramp. `nearest_index` avoids scanning
//! all 256 entries by projecting each channel onto its nearest cube/gray level
//! and comparing the resulting handful of candidates.

use crate::Rgb8;

const ANSI16: [Rgb8; 16] = [
    Rgb8::new(0, 0, 0),
    Rgb8::new(205, 0, 0),
    Rgb8::new(0, 205, 0),
    Rgb8::new(205, 205, 0),
    Rgb8::new(0, 0, 238),
    Rgb8::new(205, 0, 205),
    Rgb8::new(0, 205, 205),
    Rgb8::new(229, 229, 229),
    Rgb8::new(127, 127, 127),
    Rgb8::new(255, 0, 0),
    Rgb8::new(0, 255, 0),
    Rgb8::new(255, 255, 0),
    Rgb8::new(92, 92, 255),
    Rgb8::new(255, 0, 255),
    Rgb8::new(0, 255, 255),
    Rgb8::new(255, 255, 255),
];

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

pub(crate) fn build() -> [Rgb8; 256] {
    let mut out = [Rgb8::new(0, 0, 0); 256];
    out[0..16].copy_from_slice(&ANSI16);
    for i in 16..232 {
        let idx = i - 16;
        let r = idx / 36;
        let g = (idx % 36) / 6;
        let b = idx % 6;
        out[i] = Rgb8::new(CUBE_LEVELS[r], CUBE_LEVELS[g], CUBE_LEVELS[b]);
    }
    for i in 232..256 {
        let shade = (8 + (i - 232) * 10) as u8;
        out[i] = Rgb8::new(shade, shade, shade);
    }
    out
}

fn dist2(a: Rgb8, r: u8, g: u8, b: u8) -> i32 {
    let dr = a.r as i32 - r as i32;
    let dg = a.g as i32 - g as i32;
    let db = a.b as i32 - b as i32;
    dr * dr + dg * dg + db * db
}

/// Index of the nearest of the six cube/gray levels to `v`.
///
/// The thresholds are not the exact midpoints of `CUBE_LEVELS` (e.g. 48 rather
/// than 47.5) — this specific bucketing must be preserved bit-for-bit so
/// quantization stays stable for files saved against earlier builds.
fn nearest_level_index(v: u8) -> usize {
    if v < 48 {
        0
    } else if v < 115 {
        1
    } else if v < 155 {
        2
    } else if v < 195 {
        3
    } else if v < 235 {
        4
    } else {
        5
    }
}

/// Canonical xterm256 nearest-index projection: cube cell + grayscale ramp +
/// the 16 base entries, picked by squared-distance argmin.
pub fn nearest_index(palette: &[Rgb8; 256], r: u8, g: u8, b: u8) -> u8 {
    let ri = nearest_level_index(r);
    let gi = nearest_level_index(g);
    let bi = nearest_level_index(b);
    let cr = CUBE_LEVELS[ri];
    let cg = CUBE_LEVELS[gi];
    let cb = CUBE_LEVELS[bi];
    let cube_idx = 16 + 36 * ri + 6 * gi + bi;
    let mut best_idx = cube_idx;
    let mut best_d2 = dist2(Rgb8::new(cr, cg, cb), r, g, b);

    let gray_sum = r as i32 + g as i32 + b as i32;
    let avg = (gray_sum + 1) / 3;
    let gray_idx = if avg <= 8 {
        232
    } else if avg >= 238 {
        255
    } else {
        let k = (avg - 8 + 5) / 10;
        232 + k.clamp(0, 23) as usize
    };
    let gray_d2 = dist2(palette[gray_idx], r, g, b);
    if gray_d2 < best_d2 {
        best_d2 = gray_d2;
        best_idx = gray_idx;
    }

    for (i, entry) in palette.iter().enumerate().take(16) {
        let d2 = dist2(*entry, r, g, b);
        if d2 < best_d2 {
            best_d2 = d2;
            best_idx = i;
        }
    }

    best_idx as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_is_entry_zero_or_cube_origin() {
        let p = build();
        let idx = nearest_index(&p, 0, 0, 0);
        assert!(idx == 16 || idx == 0, "got {idx}");
    }

    #[test]
    fn white_lands_on_accepted_set() {
        let p = build();
        let idx = nearest_index(&p, 255, 255, 255);
        assert!(idx == 15 || idx == 231, "got {idx}");
    }

    #[test]
    fn mid_gray_lands_on_accepted_set() {
        let p = build();
        let idx = nearest_index(&p, 128, 128, 128);
        assert!(idx == 244 || idx == 8, "got {idx}");
    }

    #[test]
    fn palette_has_256_entries_with_expected_cube_corner() {
        let p = build();
        assert_eq!(p.len(), 256);
        assert_eq!(p[16], Rgb8::new(0, 0, 0));
        assert_eq!(p[231], Rgb8::new(255, 255, 255));
        assert_eq!(p[232], Rgb8::new(8, 8, 8));
        assert_eq!(p[255], Rgb8::new(238, 238, 238));
    }
}
