//! Nearest-color quantization with exact-match and memoized fallback paths.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::registry::PaletteRegistry;
use crate::{Color32, ColorIndex, PaletteId, Rgb8};

/// Distance metric used when no exact match is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    /// Squared Euclidean distance over 8-bit RGB channels. The only metric
    /// implemented today, but kept explicit so future additions don't need
    /// a breaking signature change.
    SquaredEuclideanRgb8,
}

/// Tie-break rule applied when two palette entries are equidistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TieBreak {
    LowestIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizePolicy {
    pub distance: DistanceMetric,
    pub tie_break: TieBreak,
}

impl Default for QuantizePolicy {
    fn default() -> Self {
        Self {
            distance: DistanceMetric::SquaredEuclideanRgb8,
            tie_break: TieBreak::LowestIndex,
        }
    }
}

const LRU_CAPACITY: usize = 16_384;

#[derive(PartialEq, Eq, Hash, Clone, Copy)]
struct MemoKey {
    palette: u64,
    rgb24: u32,
    metric: u8,
    tie_break: u8,
}

impl MemoKey {
    fn new(palette: PaletteId, rgb24: u32, policy: QuantizePolicy) -> Self {
        Self {
            palette: palette.cache_key(),
            rgb24,
            metric: policy.distance as u8,
            tie_break: policy.tie_break as u8,
        }
    }
}

/// Thread-local bounded LRU memoizing `nearest_index` results. Caching never
/// changes what value is returned — only whether the brute-force scan runs.
#[derive(Default)]
struct NearestMemo {
    map: std::collections::HashMap<MemoKey, u8>,
    order: VecDeque<MemoKey>,
}

impl NearestMemo {
    fn get(&mut self, key: &MemoKey) -> Option<u8> {
        let hit = self.map.get(key).copied();
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    fn touch(&mut self, key: &MemoKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(*key);
    }

    fn put(&mut self, key: MemoKey, value: u8) {
        if !self.map.contains_key(&key) && self.map.len() >= LRU_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
        self.map.insert(key, value);
        self.touch(&key);
    }
}

thread_local! {
    static NEAREST_MEMO: RefCell<NearestMemo> = RefCell::new(NearestMemo::default());
}

/// Enable or disable the LRU memo for the calling thread. Tests use this to
/// verify caching never changes results, never that it improves throughput.
pub fn set_cache_enabled(enabled: bool) {
    CACHE_ENABLED.with(|c| c.set(enabled));
}

thread_local! {
    static CACHE_ENABLED: std::cell::Cell<bool> = const { std::cell::Cell::new(true) };
}

fn cache_enabled() -> bool {
    CACHE_ENABLED.with(|c| c.get())
}

fn dist2(a: Rgb8, r: u8, g: u8, b: u8) -> i32 {
    let dr = a.r as i32 - r as i32;
    let dg = a.g as i32 - g as i32;
    let db = a.b as i32 - b as i32;
    dr * dr + dg * dg + db * db
}

fn brute_force_nearest(table: &[Rgb8], r: u8, g: u8, b: u8) -> u8 {
    let mut best_idx = 0usize;
    let mut best_d2 = i32::MAX;
    for (i, entry) in table.iter().enumerate() {
        let d2 = dist2(*entry, r, g, b);
        if d2 < best_d2 {
            best_d2 = d2;
            best_idx = i;
        }
    }
    best_idx as u8
}

/// Find the palette index nearest to `(r, g, b)` under `policy`.
///
/// For the built-in xterm256 identity with the default policy, uses the
/// canonical cube/grayscale projection instead of scanning all 256 entries.
/// Otherwise consults the palette's exact-match table, then a bounded
/// per-thread LRU memo, before falling back to brute-force distance search.
pub fn nearest_index(
    registry: &PaletteRegistry,
    palette: PaletteId,
    r: u8,
    g: u8,
    b: u8,
    policy: QuantizePolicy,
) -> u8 {
    let is_default_policy = policy == QuantizePolicy::default();
    if registry.is_xterm256(palette) && is_default_policy {
        let table = registry.rgb_table(palette).expect("xterm256 always registered");
        let exact = table
            .try_into()
            .ok()
            .map(|arr: [Rgb8; 256]| crate::xterm256::nearest_index(&arr, r, g, b));
        if let Some(idx) = exact {
            return idx;
        }
    }

    let rgb24 = Rgb8::new(r, g, b).as_u24();
    if let Some(idx) = registry.exact_match(palette, rgb24) {
        return idx;
    }

    let key = MemoKey::new(palette, rgb24, policy);
    if cache_enabled()
        && let Some(idx) = NEAREST_MEMO.with(|m| m.borrow_mut().get(&key))
    {
        return idx;
    }

    let table = match registry.rgb_table(palette) {
        Some(t) => t,
        None => return 0,
    };
    let idx = brute_force_nearest(table, r, g, b);

    if cache_enabled() {
        NEAREST_MEMO.with(|m| m.borrow_mut().put(key, idx));
    }
    idx
}

/// Convert a packed ABGR color to a palette index, honoring *unset*.
pub fn color32_to_index(
    registry: &PaletteRegistry,
    palette: PaletteId,
    packed: Color32,
    policy: QuantizePolicy,
) -> ColorIndex {
    match packed.unpack_rgb() {
        None => ColorIndex::UNSET,
        Some((r, g, b)) => {
            ColorIndex::new(nearest_index(registry, palette, r, g, b, policy) as u16)
        }
    }
}

/// Convert a palette index back to an opaque packed ABGR color; *unset* maps
/// to a fully transparent `Color32` (A=0), which itself decodes to *unset*.
pub fn index_to_color32(registry: &PaletteRegistry, palette: PaletteId, idx: ColorIndex) -> Color32 {
    if idx.is_unset() {
        return Color32::UNSET;
    }
    match registry.rgb_at(palette, idx.0 as u8) {
        Some(rgb) => Color32::opaque(rgb.r, rgb.g, rgb.b),
        None => Color32::UNSET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PaletteRegistry;

    #[test]
    fn cache_does_not_change_results() {
        let reg = PaletteRegistry::new();
        let mut custom_rgb = Vec::new();
        for i in 0..40u32 {
            custom_rgb.push(Rgb8::new((i * 5) as u8, (i * 3) as u8, (i * 7) as u8));
        }
        let mut reg2 = PaletteRegistry::new();
        let pal = reg2.register(custom_rgb);

        for enabled in [true, false, true] {
            set_cache_enabled(enabled);
            for r in (0..=255u16).step_by(31) {
                for g in (0..=255u16).step_by(53) {
                    let idx = nearest_index(&reg2, pal, r as u8, g as u8, 40, QuantizePolicy::default());
                    let idx2 = nearest_index(&reg2, pal, r as u8, g as u8, 40, QuantizePolicy::default());
                    assert_eq!(idx, idx2);
                }
            }
        }
        set_cache_enabled(true);
        let _ = reg;
    }

    #[test]
    fn exact_round_trip_for_every_xterm_entry() {
        let reg = PaletteRegistry::new();
        let table = reg.rgb_table(PaletteId::XTERM256).unwrap().to_vec();
        for (i, c) in table.iter().enumerate() {
            let idx = nearest_index(&reg, PaletteId::XTERM256, c.r, c.g, c.b, QuantizePolicy::default());
            assert_eq!(idx as usize, i, "entry {i} did not round-trip");
        }
    }

    #[test]
    fn unset_round_trips_through_color32() {
        let reg = PaletteRegistry::new();
        let idx = color32_to_index(&reg, PaletteId::XTERM256, Color32::UNSET, QuantizePolicy::default());
        assert!(idx.is_unset());
        let back = index_to_color32(&reg, PaletteId::XTERM256, idx);
        assert_eq!(back, Color32::UNSET);
    }
}
