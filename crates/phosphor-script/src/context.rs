//! The per-tick `ctx` record handed to scripts.

/// Mouse/stylus cursor state in cell space, plus half-row and pixel
/// variants for tools that need finer-than-one-cell precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorState {
    pub x: i32,
    pub y: i32,
    pub half_y: i32,
    pub px: i32,
    pub py: i32,
    pub phalf_y: i32,
    pub left_down: bool,
    pub right_down: bool,
    pub prev_left_down: bool,
    pub prev_right_down: bool,
}

/// Which half of a UI frame a tool tick is running in. Keyboard-phase ticks
/// run before canvas layout so row-growth from typing is visible
/// immediately; mouse-phase ticks run once cursor state is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Keyboard,
    Mouse,
}

/// Everything a script's `render(ctx, layer)` sees about the current tick,
/// besides the layer handle itself.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub cols: u16,
    pub rows: u16,
    pub frame: u64,
    pub time_ms: f64,
    pub aspect: f32,
    pub cursor: CursorState,
    pub fg: Option<u8>,
    pub bg: Option<u8>,
    pub phase: TickPhase,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            cols: 0,
            rows: 0,
            frame: 0,
            time_ms: 0.0,
            aspect: 1.0,
            cursor: CursorState::default(),
            fg: None,
            bg: None,
            phase: TickPhase::Keyboard,
        }
    }
}
