//! Value-semantic snapshots of the canvas, used by both undo/redo and the
//! project file codec.

use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::layer::Layer;

/// A deep, independent copy of canvas state. Cloning a [`Canvas`] is already
/// a deep copy (every field is owned), so a snapshot is just that clone
/// wrapped in its own type to keep undo/redo and codec call sites explicit
/// about what they're handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub columns: u16,
    pub rows: u16,
    pub layers: Vec<Layer>,
    pub active_layer: usize,
    pub caret_row: u16,
    pub caret_col: u16,
}

impl CanvasSnapshot {
    pub fn capture(canvas: &Canvas) -> Self {
        Self {
            columns: canvas.columns,
            rows: canvas.rows,
            layers: canvas.layers.clone(),
            active_layer: canvas.active_layer,
            caret_row: canvas.caret_row,
            caret_col: canvas.caret_col,
        }
    }

    /// Restore `canvas` to this snapshot's state. The canvas's revision
    /// counter is bumped but not reset, so renderers still see a change.
    pub fn restore_into(self, canvas: &mut Canvas) {
        canvas.columns = if self.columns > 0 { self.columns } else { 80 };
        canvas.rows = if self.rows > 0 { self.rows } else { 1 };
        canvas.layers = self.layers;
        canvas.active_layer = self.active_layer;
        canvas.caret_row = self.caret_row;
        canvas.caret_col = self.caret_col;
        canvas.normalize();
        canvas.revision += 1;
    }
}
