//! Framebuffer compositor
//!
//! Lays the slots out right-aligned: the last (least significant) slot ends
//! at device column 0 and each earlier slot sits further left, separated by a
//! fixed run of blank columns. Within a glyph the columns are emitted in
//! reverse, so the glyph's rightmost column gets the lowest device index.

use crate::sink::ColumnSink;
use crate::slot::DigitSlot;

/// Write every slot to `sink` as one atomic refresh.
///
/// Safe to call on every tick; identical slots produce identical frames.
pub fn compose<S: ColumnSink>(slots: &[DigitSlot], gap: usize, sink: &mut S) {
    sink.set_refresh_enabled(false);
    sink.clear_all();

    let mut column = 0;
    for slot in slots.iter().rev() {
        for &bits in slot.columns().iter().rev() {
            sink.set_column(column, bits);
            column += 1;
        }
        column += gap;
    }

    sink.set_refresh_enabled(true);
}
