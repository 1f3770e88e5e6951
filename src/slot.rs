//! One wheel of the display

use crate::font::{GlyphSource, MAX_GLYPH_COLUMNS};
use crate::time::Millis;

/// Rows per column, one per bit
pub const ROW_BITS: u8 = u8::BITS as u8;

/// A single display position and its roll progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitSlot {
    /// Code fully shown once the current roll, if any, is over
    pub displayed: u8,
    /// Code most recently requested for this position
    pub commanded: u8,
    /// Roll steps applied so far, `0..=ROW_BITS`
    pub progress: u8,
    /// When the last roll step was applied
    pub last_frame: Millis,
    /// Valid columns in `bitmap`
    pub width: usize,
    /// What is on the LEDs right now, possibly mid-roll
    pub bitmap: [u8; MAX_GLYPH_COLUMNS],
}

impl DigitSlot {
    /// A slot already showing `code`
    pub fn settled<G: GlyphSource>(code: u8, glyphs: &G) -> Self {
        let mut slot = Self {
            displayed: code,
            commanded: code,
            progress: 0,
            last_frame: 0,
            width: 0,
            bitmap: [0; MAX_GLYPH_COLUMNS],
        };
        slot.refresh(glyphs);
        slot
    }

    /// Reload the clean glyph for `displayed`
    pub fn refresh<G: GlyphSource>(&mut self, glyphs: &G) {
        self.bitmap = [0; MAX_GLYPH_COLUMNS];
        self.width = glyphs
            .lookup(self.displayed, &mut self.bitmap)
            .min(MAX_GLYPH_COLUMNS);
    }

    /// Columns currently rendered
    pub fn columns(&self) -> &[u8] {
        &self.bitmap[..self.width]
    }

    /// Whether this slot still has work to do.
    ///
    /// A slot with `progress > 0` keeps rolling even if it was commanded
    /// back to the code it started from, so it never stops on a blend.
    pub fn in_flight(&self) -> bool {
        self.commanded != self.displayed || self.progress > 0
    }

    /// Arm a fresh roll towards the current `commanded` code, pretending the
    /// previous frame happened at `last_frame`
    pub fn arm(&mut self, last_frame: Millis) {
        self.progress = 0;
        self.last_frame = last_frame;
    }

    /// Replace the blend with the commanded glyph at once
    pub fn swap<G: GlyphSource>(&mut self, glyphs: &G) {
        self.displayed = self.commanded;
        self.progress = 0;
        self.refresh(glyphs);
    }

    /// Apply one roll step.
    ///
    /// Every column moves down one row and the next row of the incoming
    /// glyph, starting from its bottom row, enters at the top. Returns `true`
    /// when the roll has completed.
    pub fn roll<G: GlyphSource>(&mut self, glyphs: &G, now: Millis) -> bool {
        let mut incoming = [0u8; MAX_GLYPH_COLUMNS];
        glyphs.lookup(self.commanded, &mut incoming[..self.width]);

        let shift = ROW_BITS - 1 - self.progress;
        for (current, next) in self.bitmap[..self.width].iter_mut().zip(incoming) {
            *current = (*current << 1) | (next >> shift);
        }

        self.last_frame = now;
        self.progress += 1;
        if self.progress < ROW_BITS {
            return false;
        }

        self.displayed = self.commanded;
        self.progress = 0;
        self.refresh(glyphs);
        true
    }
}
