//! Glyph sources
//!
//! A glyph is a run of column bytes, one per LED column, with bit 0 being the
//! top row. Sources are pure: the same code always yields the same columns.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

/// Widest glyph any source may produce
pub const MAX_GLYPH_COLUMNS: usize = 8;

/// Maps a character code to its column bitmap
pub trait GlyphSource {
    /// Write the glyph for `code` into `out` and return its column count.
    ///
    /// At most `out.len()` columns are written. Unmapped codes still produce
    /// a pattern of the source's choosing.
    fn lookup(&self, code: u8, out: &mut [u8]) -> usize;

    /// Whether `code` has a real glyph in this source
    fn has_glyph(&self, code: u8) -> bool;

    /// Whether a change to or from `code` may roll instead of swapping
    fn rolls(&self, code: u8) -> bool {
        code.is_ascii_digit() && self.has_glyph(code)
    }
}

/// Built-in 5x7 font with a blank bottom row between wheels
#[derive(Debug, Clone, Copy, Default)]
pub struct PushwheelFont;

const DIGITS: [[u8; 5]; 10] = [
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
];

const COLON: [u8; 1] = [0x36];
const SPACE: [u8; 5] = [0x00; 5];
const DASH: [u8; 5] = [0x08; 5];
const UNKNOWN: [u8; 5] = [0x7F, 0x41, 0x41, 0x41, 0x7F];

impl PushwheelFont {
    fn columns(code: u8) -> Option<&'static [u8]> {
        match code {
            b'0'..=b'9' => Some(&DIGITS[(code - b'0') as usize]),
            b':' => Some(&COLON),
            b' ' => Some(&SPACE),
            b'-' => Some(&DASH),
            _ => None,
        }
    }
}

impl GlyphSource for PushwheelFont {
    fn lookup(&self, code: u8, out: &mut [u8]) -> usize {
        let columns = Self::columns(code).unwrap_or(&UNKNOWN);
        let width = columns.len().min(out.len());
        out[..width].copy_from_slice(&columns[..width]);
        width
    }

    fn has_glyph(&self, code: u8) -> bool {
        Self::columns(code).is_some()
    }
}

/// Glyph source backed by an `embedded-graphics` monospaced font.
///
/// Rows below the eighth are clipped, so fonts up to 8 px tall fit a module.
#[derive(Clone, Copy)]
pub struct MonoFontGlyphs<'a> {
    font: &'a MonoFont<'a>,
}

impl<'a> MonoFontGlyphs<'a> {
    pub fn new(font: &'a MonoFont<'a>) -> Self {
        Self { font }
    }
}

impl GlyphSource for MonoFontGlyphs<'_> {
    fn lookup(&self, code: u8, out: &mut [u8]) -> usize {
        let width = (self.font.character_size.width as usize).min(out.len());
        let mut canvas = ColumnCanvas {
            columns: &mut out[..width],
        };
        canvas.columns.fill(0);

        let mut utf8 = [0u8; 4];
        let text = char::from(code).encode_utf8(&mut utf8);
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        match Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut canvas) {
            Ok(_) => {}
            Err(never) => match never {},
        }

        width
    }

    fn has_glyph(&self, code: u8) -> bool {
        code == b' ' || code.is_ascii_graphic()
    }
}

/// One glyph's worth of columns as a draw target
struct ColumnCanvas<'a> {
    columns: &'a mut [u8],
}

impl OriginDimensions for ColumnCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.columns.len() as u32, u8::BITS)
    }
}

impl DrawTarget for ColumnCanvas<'_> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if color.is_on() && y < u8::BITS {
                if let Some(column) = self.columns.get_mut(x) {
                    *column |= 1 << y;
                }
            }
        }
        Ok(())
    }
}
