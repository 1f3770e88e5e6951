//! Timer tunables
//!
//! Everything the control loop and the animation engine need to know about
//! timing and presentation. Display geometry is fixed at compile time through
//! const generics instead.

use fugit::MillisDurationU32;

/// Runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Minimum time between two roll steps of one digit
    pub frame_delay: MillisDurationU32,
    /// How long a button level must be stable to be accepted
    pub debounce: MillisDurationU32,
    /// Length of one beep and of the silence after it
    pub beep_interval: MillisDurationU32,
    /// Countdown resolution
    pub tick: MillisDurationU32,
    /// Beeps played when the countdown runs out
    pub expiry_beeps: u8,
    /// Beeps played on a button-driven transition
    pub click_beeps: u8,
    /// Preset loaded at power-on
    pub preset_minutes: u8,
    /// Largest preset before `Set` wraps around
    pub max_minutes: u8,
    /// MAX7219 intensity (0-15)
    pub intensity: u8,
    /// Blank columns between adjacent glyphs
    pub glyph_gap: usize,
}

impl Config {
    pub const DEFAULT: Self = Self {
        frame_delay: MillisDurationU32::millis(30),
        debounce: MillisDurationU32::millis(20),
        beep_interval: MillisDurationU32::millis(100),
        tick: MillisDurationU32::secs(1),
        expiry_beeps: 5,
        click_beeps: 1,
        preset_minutes: 5,
        max_minutes: 99,
        intensity: 0x02,
        glyph_gap: 1,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
