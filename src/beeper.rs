//! Piezo alert driven by PWM

use embedded_hal::PwmPin;
use fugit::MillisDurationU32;

use crate::time::{is_due, Millis};

/// Something that can sound a fixed tone
pub trait Tone {
    fn on(&mut self);
    fn off(&mut self);
}

/// Square wave at half duty on a PWM channel; the slice sets the pitch
pub struct PwmTone<P> {
    pin: P,
}

impl<P: PwmPin<Duty = u16>> PwmTone<P> {
    pub fn new(mut pin: P) -> Self {
        pin.set_duty(0);
        pin.enable();
        Self { pin }
    }
}

impl<P: PwmPin<Duty = u16>> Tone for PwmTone<P> {
    fn on(&mut self) {
        let half = self.pin.get_max_duty() / 2;
        self.pin.set_duty(half);
    }

    fn off(&mut self) {
        self.pin.set_duty(0);
    }
}

/// Plays a number of equally spaced beeps without blocking
pub struct Beeper<T> {
    tone: T,
    interval: MillisDurationU32,
    // Phases (on or off) still to play after the current one
    remaining: u16,
    active: bool,
    sounding: bool,
    phase_start: Millis,
}

impl<T: Tone> Beeper<T> {
    pub fn new(mut tone: T, interval: MillisDurationU32) -> Self {
        tone.off();
        Self {
            tone,
            interval,
            remaining: 0,
            active: false,
            sounding: false,
            phase_start: 0,
        }
    }

    /// Start `count` beeps now, replacing whatever was playing
    pub fn start(&mut self, count: u8, now: Millis) {
        if count == 0 {
            self.stop();
            return;
        }
        self.remaining = u16::from(count) * 2 - 1;
        self.active = true;
        self.phase_start = now;
        self.set_sounding(true);
    }

    /// Silence immediately
    pub fn stop(&mut self) {
        self.remaining = 0;
        self.active = false;
        self.set_sounding(false);
    }

    /// Advance the pattern
    pub fn poll(&mut self, now: Millis) {
        if !self.active || !is_due(now, self.phase_start, self.interval) {
            return;
        }
        if self.remaining == 0 {
            self.stop();
            return;
        }
        self.remaining -= 1;
        self.phase_start = now;
        self.set_sounding(!self.sounding);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    fn set_sounding(&mut self, on: bool) {
        if on {
            self.tone.on();
        } else {
            self.tone.off();
        }
        self.sounding = on;
    }
}
