//! Debounced push buttons

use embedded_hal::digital::v2::InputPin;
use fugit::MillisDurationU32;
use heapless::Vec;

use crate::time::{is_due, Millis};

/// Discrete button presses understood by the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    StartPause,
    Set,
    Reset,
}

/// Time-based debouncer for one input level.
///
/// A level is accepted once it has been seen unchanged for the whole
/// interval; only accepted released-to-pressed edges count as presses.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    interval: MillisDurationU32,
    stable: bool,
    candidate: bool,
    since: Millis,
}

impl Debouncer {
    pub const fn new(interval: MillisDurationU32) -> Self {
        Self {
            interval,
            stable: false,
            candidate: false,
            since: 0,
        }
    }

    /// Feed the raw level. Returns `true` on an accepted press.
    pub fn update(&mut self, pressed: bool, now: Millis) -> bool {
        if pressed != self.candidate {
            self.candidate = pressed;
            self.since = now;
            return false;
        }
        if self.candidate == self.stable || !is_due(now, self.since, self.interval) {
            return false;
        }
        self.stable = self.candidate;
        self.stable
    }

    pub fn is_pressed(&self) -> bool {
        self.stable
    }
}

/// Active-low button on an input pin
pub struct Button<P> {
    pin: P,
    debouncer: Debouncer,
}

impl<P: InputPin> Button<P> {
    pub fn new(pin: P, debounce: MillisDurationU32) -> Self {
        Self {
            pin,
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Sample the pin. A failed read counts as released.
    pub fn poll(&mut self, now: Millis) -> bool {
        let pressed = self.pin.is_low().unwrap_or(false);
        self.debouncer.update(pressed, now)
    }

    pub fn is_pressed(&self) -> bool {
        self.debouncer.is_pressed()
    }
}

/// The three front-panel buttons
pub struct Buttons<A, B, C> {
    start_pause: Button<A>,
    set: Button<B>,
    reset: Button<C>,
}

impl<A: InputPin, B: InputPin, C: InputPin> Buttons<A, B, C> {
    pub fn new(start_pause: A, set: B, reset: C, debounce: MillisDurationU32) -> Self {
        Self {
            start_pause: Button::new(start_pause, debounce),
            set: Button::new(set, debounce),
            reset: Button::new(reset, debounce),
        }
    }

    /// Sample every button, returning the presses accepted on this pass
    pub fn poll(&mut self, now: Millis) -> Vec<ButtonEvent, 3> {
        let mut events = Vec::new();
        // Capacity matches the number of buttons
        if self.start_pause.poll(now) {
            let _ = events.push(ButtonEvent::StartPause);
        }
        if self.set.poll(now) {
            let _ = events.push(ButtonEvent::Set);
        }
        if self.reset.poll(now) {
            let _ = events.push(ButtonEvent::Reset);
        }
        events
    }
}
