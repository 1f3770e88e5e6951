//! Countdown timer state machine
//!
//! Counts a preset number of minutes down to zero, driven by button events
//! and by polling with the current time.

use crate::config::Config;
use crate::input::ButtonEvent;
use fugit::MillisDurationU32;

use crate::time::{is_due, Millis};

/// Timer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// Stopped at the preset, `Set` adjusts the preset
    Setup,
    /// Counting down
    Running,
    /// Stopped mid-count, `Set` adds time
    Paused,
    /// Reached zero, waiting for any button
    Expired,
}

/// A change of [`TimerState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: TimerState,
    pub to: TimerState,
}

/// Shared state for the countdown
#[derive(Debug, Clone)]
pub struct Countdown {
    preset: u8,
    mins: u8,
    secs: u8,
    max_minutes: u8,
    tick: MillisDurationU32,
    last_tick: Millis,
    state: TimerState,
}

impl Countdown {
    pub fn new(config: &Config) -> Self {
        let preset = config.preset_minutes.min(config.max_minutes);
        Self {
            preset,
            mins: preset,
            secs: 0,
            max_minutes: config.max_minutes,
            tick: config.tick,
            last_tick: 0,
            state: TimerState::Setup,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mins(&self) -> u8 {
        self.mins
    }

    pub fn secs(&self) -> u8 {
        self.secs
    }

    pub fn preset(&self) -> u8 {
        self.preset
    }

    /// Apply a button press. Returns the state change it caused, if any.
    pub fn handle(&mut self, event: ButtonEvent, now: Millis) -> Option<Transition> {
        use ButtonEvent::*;
        use TimerState::*;

        let next = match (self.state, event) {
            (Expired, _) | (_, Reset) => {
                self.restore();
                Setup
            }
            (Setup, StartPause) if !self.is_zero() => {
                self.last_tick = now;
                Running
            }
            (Running, StartPause) => Paused,
            (Paused, StartPause) => {
                self.last_tick = now;
                Running
            }
            (Setup, Set) => {
                self.add_minute();
                self.preset = self.mins;
                Setup
            }
            (Paused, Set) => {
                self.add_minute();
                Paused
            }
            (state, _) => state,
        };

        self.enter(next)
    }

    /// Count down every tick interval elapsed since the last one.
    /// Returns the transition to `Expired` when zero is reached.
    pub fn tick(&mut self, now: Millis) -> Option<Transition> {
        if self.state != TimerState::Running {
            return None;
        }
        while is_due(now, self.last_tick, self.tick) {
            self.last_tick = self.last_tick.wrapping_add(self.tick.ticks());
            if self.sub_second() {
                return self.enter(TimerState::Expired);
            }
        }
        None
    }

    /// Remaining time as `MM:SS`
    pub fn display_text(&self) -> [u8; 5] {
        let mut text = [0u8; 5];
        let written =
            format_no_std::show(&mut text, format_args!("{:02}:{:02}", self.mins, self.secs))
                .is_ok();
        if written {
            text
        } else {
            *b"--:--"
        }
    }

    fn enter(&mut self, next: TimerState) -> Option<Transition> {
        if next == self.state {
            return None;
        }
        let transition = Transition {
            from: self.state,
            to: next,
        };
        self.state = next;
        Some(transition)
    }

    fn restore(&mut self) {
        self.mins = self.preset;
        self.secs = 0;
    }

    fn is_zero(&self) -> bool {
        self.mins == 0 && self.secs == 0
    }

    /// Increments the minute. Wraps past the maximum back to zero.
    fn add_minute(&mut self) {
        self.mins += 1;
        if self.mins > self.max_minutes {
            self.mins = 0;
        }
    }

    /// Removes one second. Returns true once the count is at zero.
    fn sub_second(&mut self) -> bool {
        if self.secs > 0 {
            self.secs -= 1;
        } else if self.mins > 0 {
            self.mins -= 1;
            self.secs = 59;
        }
        self.is_zero()
    }
}
