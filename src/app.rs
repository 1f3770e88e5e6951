//! One pass of the control loop
//!
//! Buttons feed the countdown, the countdown drives the beeper and produces
//! the text for the wheels, and the wheels draw it.

use embedded_hal::digital::v2::InputPin;

use crate::beeper::{Beeper, Tone};
use crate::config::Config;
use crate::countdown::{Countdown, TimerState, Transition};
use crate::font::GlyphSource;
use crate::input::Buttons;
use crate::sink::ColumnSink;
use crate::time::Millis;
use crate::wheel::PushWheel;

/// Positions on the display: `MM:SS`
pub const DISPLAY_SLOTS: usize = 5;

/// The whole timer minus the hardware it is wired to
pub struct PushwheelTimer<A, B, C, T, G> {
    config: Config,
    buttons: Buttons<A, B, C>,
    countdown: Countdown,
    beeper: Beeper<T>,
    wheel: PushWheel<G, DISPLAY_SLOTS>,
}

impl<A, B, C, T, G> PushwheelTimer<A, B, C, T, G>
where
    A: InputPin,
    B: InputPin,
    C: InputPin,
    T: Tone,
    G: GlyphSource,
{
    pub fn new(config: Config, buttons: Buttons<A, B, C>, tone: T, glyphs: G) -> Self {
        Self {
            countdown: Countdown::new(&config),
            beeper: Beeper::new(tone, config.beep_interval),
            wheel: PushWheel::new(glyphs, config.frame_delay, config.glyph_gap),
            buttons,
            config,
        }
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn beeper(&self) -> &Beeper<T> {
        &self.beeper
    }

    pub fn wheel(&self) -> &PushWheel<G, DISPLAY_SLOTS> {
        &self.wheel
    }

    /// Run one iteration. Returns `true` once the display shows the
    /// current countdown value with no roll in progress.
    pub fn poll<S: ColumnSink>(&mut self, now: Millis, sink: &mut S) -> bool {
        for event in self.buttons.poll(now) {
            debug!("button {}", event);
            self.beeper.start(self.config.click_beeps, now);
            if let Some(transition) = self.countdown.handle(event, now) {
                self.on_transition(transition, now);
            }
        }

        if let Some(transition) = self.countdown.tick(now) {
            self.on_transition(transition, now);
        }

        self.beeper.poll(now);

        let text = self.countdown.display_text();
        self.wheel.render_tick(&text, now, sink)
    }

    fn on_transition(&mut self, transition: Transition, now: Millis) {
        info!("timer {} -> {}", transition.from, transition.to);
        if transition.to == TimerState::Expired {
            self.beeper.start(self.config.expiry_beeps, now);
        }
    }
}
