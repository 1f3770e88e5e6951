//! Pushwheel animation engine
//!
//! Owns one [`DigitSlot`] per display position and, on every control-loop
//! tick, rolls the slots whose commanded code differs from what they show.
//! All slots that differ when the engine leaves [`EngineState::Wait`] roll
//! together as one cohort; a change that arrives for a settled slot while a
//! cohort is rolling waits for the next `Wait` check.

use fugit::MillisDurationU32;

use crate::compose::compose;
use crate::font::GlyphSource;
use crate::sink::ColumnSink;
use crate::slot::DigitSlot;
use crate::time::{is_due, Millis};

/// Engine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// Nothing shown yet
    Init,
    /// Display settled, watching for changes
    Wait,
    /// A cohort is rolling
    Animating,
}

/// Outcome of running one state handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// Run the next state within this same tick
    Chain(EngineState),
    /// Stop here; the next tick starts in this state
    Rest(EngineState),
}

/// Rolling-digit display of `N` positions
pub struct PushWheel<G, const N: usize> {
    glyphs: G,
    slots: [DigitSlot; N],
    state: EngineState,
    frame_delay: MillisDurationU32,
    gap: usize,
}

impl<G: GlyphSource, const N: usize> PushWheel<G, N> {
    /// Create an engine that has not drawn anything yet
    pub fn new(glyphs: G, frame_delay: MillisDurationU32, gap: usize) -> Self {
        let slots = core::array::from_fn(|_| DigitSlot::settled(b' ', &glyphs));
        Self {
            glyphs,
            slots,
            state: EngineState::Init,
            frame_delay,
            gap,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn slots(&self) -> &[DigitSlot; N] {
        &self.slots
    }

    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    /// Advance the display towards `target`.
    ///
    /// Returns `true` when the engine is waiting with nothing left to roll,
    /// i.e. `target` is fully on the LEDs.
    pub fn render_tick<S: ColumnSink>(
        &mut self,
        target: &[u8; N],
        now: Millis,
        sink: &mut S,
    ) -> bool {
        let mut state = self.state;
        loop {
            let transition = match state {
                EngineState::Init => self.init(target, sink),
                EngineState::Wait => self.wait(target, now),
                EngineState::Animating => self.animate(target, now, sink),
            };
            match transition {
                Transition::Chain(next) => {
                    debug!("wheel {} -> {}", state, next);
                    state = next;
                }
                Transition::Rest(next) => {
                    if next != state {
                        debug!("wheel {} -> {}", state, next);
                    }
                    state = next;
                    break;
                }
            }
        }
        self.state = state;
        state == EngineState::Wait
    }

    fn init<S: ColumnSink>(&mut self, target: &[u8; N], sink: &mut S) -> Transition {
        for (slot, &code) in self.slots.iter_mut().zip(target) {
            *slot = DigitSlot::settled(code, &self.glyphs);
        }
        compose(&self.slots, self.gap, sink);
        Transition::Chain(EngineState::Wait)
    }

    fn wait(&mut self, target: &[u8; N], now: Millis) -> Transition {
        // First step of the cohort is due right away
        let armed_at = now.wrapping_sub(self.frame_delay.ticks());
        let mut cohort = 0usize;
        for (slot, &code) in self.slots.iter_mut().zip(target) {
            if slot.displayed != code {
                slot.commanded = code;
                slot.arm(armed_at);
                cohort += 1;
            }
        }
        if cohort == 0 {
            return Transition::Rest(EngineState::Wait);
        }
        debug!("rolling {} of {} slots", cohort, N);
        Transition::Chain(EngineState::Animating)
    }

    fn animate<S: ColumnSink>(&mut self, target: &[u8; N], now: Millis, sink: &mut S) -> Transition {
        for (slot, &code) in self.slots.iter_mut().zip(target) {
            if !slot.in_flight() {
                continue;
            }
            // Latest request wins; the blend so far is kept
            slot.commanded = code;
            if !slot.in_flight() {
                continue;
            }

            if !self.glyphs.rolls(slot.displayed) || !self.glyphs.rolls(slot.commanded) {
                slot.swap(&self.glyphs);
                trace!("slot swapped to {}", slot.displayed);
                continue;
            }

            if is_due(now, slot.last_frame, self.frame_delay) && slot.roll(&self.glyphs, now) {
                trace!("slot settled on {}", slot.displayed);
            }
        }

        compose(&self.slots, self.gap, sink);

        if self.slots.iter().any(DigitSlot::in_flight) {
            Transition::Rest(EngineState::Animating)
        } else {
            // Changes held back during the cohort start the next one now
            Transition::Chain(EngineState::Wait)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{MonoFontGlyphs, PushwheelFont, MAX_GLYPH_COLUMNS};
    use crate::sink::testing::RecordingSink;
    use crate::slot::ROW_BITS;
    use embedded_graphics::mono_font::ascii::FONT_5X8;
    use proptest::prelude::*;

    const DELAY: Millis = 30;

    fn frame_delay() -> MillisDurationU32 {
        MillisDurationU32::millis(DELAY)
    }

    fn glyph(code: u8) -> [u8; MAX_GLYPH_COLUMNS] {
        let mut out = [0; MAX_GLYPH_COLUMNS];
        PushwheelFont.lookup(code, &mut out);
        out
    }

    fn settled_wheel(text: &[u8; 5], sink: &mut RecordingSink) -> PushWheel<PushwheelFont, 5> {
        let mut wheel = PushWheel::new(PushwheelFont, frame_delay(), 1);
        assert!(wheel.render_tick(text, 0, sink));
        wheel
    }

    fn assert_shows(wheel: &PushWheel<PushwheelFont, 5>, text: &[u8; 5]) {
        for (slot, &code) in wheel.slots().iter().zip(text) {
            assert_eq!(slot.displayed, code);
            assert_eq!(slot.commanded, code);
            assert_eq!(slot.progress, 0);
            assert_eq!(slot.bitmap, glyph(code));
        }
    }

    #[test]
    fn test_init_draws_first_target() {
        let mut sink = RecordingSink::default();
        let wheel = settled_wheel(b"00:00", &mut sink);
        assert_eq!(wheel.state(), EngineState::Wait);
        assert_shows(&wheel, b"00:00");
        assert_eq!(sink.refreshes, 1);
        assert_eq!(sink.columns[0], 0x3E);
    }

    #[test]
    fn test_idle_ticks_do_not_touch_display() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"12:34", &mut sink);
        let before = *wheel.slots();

        for now in (0..1_000).step_by(7) {
            assert!(wheel.render_tick(b"12:34", now, &mut sink));
        }
        assert_eq!(*wheel.slots(), before);
        assert_eq!(sink.refreshes, 1);
    }

    #[test]
    fn test_single_digit_rolls_to_target() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        let mut now = 100;
        assert!(!wheel.render_tick(b"00:05", now, &mut sink));
        assert_eq!(wheel.state(), EngineState::Animating);
        assert_eq!(wheel.slots()[4].progress, 1);
        assert!(wheel.slots()[..4].iter().all(|slot| slot.progress == 0));

        for _ in 1..ROW_BITS - 1 {
            now += DELAY;
            assert!(!wheel.render_tick(b"00:05", now, &mut sink));
        }
        now += DELAY;
        assert!(wheel.render_tick(b"00:05", now, &mut sink));
        assert_shows(&wheel, b"00:05");
        assert_eq!(sink.columns[0], glyph(b'5')[4]);
    }

    #[test]
    fn test_frame_delay_gates_steps() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        wheel.render_tick(b"00:01", 100, &mut sink);
        assert_eq!(wheel.slots()[4].progress, 1);
        wheel.render_tick(b"00:01", 100 + DELAY - 1, &mut sink);
        assert_eq!(wheel.slots()[4].progress, 1);
        wheel.render_tick(b"00:01", 100 + DELAY, &mut sink);
        assert_eq!(wheel.slots()[4].progress, 2);
    }

    #[test]
    fn test_frame_delay_survives_counter_wrap() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        let start = u32::MAX - 10;
        wheel.render_tick(b"00:01", start, &mut sink);
        assert_eq!(wheel.slots()[4].progress, 1);
        wheel.render_tick(b"00:01", start.wrapping_add(DELAY), &mut sink);
        assert_eq!(wheel.slots()[4].progress, 2);
    }

    #[test]
    fn test_non_digit_swaps_instantly() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        assert!(wheel.render_tick(b"00-00", 1, &mut sink));
        assert_shows(&wheel, b"00-00");
        assert!(wheel.render_tick(b"00 00", 2, &mut sink));
        assert_shows(&wheel, b"00 00");
    }

    #[test]
    fn test_swap_ignores_frame_delay_mid_roll() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        wheel.render_tick(b"00:05", 100, &mut sink);
        assert_eq!(wheel.slots()[4].progress, 1);
        // Next roll step would not be due until 130
        assert!(wheel.render_tick(b"00:0-", 101, &mut sink));
        assert_shows(&wheel, b"00:0-");
    }

    #[test]
    fn test_unmapped_code_swaps_instantly() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        assert!(wheel.render_tick(b"00:0x", 100, &mut sink));
        assert_eq!(wheel.slots()[4].displayed, b'x');
        assert_eq!(wheel.slots()[4].progress, 0);
        assert!(wheel.render_tick(b"00:07", 200, &mut sink));
        assert_shows(&wheel, b"00:07");
    }

    #[test]
    fn test_target_flip_mid_roll() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        let mut now = 100;
        for _ in 0..3 {
            wheel.render_tick(b"00:05", now, &mut sink);
            now += DELAY;
        }
        assert_eq!(wheel.slots()[4].progress, 3);

        assert!(!wheel.render_tick(b"00:09", now, &mut sink));
        assert_eq!(wheel.slots()[4].commanded, b'9');
        assert_eq!(wheel.slots()[4].progress, 4);

        let mut ticks = 0;
        while !wheel.render_tick(b"00:09", now, &mut sink) {
            now += DELAY;
            ticks += 1;
            assert!(ticks <= ROW_BITS as usize);
        }
        assert_shows(&wheel, b"00:09");
    }

    #[test]
    fn test_flip_back_finishes_roll() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        wheel.render_tick(b"00:05", 100, &mut sink);
        assert!(!wheel.render_tick(b"00:00", 130, &mut sink));
        assert_eq!(wheel.state(), EngineState::Animating);

        let mut now = 160;
        while !wheel.render_tick(b"00:00", now, &mut sink) {
            now += DELAY;
        }
        assert_shows(&wheel, b"00:00");
    }

    #[test]
    fn test_settled_slot_ignores_change_until_cohort_done() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        let mut now = 100;
        wheel.render_tick(b"00:01", now, &mut sink);
        now += DELAY;
        wheel.render_tick(b"10:01", now, &mut sink);
        assert_eq!(wheel.slots()[0].commanded, b'0');
        assert_eq!(wheel.slots()[0].progress, 0);

        // The held-back change starts its own cohort once the first one ends
        while wheel.slots()[4].displayed != b'1' {
            now += DELAY;
            assert!(!wheel.render_tick(b"10:01", now, &mut sink));
        }
        assert_eq!(wheel.state(), EngineState::Animating);
        assert_eq!(wheel.slots()[0].progress, 1);
    }

    #[test]
    fn test_settled_only_when_target_shown() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        let mut now = 100;
        wheel.render_tick(b"00:01", now, &mut sink);
        let mut ticks = 0;
        loop {
            now += DELAY;
            ticks += 1;
            if wheel.render_tick(b"10:01", now, &mut sink) {
                break;
            }
            assert!(ticks <= 2 * ROW_BITS as usize);
        }
        assert_shows(&wheel, b"10:01");
    }

    #[test]
    fn test_cohort_slots_track_own_timing() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        wheel.render_tick(b"00:11", 100, &mut sink);
        assert_eq!(wheel.slots()[3].progress, 1);
        assert_eq!(wheel.slots()[4].progress, 1);

        // Hold one slot back by faking an older frame on the other
        wheel.slots[3].last_frame = 50;
        wheel.render_tick(b"00:11", 100 + DELAY - 20, &mut sink);
        assert_eq!(wheel.slots()[3].progress, 2);
        assert_eq!(wheel.slots()[4].progress, 1);
        assert_eq!(wheel.slots()[4].last_frame, 100);
    }

    #[test]
    fn test_every_frame_is_composited() {
        let mut sink = RecordingSink::default();
        let mut wheel = settled_wheel(b"00:00", &mut sink);

        wheel.render_tick(b"00:05", 100, &mut sink);
        wheel.render_tick(b"00:05", 101, &mut sink);
        assert_eq!(sink.refreshes, 3);
    }

    #[test]
    fn test_rolls_with_mono_font() {
        let glyphs = MonoFontGlyphs::new(&FONT_5X8);
        let mut sink = RecordingSink::default();
        let mut wheel = PushWheel::new(glyphs, frame_delay(), 1);
        assert!(wheel.render_tick(b"12:34", 0, &mut sink));

        let mut now = 100;
        assert!(!wheel.render_tick(b"12:35", now, &mut sink));
        assert_eq!(wheel.slots()[4].progress, 1);
        while !wheel.render_tick(b"12:35", now, &mut sink) {
            now += DELAY;
        }

        let mut expected = [0u8; MAX_GLYPH_COLUMNS];
        for (slot, &code) in wheel.slots().iter().zip(b"12:35") {
            expected.fill(0);
            let width = glyphs.lookup(code, &mut expected);
            assert_eq!(slot.displayed, code);
            assert_eq!(slot.width, width);
            assert_eq!(slot.bitmap, expected);
        }
    }

    proptest! {
        #[test]
        fn prop_settles_within_row_count(
            from in proptest::collection::vec(prop::sample::select(b"0123456789: -".to_vec()), 5),
            to in proptest::collection::vec(prop::sample::select(b"0123456789: -".to_vec()), 5),
            start in any::<u32>(),
        ) {
            let from: [u8; 5] = from.try_into().unwrap();
            let to: [u8; 5] = to.try_into().unwrap();
            let mut sink = RecordingSink::default();
            let mut wheel = PushWheel::new(PushwheelFont, frame_delay(), 1);
            wheel.render_tick(&from, start, &mut sink);

            let mut now = start;
            let mut settled = false;
            for _ in 0..ROW_BITS {
                now = now.wrapping_add(DELAY);
                if wheel.render_tick(&to, now, &mut sink) {
                    settled = true;
                    break;
                }
            }
            prop_assert!(settled);
            for (slot, &code) in wheel.slots().iter().zip(&to) {
                prop_assert_eq!(slot.displayed, code);
                prop_assert_eq!(slot.bitmap, glyph(code));
            }
        }

        #[test]
        fn prop_column_reveal(from in 0u8..10, to in 0u8..10, frames in 0u8..=ROW_BITS) {
            let (from, to) = (b'0' + from, b'0' + to);
            prop_assume!(from != to);
            let mut sink = RecordingSink::default();
            let mut wheel = PushWheel::new(PushwheelFont, frame_delay(), 1);
            wheel.render_tick(&[from; 5], 0, &mut sink);

            let target = [to; 5];
            let mut now: Millis = 1_000;
            for _ in 0..frames {
                wheel.render_tick(&target, now, &mut sink);
                now += DELAY;
            }

            let (old, new) = (glyph(from), glyph(to));
            for slot in wheel.slots() {
                for j in 0..slot.width {
                    let expected = if frames == ROW_BITS {
                        new[j]
                    } else {
                        let revealed = if frames == 0 { 0 } else { new[j] >> (ROW_BITS - frames) };
                        (old[j] << frames) | revealed
                    };
                    prop_assert_eq!(slot.bitmap[j], expected);
                }
            }
        }
    }
}
