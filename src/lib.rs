//! Pushwheel countdown timer
//!
//! Board-agnostic logic for a countdown timer whose digits roll like the
//! wheels of a mechanical pushwheel counter on a chain of MAX7219 LED
//! matrix modules:
//!
//! - [`wheel`]: the digit animation engine and its per-position [`slot`]s
//! - [`compose`]: flattening glyph bitmaps into device columns
//! - [`sink`]: the column framebuffer and MAX7219 module chain
//! - [`font`]: glyph sources (built-in 5x7 font, `embedded-graphics` fonts)
//! - [`countdown`], [`input`], [`beeper`]: the control loop collaborators
//! - [`app`]: one control-loop iteration tying everything together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod app;
pub mod beeper;
pub mod compose;
pub mod config;
pub mod countdown;
pub mod font;
pub mod input;
pub mod sink;
pub mod slot;
pub mod time;
pub mod wheel;

pub use config::Config;
pub use font::{GlyphSource, PushwheelFont};
pub use sink::{ColumnSink, Framebuffer, Matrix};
pub use wheel::{EngineState, PushWheel};
