//! Wrapping millisecond timestamps.
//!
//! The control loop only ever compares "now" against a stored event time,
//! so a free-running `u32` counter that wraps every ~49 days is enough as
//! long as every comparison goes through [`elapsed`]. Intervals are `fugit`
//! durations.

use fugit::{MicrosDurationU64, MillisDurationU32};

/// Milliseconds since an arbitrary origin, wrapping at `u32::MAX`.
pub type Millis = u32;

/// Time from `since` to `now`, tolerating one counter wrap in between.
#[inline]
pub fn elapsed(now: Millis, since: Millis) -> MillisDurationU32 {
    MillisDurationU32::from_ticks(now.wrapping_sub(since))
}

/// Whether at least `interval` has passed from `since` to `now`.
#[inline]
pub fn is_due(now: Millis, since: Millis, interval: MillisDurationU32) -> bool {
    elapsed(now, since) >= interval
}

/// Wrapping millisecond timestamp for a time since boot
#[inline]
pub fn wrapping_millis(since_boot: MicrosDurationU64) -> Millis {
    since_boot.to_millis() as Millis
}
