//! Round timing engine for buzzclock.
//!
//! The drift-corrected countdown clock, the escalating alert scheduler it
//! feeds, and the tone synthesizer the scheduler triggers. All three are
//! poll-driven state machines over caller-supplied timestamps; the `std`
//! feature adds the `Ticker` that drives them on a real thread.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod clock;
mod ramp;
mod synth;
#[cfg(feature = "std")]
mod ticker;

pub use clock::{ClockPoll, CountdownClock, TICK_THROTTLE_MS};
pub use ramp::AlertRamp;
pub use synth::{render_variant, ToneSynth, HEADROOM};
#[cfg(feature = "std")]
pub use ticker::Ticker;
