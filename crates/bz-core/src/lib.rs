//! Core types for the buzzclock round timer.
//!
//! This crate defines the vocabulary shared by the timing engine and the
//! audio backend: the monotonic time source abstraction, alert ramp
//! configuration, amplitude envelopes, and tone profiles. It holds no
//! threads and no device handles, so everything here is directly testable.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod envelope;
mod profile;
mod ramp;
mod time;

pub use envelope::{interpolate, CurveKind, EnvPoint, Envelope, EnvelopeCursor, MAX_POINTS};
pub use profile::{PitchCurve, ToneProfile, Waveform};
pub use ramp::{RampConfig, RampConfigError};
pub use time::TimeSource;
#[cfg(feature = "std")]
pub use time::{ManualTime, MonotonicTime};
