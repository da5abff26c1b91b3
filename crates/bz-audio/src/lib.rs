//! Audio output backends and tone playback for buzzclock.
//!
//! One output pipeline per process, shared by every sound the game makes.
//! [`AudioEngine`] boots it lazily on the first play request; [`TonePlayer`]
//! renders profiles and schedules them as independent one-shot voices, so
//! overlapping alerts never interfere with each other.

mod cpal_sink;
mod engine;
mod error;
mod player;
mod sink;

pub use cpal_sink::CpalSink;
pub use engine::AudioEngine;
pub use error::EngineError;
pub use player::TonePlayer;
pub use sink::{AudioSink, NullSink, Voice};
