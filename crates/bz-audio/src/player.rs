//! Tone player: renders profiles and schedules them on the shared engine.

use std::collections::HashMap;
use std::sync::Arc;

use bz_core::ToneProfile;
use bz_engine::render_variant;

use crate::{AudioEngine, EngineError};

/// Renders [`ToneProfile`]s and plays them through the shared engine.
///
/// Buffers are cached per profile and alternation variant, so repeated
/// alerts skip synthesis entirely. Volume is applied at the mix stage
/// rather than baked into the buffers, so the cache survives volume
/// changes. Each playback gets its own voice against the shared output;
/// overlapping plays never share mutable synthesis state.
pub struct TonePlayer {
    engine: AudioEngine,
    volume: f32,
    /// Tick/tock alternation, persisting for the player's lifetime.
    flip: bool,
    cache: HashMap<(&'static str, bool), Arc<[f32]>>,
    cached_rate: u32,
}

impl TonePlayer {
    pub fn new(engine: AudioEngine) -> Self {
        Self {
            engine,
            volume: 1.0,
            flip: false,
            cache: HashMap::new(),
            cached_rate: 0,
        }
    }

    pub fn engine(&self) -> &AudioEngine {
        &self.engine
    }

    /// Caller volume applied to every subsequent playback, clamped to 0..=1.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Render and cache `profile` ahead of playback so the first alert is
    /// not delayed by synthesis. Both alternation variants are warmed.
    pub fn preload(&mut self, profile: &ToneProfile) -> Result<(), EngineError> {
        let rate = self.rate()?;
        self.buffer_for(profile, false, rate);
        if profile.alternate_hz.is_some() {
            self.buffer_for(profile, true, rate);
        }
        Ok(())
    }

    /// Schedule one playback of `profile`. Returns once the voice is
    /// queued, not once audio has finished; failures are reported, never
    /// thrown.
    pub fn play(&mut self, profile: &ToneProfile) -> Result<(), EngineError> {
        let rate = self.rate()?;
        let flip = self.flip && profile.alternate_hz.is_some();
        if profile.alternate_hz.is_some() {
            self.flip = !self.flip;
        }
        let samples = self.buffer_for(profile, flip, rate);
        self.engine.play_buffer(samples, self.volume)
    }

    /// Boot the engine if needed; a device rate change invalidates the cache.
    fn rate(&mut self) -> Result<u32, EngineError> {
        let rate = self.engine.ensure()?;
        if rate != self.cached_rate {
            self.cache.clear();
            self.cached_rate = rate;
        }
        Ok(rate)
    }

    fn buffer_for(&mut self, profile: &ToneProfile, flip: bool, rate: u32) -> Arc<[f32]> {
        self.cache
            .entry((profile.name, flip))
            .or_insert_with(|| Arc::from(render_variant(profile, rate, flip)))
            .clone()
    }
}
