//! Procedural tone rendering.
//!
//! Turns a [`ToneProfile`] into a mono sample buffer: a phase-accumulator
//! oscillator under the profile's pitch curve, shaped per sample by its
//! amplitude envelope. No prerecorded assets anywhere.

use alloc::vec::Vec;

use bz_core::{EnvelopeCursor, ToneProfile};

/// Fixed scale applied to every rendered buffer, leaving room for
/// overlapping voices at the mix stage.
pub const HEADROOM: f32 = 0.85;

/// Renders tone profiles into sample buffers.
///
/// Alternating (tick/tock) profiles swap base frequency on successive
/// renders; that flip state lives here for the synth's lifetime.
#[derive(Clone, Debug)]
pub struct ToneSynth {
    sample_rate: u32,
    flip: bool,
}

impl ToneSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            flip: false,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Render one playback of `profile`, advancing alternation state.
    pub fn render(&mut self, profile: &ToneProfile) -> Vec<f32> {
        let flip = self.flip && profile.alternate_hz.is_some();
        if profile.alternate_hz.is_some() {
            self.flip = !self.flip;
        }
        render_variant(profile, self.sample_rate, flip)
    }
}

/// Render one variant of `profile` without touching alternation state.
/// `flip` selects the alternate (tock) frequency when the profile has one.
pub fn render_variant(profile: &ToneProfile, sample_rate: u32, flip: bool) -> Vec<f32> {
    let pitch = match (flip, profile.alternate_hz) {
        (true, Some(alt_hz)) => profile.pitch.with_base(alt_hz),
        _ => profile.pitch,
    };

    let frames = (profile.duration_ms as u64 * sample_rate as u64 / 1_000) as usize;
    let dt = 1.0 / sample_rate as f32;
    let total_secs = profile.duration_ms as f32 / 1_000.0;

    let mut cursor = EnvelopeCursor::new(&profile.envelope);
    let mut buf = Vec::with_capacity(frames);
    let mut phase = 0.0f32;

    for i in 0..frames {
        let t = i as f32 * dt;
        let progress = if total_secs > 0.0 { t / total_secs } else { 1.0 };
        let freq = pitch.freq_at(progress, t);
        // Accumulating phase keeps gliding pitches free of discontinuities
        phase += freq * dt;
        let raw = profile.waveform.sample(phase);
        let gain = cursor.gain_at(t * 1_000.0);
        buf.push(raw * gain * HEADROOM);
    }

    buf
}
