//! Tone profiles: named, immutable recipes for synthesized alert sounds.

use crate::envelope::{CurveKind, Envelope};

/// Oscillator shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

impl Waveform {
    /// Sample the waveform at `phase` (one cycle per whole unit). Output in [-1, 1].
    pub fn sample(self, phase: f32) -> f32 {
        let p = phase - libm::floorf(phase);
        match self {
            Waveform::Sine => libm::sinf(p * core::f32::consts::TAU),
            Waveform::Triangle => {
                // 0 → 1 → -1 → 0 over one cycle
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// Frequency behavior over a tone's lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PitchCurve {
    /// Fixed frequency.
    Constant(f32),
    /// Linear glide from `start_hz` to `end_hz` over the tone's duration.
    Glide { start_hz: f32, end_hz: f32 },
    /// Sinusoidal wobble around `center_hz`.
    Wobble {
        center_hz: f32,
        depth_hz: f32,
        rate_hz: f32,
    },
}

impl PitchCurve {
    /// Instantaneous frequency at `progress` (0.0..1.0 through the tone)
    /// and `t_secs` since the tone began.
    pub fn freq_at(self, progress: f32, t_secs: f32) -> f32 {
        match self {
            PitchCurve::Constant(hz) => hz,
            PitchCurve::Glide { start_hz, end_hz } => start_hz + (end_hz - start_hz) * progress,
            PitchCurve::Wobble {
                center_hz,
                depth_hz,
                rate_hz,
            } => center_hz + depth_hz * libm::sinf(core::f32::consts::TAU * rate_hz * t_secs),
        }
    }

    /// The same curve transposed so its reference frequency becomes `hz`.
    /// Used for tick/tock alternation.
    pub fn with_base(self, hz: f32) -> Self {
        match self {
            PitchCurve::Constant(_) => PitchCurve::Constant(hz),
            PitchCurve::Glide { start_hz, end_hz } => PitchCurve::Glide {
                start_hz: hz,
                end_hz: hz * (end_hz / start_hz),
            },
            PitchCurve::Wobble {
                depth_hz, rate_hz, ..
            } => PitchCurve::Wobble {
                center_hz: hz,
                depth_hz,
                rate_hz,
            },
        }
    }
}

/// A named waveform recipe: shape, pitch behavior, envelope, and duration.
///
/// Profiles are immutable; user settings select one and hand it to the
/// player. `name` doubles as the preload cache key.
#[derive(Clone, Debug, PartialEq)]
pub struct ToneProfile {
    pub name: &'static str,
    pub waveform: Waveform,
    pub pitch: PitchCurve,
    pub envelope: Envelope,
    pub duration_ms: u32,
    /// Sibling base frequency for metronome-style tick/tock alternation.
    pub alternate_hz: Option<f32>,
}

impl ToneProfile {
    /// Short high blip used by the accelerating alert ramp.
    pub fn beep() -> Self {
        Self {
            name: "beep",
            waveform: Waveform::Sine,
            pitch: PitchCurve::Constant(880.0),
            envelope: Envelope::attack_decay(3.0, 70.0, CurveKind::Exponential(-4.0)),
            duration_ms: 70,
            alternate_hz: None,
        }
    }

    /// Woodblock-style tick/tock pair; alternates on successive plays.
    pub fn metronome() -> Self {
        Self {
            name: "metronome",
            waveform: Waveform::Triangle,
            pitch: PitchCurve::Constant(1_100.0),
            envelope: Envelope::attack_decay(2.0, 55.0, CurveKind::Exponential(-6.0)),
            duration_ms: 55,
            alternate_hz: Some(880.0),
        }
    }

    /// Soft falling chime for gentler alert settings.
    pub fn chime() -> Self {
        Self {
            name: "chime",
            waveform: Waveform::Sine,
            pitch: PitchCurve::Glide {
                start_hz: 1_318.5,
                end_hz: 1_046.5,
            },
            envelope: Envelope::adsr(4.0, 60.0, 0.4, 160.0, 280.0),
            duration_ms: 280,
            alternate_hz: None,
        }
    }

    /// Wobbling siren for the frantic alert setting.
    pub fn siren() -> Self {
        Self {
            name: "siren",
            waveform: Waveform::Triangle,
            pitch: PitchCurve::Wobble {
                center_hz: 700.0,
                depth_hz: 120.0,
                rate_hz: 9.0,
            },
            envelope: Envelope::adsr(4.0, 40.0, 0.9, 120.0, 450.0),
            duration_ms: 450,
            alternate_hz: None,
        }
    }

    /// End-of-round buzzer: low square sweep, impossible to miss.
    pub fn buzzer() -> Self {
        Self {
            name: "buzzer",
            waveform: Waveform::Square,
            pitch: PitchCurve::Glide {
                start_hz: 220.0,
                end_hz: 110.0,
            },
            envelope: Envelope::adsr(5.0, 80.0, 0.8, 250.0, 700.0),
            duration_ms: 700,
            alternate_hz: None,
        }
    }

    /// Rising blip confirming round start.
    pub fn ready_blip() -> Self {
        Self {
            name: "ready",
            waveform: Waveform::Sine,
            pitch: PitchCurve::Glide {
                start_hz: 523.25,
                end_hz: 784.0,
            },
            envelope: Envelope::attack_decay(3.0, 120.0, CurveKind::Linear),
            duration_ms: 120,
            alternate_hz: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_hits_quarter_points() {
        assert!(Waveform::Sine.sample(0.0).abs() < 1e-6);
        assert!((Waveform::Sine.sample(0.25) - 1.0).abs() < 1e-6);
        assert!((Waveform::Sine.sample(0.75) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn triangle_hits_extremes() {
        assert_eq!(Waveform::Triangle.sample(0.0), 0.0);
        assert_eq!(Waveform::Triangle.sample(0.25), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.75), -1.0);
    }

    #[test]
    fn square_is_two_valued() {
        assert_eq!(Waveform::Square.sample(0.1), 1.0);
        assert_eq!(Waveform::Square.sample(0.6), -1.0);
    }

    #[test]
    fn waveforms_wrap_past_one_cycle() {
        for shape in [Waveform::Sine, Waveform::Triangle, Waveform::Square] {
            assert!((shape.sample(3.4) - shape.sample(0.4)).abs() < 1e-3);
        }
    }

    #[test]
    fn constant_pitch_ignores_time() {
        let pitch = PitchCurve::Constant(440.0);
        assert_eq!(pitch.freq_at(0.0, 0.0), 440.0);
        assert_eq!(pitch.freq_at(0.9, 3.0), 440.0);
    }

    #[test]
    fn glide_interpolates_linearly() {
        let pitch = PitchCurve::Glide {
            start_hz: 200.0,
            end_hz: 100.0,
        };
        assert_eq!(pitch.freq_at(0.0, 0.0), 200.0);
        assert_eq!(pitch.freq_at(0.5, 0.0), 150.0);
        assert_eq!(pitch.freq_at(1.0, 0.0), 100.0);
    }

    #[test]
    fn wobble_stays_within_depth() {
        let pitch = PitchCurve::Wobble {
            center_hz: 700.0,
            depth_hz: 120.0,
            rate_hz: 9.0,
        };
        for i in 0..200 {
            let f = pitch.freq_at(0.0, i as f32 * 0.005);
            assert!((580.0..=820.0).contains(&f));
        }
    }

    #[test]
    fn with_base_preserves_glide_ratio() {
        let pitch = PitchCurve::Glide {
            start_hz: 200.0,
            end_hz: 100.0,
        };
        match pitch.with_base(400.0) {
            PitchCurve::Glide { start_hz, end_hz } => {
                assert_eq!(start_hz, 400.0);
                assert_eq!(end_hz, 200.0);
            }
            other => panic!("unexpected curve {:?}", other),
        }
    }

    #[test]
    fn presets_have_distinct_cache_names() {
        let presets = [
            ToneProfile::beep(),
            ToneProfile::metronome(),
            ToneProfile::chime(),
            ToneProfile::siren(),
            ToneProfile::buzzer(),
            ToneProfile::ready_blip(),
        ];
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn only_metronome_alternates() {
        assert!(ToneProfile::metronome().alternate_hz.is_some());
        assert!(ToneProfile::beep().alternate_hz.is_none());
        assert!(ToneProfile::buzzer().alternate_hz.is_none());
    }
}
