//! Amplitude envelopes for synthesized tones.
//!
//! An `Envelope` is a piecewise gain curve over milliseconds, encoded as
//! breakpoints with interpolation curves. Every constructor opens with a
//! short linear attack from zero so playback never begins at a
//! sample-domain discontinuity (an audible click).

use arrayvec::ArrayVec;

/// Maximum breakpoints per envelope. ADSR needs five; nothing here needs more.
pub const MAX_POINTS: usize = 8;

/// Shortest permitted attack. Anything faster clicks.
const MIN_ATTACK_MS: f32 = 2.0;

/// A piecewise gain curve over time.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Breakpoints defining the curve.
    /// The first point's `dt_ms` is ignored (it sits at t = 0).
    pub points: ArrayVec<EnvPoint, MAX_POINTS>,
}

/// A breakpoint in an amplitude envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvPoint {
    /// Milliseconds from the previous point (0 for the first).
    pub dt_ms: f32,
    /// Gain at this point, 0.0..=1.0.
    pub gain: f32,
    /// How to interpolate FROM this point TO the next.
    pub curve: CurveKind,
}

impl EnvPoint {
    pub fn new(dt_ms: f32, gain: f32, curve: CurveKind) -> Self {
        Self { dt_ms, gain, curve }
    }
}

/// Interpolation curve between two breakpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CurveKind {
    /// Hold this gain until the next point.
    Step,
    /// Straight line to the next point.
    Linear,
    /// Exponential curve. >0 starts slow; <0 starts fast (percussive decay).
    Exponential(f32),
}

/// Interpolate between two gains using the given curve at position `t` (0.0..1.0).
pub fn interpolate(curve: CurveKind, from: f32, to: f32, t: f32) -> f32 {
    let factor = match curve {
        CurveKind::Step => 0.0,
        CurveKind::Linear => t,
        CurveKind::Exponential(k) => {
            if k.abs() < 1e-6 {
                t // degenerate to linear
            } else {
                (libm::expf(k * t) - 1.0) / (libm::expf(k) - 1.0)
            }
        }
    };
    from + (to - from) * factor
}

impl Envelope {
    /// Build from a slice of breakpoints (skipping any past `MAX_POINTS`).
    pub fn from_points(pts: &[EnvPoint]) -> Self {
        let mut points = ArrayVec::new();
        for p in pts.iter().take(MAX_POINTS) {
            points.push(*p);
        }
        Self { points }
    }

    /// Linear attack to full gain, then a single decay to silence filling
    /// the rest of `total_ms`.
    pub fn attack_decay(attack_ms: f32, total_ms: f32, decay: CurveKind) -> Self {
        let attack = attack_ms.max(MIN_ATTACK_MS).min(total_ms * 0.5);
        Self::from_points(&[
            EnvPoint::new(0.0, 0.0, CurveKind::Linear),
            EnvPoint::new(attack, 1.0, decay),
            EnvPoint::new((total_ms - attack).max(0.0), 0.0, CurveKind::Step),
        ])
    }

    /// Four-segment attack/decay/sustain/release shape over `total_ms`.
    ///
    /// Segments that do not fit are squeezed against the sustain hold, which
    /// shrinks to zero before anything else is shortened.
    pub fn adsr(attack_ms: f32, decay_ms: f32, sustain: f32, release_ms: f32, total_ms: f32) -> Self {
        let attack = attack_ms.max(MIN_ATTACK_MS);
        let sustain = sustain.clamp(0.0, 1.0);
        let hold = (total_ms - attack - decay_ms - release_ms).max(0.0);
        Self::from_points(&[
            EnvPoint::new(0.0, 0.0, CurveKind::Linear),
            EnvPoint::new(attack, 1.0, CurveKind::Exponential(-3.0)),
            EnvPoint::new(decay_ms.max(0.0), sustain, CurveKind::Step),
            EnvPoint::new(hold, sustain, CurveKind::Linear),
            EnvPoint::new(release_ms.max(0.0), 0.0, CurveKind::Step),
        ])
    }

    /// Gain at `t_ms`, scanning from the start. For render loops prefer an
    /// [`EnvelopeCursor`], which advances in one direction without rescans.
    pub fn gain_at(&self, t_ms: f32) -> f32 {
        EnvelopeCursor::new(self).gain_at(t_ms)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Sequential evaluator for a render loop.
///
/// Calls must not move backwards in time; the cursor walks segments forward
/// as `t_ms` advances and never rescans from the start.
#[derive(Clone, Debug)]
pub struct EnvelopeCursor<'a> {
    env: &'a Envelope,
    segment: usize,
    seg_start_ms: f32,
}

impl<'a> EnvelopeCursor<'a> {
    pub fn new(env: &'a Envelope) -> Self {
        Self {
            env,
            segment: 0,
            seg_start_ms: 0.0,
        }
    }

    /// Gain at `t_ms`. Holds the final breakpoint's gain past the end.
    pub fn gain_at(&mut self, t_ms: f32) -> f32 {
        if self.env.points.is_empty() {
            return 0.0;
        }
        loop {
            let next_idx = self.segment + 1;
            let Some(next) = self.env.points.get(next_idx) else {
                return self.env.points[self.segment].gain;
            };

            let seg_end = self.seg_start_ms + next.dt_ms;
            if t_ms >= seg_end {
                self.segment = next_idx;
                self.seg_start_ms = seg_end;
                continue;
            }

            let from = &self.env.points[self.segment];
            let t = (t_ms - self.seg_start_ms) / next.dt_ms;
            return interpolate(from.curve, from.gain, next.gain, t.clamp(0.0, 1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_step_holds_value() {
        assert_eq!(interpolate(CurveKind::Step, 0.2, 1.0, 0.0), 0.2);
        assert_eq!(interpolate(CurveKind::Step, 0.2, 1.0, 0.5), 0.2);
        assert_eq!(interpolate(CurveKind::Step, 0.2, 1.0, 0.99), 0.2);
    }

    #[test]
    fn interpolate_linear_midpoint() {
        assert_eq!(interpolate(CurveKind::Linear, 0.0, 1.0, 0.5), 0.5);
        assert_eq!(interpolate(CurveKind::Linear, 0.0, 1.0, 1.0), 1.0);
    }

    #[test]
    fn interpolate_exponential_zero_is_linear() {
        let exp = interpolate(CurveKind::Exponential(0.0), 0.0, 1.0, 0.5);
        assert!((exp - 0.5).abs() < 0.01);
    }

    #[test]
    fn interpolate_exponential_negative_starts_fast() {
        let mid = interpolate(CurveKind::Exponential(-3.0), 1.0, 0.0, 0.5);
        // Percussive decay: well below the linear midpoint by half time
        assert!(mid < 0.5, "got {}", mid);
    }

    #[test]
    fn attack_decay_starts_at_zero() {
        let env = Envelope::attack_decay(3.0, 100.0, CurveKind::Linear);
        assert_eq!(env.gain_at(0.0), 0.0);
    }

    #[test]
    fn attack_decay_peaks_after_attack() {
        let env = Envelope::attack_decay(3.0, 100.0, CurveKind::Linear);
        assert!((env.gain_at(3.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn attack_decay_ends_near_zero() {
        let env = Envelope::attack_decay(3.0, 100.0, CurveKind::Linear);
        assert!(env.gain_at(99.9) < 0.01);
        assert!(env.gain_at(150.0) < 0.01);
    }

    #[test]
    fn attack_is_never_shorter_than_minimum() {
        let env = Envelope::attack_decay(0.0, 100.0, CurveKind::Linear);
        // Sub-millisecond attacks click; gain must still be rising at 1 ms
        assert!(env.gain_at(1.0) < 1.0);
        assert!(env.gain_at(1.0) > 0.0);
    }

    #[test]
    fn adsr_sustains_between_decay_and_release() {
        let env = Envelope::adsr(2.0, 20.0, 0.6, 30.0, 100.0);
        let mid = env.gain_at(50.0);
        assert!((mid - 0.6).abs() < 0.05, "got {}", mid);
    }

    #[test]
    fn adsr_releases_to_zero() {
        let env = Envelope::adsr(2.0, 20.0, 0.6, 30.0, 100.0);
        assert!(env.gain_at(99.9) < 0.05);
    }

    #[test]
    fn adsr_with_oversized_segments_still_ends_at_zero() {
        let env = Envelope::adsr(2.0, 80.0, 0.5, 80.0, 100.0);
        assert!(env.gain_at(200.0) < 0.01);
    }

    #[test]
    fn cursor_matches_scan_evaluation() {
        let env = Envelope::adsr(2.0, 20.0, 0.6, 30.0, 100.0);
        let mut cursor = EnvelopeCursor::new(&env);
        for i in 0..1_000 {
            let t = i as f32 * 0.1;
            let by_cursor = cursor.gain_at(t);
            let by_scan = env.gain_at(t);
            assert!(
                (by_cursor - by_scan).abs() < 1e-6,
                "diverged at {} ms: {} vs {}",
                t,
                by_cursor,
                by_scan
            );
        }
    }

    #[test]
    fn empty_envelope_is_silent() {
        let env = Envelope::from_points(&[]);
        assert_eq!(env.gain_at(10.0), 0.0);
    }

    #[test]
    fn single_point_holds_gain() {
        let env = Envelope::from_points(&[EnvPoint::new(0.0, 0.4, CurveKind::Linear)]);
        assert_eq!(env.gain_at(0.0), 0.4);
        assert_eq!(env.gain_at(500.0), 0.4);
    }
}
