//! Output backend trait and one-shot voices.

use std::sync::{Arc, Mutex};

use crate::EngineError;

/// A rendered buffer queued for one playback.
#[derive(Clone, Debug)]
pub struct Voice {
    /// Mono samples; shared so enqueueing never copies audio data.
    pub samples: Arc<[f32]>,
    /// Per-voice gain (the caller's volume), 0.0..=1.0.
    pub gain: f32,
}

/// Trait for audio output backends.
///
/// A sink lives on the engine's audio thread and mixes the one-shot voices
/// it is handed; it is never shared across threads directly.
pub trait AudioSink {
    /// Output sample rate.
    fn sample_rate(&self) -> u32;

    /// Queue a one-shot voice for immediate playback.
    fn enqueue(&mut self, voice: Voice) -> Result<(), EngineError>;

    /// Master gain applied to the mixed output, 0.0..=1.0.
    fn set_master_gain(&mut self, gain: f32);

    /// Resume a suspended output.
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Suspend output (host audio-policy hook).
    fn suspend(&mut self) -> Result<(), EngineError>;
}

/// Capture backend for tests: records voices instead of playing them.
/// Clones share state, so a test can keep a handle after the engine takes
/// the sink.
#[derive(Clone, Debug, Default)]
pub struct NullSink {
    sample_rate: u32,
    shared: Arc<Mutex<NullState>>,
}

#[derive(Debug, Default)]
struct NullState {
    voices: Vec<Voice>,
    suspended: bool,
    master_gain: f32,
}

impl NullSink {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            shared: Arc::new(Mutex::new(NullState {
                voices: Vec::new(),
                suspended: false,
                master_gain: 1.0,
            })),
        }
    }

    pub fn voice_count(&self) -> usize {
        self.shared.lock().unwrap().voices.len()
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.shared.lock().unwrap().voices.clone()
    }

    pub fn is_suspended(&self) -> bool {
        self.shared.lock().unwrap().suspended
    }

    pub fn master_gain(&self) -> f32 {
        self.shared.lock().unwrap().master_gain
    }
}

impl AudioSink for NullSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn enqueue(&mut self, voice: Voice) -> Result<(), EngineError> {
        let mut state = self.shared.lock().unwrap();
        if state.suspended {
            return Err(EngineError::Suspended);
        }
        state.voices.push(voice);
        Ok(())
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.shared.lock().unwrap().master_gain = gain.clamp(0.0, 1.0);
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.shared.lock().unwrap().suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), EngineError> {
        self.shared.lock().unwrap().suspended = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(gain: f32) -> Voice {
        Voice {
            samples: Arc::from(vec![0.0f32; 8]),
            gain,
        }
    }

    #[test]
    fn null_sink_records_voices() {
        let sink = NullSink::new(48_000);
        let mut handle = sink.clone();
        handle.enqueue(voice(0.5)).unwrap();
        handle.enqueue(voice(1.0)).unwrap();
        assert_eq!(sink.voice_count(), 2);
        assert_eq!(sink.voices()[0].gain, 0.5);
    }

    #[test]
    fn suspended_sink_rejects_until_resumed() {
        let sink = NullSink::new(48_000);
        let mut handle = sink.clone();
        handle.suspend().unwrap();
        assert_eq!(handle.enqueue(voice(1.0)), Err(EngineError::Suspended));
        handle.resume().unwrap();
        assert!(handle.enqueue(voice(1.0)).is_ok());
        assert_eq!(sink.voice_count(), 1);
    }
}
