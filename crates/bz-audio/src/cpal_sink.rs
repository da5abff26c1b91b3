//! CPAL-based output backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::sink::{AudioSink, Voice};
use crate::EngineError;

/// Maximum simultaneous one-shot voices in the mixer.
const MAX_VOICES: usize = 16;

/// Queue depth for voices in flight between `enqueue` and the callback.
const VOICE_QUEUE: usize = 32;

/// CPAL output mixing one-shot voices inside the stream callback.
///
/// Voices travel through a lock-free SPSC ring; the callback owns a fixed
/// array of playback slots and never locks or allocates.
pub struct CpalSink {
    config: StreamConfig,
    stream: Option<Stream>,
    producer: HeapProd<Voice>,
    master_gain: Arc<AtomicU32>,
    suspended: bool,
}

struct Slot {
    voice: Voice,
    pos: usize,
}

impl CpalSink {
    /// Open the default output device and start the mixer stream.
    pub fn new() -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(EngineError::Unavailable)?;

        let config = device
            .default_output_config()
            .map_err(|e| EngineError::Stream(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        // Force stereo output — mono voices are duplicated to both channels
        config.channels = 2;

        let rb = HeapRb::<Voice>::new(VOICE_QUEUE);
        let (producer, consumer) = rb.split();
        let master_gain = Arc::new(AtomicU32::new(1.0f32.to_bits()));

        let stream = build_stream(&device, &config, consumer, master_gain.clone())?;
        stream
            .play()
            .map_err(|e| EngineError::Stream(e.to_string()))?;

        Ok(Self {
            config,
            stream: Some(stream),
            producer,
            master_gain,
            suspended: false,
        })
    }
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    mut consumer: HeapCons<Voice>,
    master_gain: Arc<AtomicU32>,
) -> Result<Stream, EngineError> {
    let channels = config.channels as usize;
    let mut slots: Vec<Option<Slot>> = (0..MAX_VOICES).map(|_| None).collect();

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // Admit newly queued voices before mixing this buffer
                while let Some(voice) = consumer.try_pop() {
                    admit(&mut slots, voice);
                }

                let gain = f32::from_bits(master_gain.load(Ordering::Relaxed));
                for frame in data.chunks_mut(channels) {
                    let mut mixed = 0.0f32;
                    for slot in slots.iter_mut() {
                        if let Some(playing) = slot {
                            if let Some(&sample) = playing.voice.samples.get(playing.pos) {
                                mixed += sample * playing.voice.gain;
                                playing.pos += 1;
                            } else {
                                *slot = None;
                            }
                        }
                    }
                    let out = (mixed * gain).clamp(-1.0, 1.0);
                    for sample in frame.iter_mut() {
                        *sample = out;
                    }
                }
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )
        .map_err(|e| EngineError::Stream(e.to_string()))
}

/// Place a voice in a free slot, stealing the most-finished one when full.
fn admit(slots: &mut [Option<Slot>], voice: Voice) {
    if let Some(free) = slots.iter_mut().find(|slot| slot.is_none()) {
        *free = Some(Slot { voice, pos: 0 });
        return;
    }
    if let Some(victim) = slots
        .iter_mut()
        .max_by_key(|slot| slot.as_ref().map_or(0, |playing| playing.pos))
    {
        *victim = Some(Slot { voice, pos: 0 });
    }
}

impl AudioSink for CpalSink {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn enqueue(&mut self, voice: Voice) -> Result<(), EngineError> {
        if self.suspended {
            return Err(EngineError::Suspended);
        }
        self.producer
            .try_push(voice)
            .map_err(|_| EngineError::Stream("voice queue full".into()))
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master_gain
            .store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|e| EngineError::Stream(e.to_string()))?;
        }
        self.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), EngineError> {
        if let Some(stream) = &self.stream {
            stream
                .pause()
                .map_err(|e| EngineError::Stream(e.to_string()))?;
        }
        self.suspended = true;
        Ok(())
    }
}
