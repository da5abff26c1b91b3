//! Shared audio engine handle.
//!
//! One output pipeline per process: the first play request boots a
//! dedicated audio thread that owns the backend, and every handle clone
//! feeds it commands. The engine is never torn down mid-session; it lives
//! until process exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, OnceLock};

use crate::sink::{AudioSink, Voice};
use crate::{CpalSink, EngineError};

enum Command {
    Play(Voice),
    SetGain(f32),
    Resume,
    Suspend,
}

type SinkFactory = Box<dyn FnOnce() -> Result<Box<dyn AudioSink>, EngineError> + Send>;

/// Cheaply clonable handle to the process-shared audio output.
///
/// Construction is free; the underlying pipeline boots on the first play
/// or preload. Boot happens exactly once even under concurrent first-call
/// races, and a boot failure (no device at all) is sticky `Unavailable`.
#[derive(Clone)]
pub struct AudioEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    boot: OnceLock<Option<Link>>,
    factory: Mutex<Option<SinkFactory>>,
    /// Suspension is tracked here so `play` can attempt a resume before
    /// queueing, per the platform audio-policy contract.
    suspended: AtomicBool,
}

struct Link {
    tx: Mutex<Sender<Command>>,
    sample_rate: u32,
}

impl Link {
    fn send(&self, command: Command) -> Result<(), EngineError> {
        self.tx
            .lock()
            .unwrap()
            .send(command)
            .map_err(|_| EngineError::Stream("audio thread terminated".into()))
    }
}

impl AudioEngine {
    /// Engine backed by the default output device.
    pub fn new() -> Self {
        Self::with_factory(Box::new(|| {
            CpalSink::new().map(|sink| Box::new(sink) as Box<dyn AudioSink>)
        }))
    }

    /// Engine over a custom backend (tests, offline hosts).
    pub fn with_sink<S>(sink: S) -> Self
    where
        S: AudioSink + Send + 'static,
    {
        Self::with_factory(Box::new(move || Ok(Box::new(sink) as Box<dyn AudioSink>)))
    }

    /// Engine that reports `Unavailable` on every request (sound off).
    pub fn disabled() -> Self {
        Self::with_factory(Box::new(|| Err(EngineError::Unavailable)))
    }

    fn with_factory(factory: SinkFactory) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                boot: OnceLock::new(),
                factory: Mutex::new(Some(factory)),
                suspended: AtomicBool::new(false),
            }),
        }
    }

    /// Boot if needed and return the output sample rate.
    pub fn ensure(&self) -> Result<u32, EngineError> {
        self.link().map(|link| link.sample_rate)
    }

    /// Output sample rate, if the engine has booted successfully.
    pub fn sample_rate(&self) -> Option<u32> {
        self.inner
            .boot
            .get()
            .and_then(|link| link.as_ref())
            .map(|link| link.sample_rate)
    }

    /// Queue a rendered buffer for playback. Boots the engine on first use
    /// and attempts a resume first whenever the output is suspended.
    pub fn play_buffer(&self, samples: Arc<[f32]>, gain: f32) -> Result<(), EngineError> {
        if self.inner.suspended.load(Ordering::Relaxed) {
            self.resume()?;
        }
        self.link()?.send(Command::Play(Voice { samples, gain }))
    }

    /// Resume a suspended output.
    pub fn resume(&self) -> Result<(), EngineError> {
        self.link()?.send(Command::Resume)?;
        self.inner.suspended.store(false, Ordering::Relaxed);
        Ok(())
    }

    /// Suspend the output (host audio-policy hook).
    pub fn suspend(&self) -> Result<(), EngineError> {
        self.link()?.send(Command::Suspend)?;
        self.inner.suspended.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Master volume on the shared gain stage, clamped to 0..=1.
    pub fn set_master_volume(&self, volume: f32) -> Result<(), EngineError> {
        self.link()?.send(Command::SetGain(volume.clamp(0.0, 1.0)))
    }

    fn link(&self) -> Result<&Link, EngineError> {
        let link = self.inner.boot.get_or_init(|| {
            let factory = self.inner.factory.lock().unwrap().take()?;
            boot(factory)
        });
        link.as_ref().ok_or(EngineError::Unavailable)
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the audio thread and wait for it to report its sample rate.
/// The sink is built on that thread because stream handles are not `Send`.
fn boot(factory: SinkFactory) -> Option<Link> {
    let (tx, rx) = mpsc::channel::<Command>();
    let (ready_tx, ready_rx) = mpsc::channel();

    std::thread::spawn(move || match factory() {
        Ok(mut sink) => {
            let _ = ready_tx.send(Ok(sink.sample_rate()));
            while let Ok(command) = rx.recv() {
                let outcome = match command {
                    Command::Play(voice) => sink.enqueue(voice),
                    Command::SetGain(gain) => {
                        sink.set_master_gain(gain);
                        Ok(())
                    }
                    Command::Resume => sink.resume(),
                    Command::Suspend => sink.suspend(),
                };
                if let Err(err) = outcome {
                    log::warn!("audio backend: {}", err);
                }
            }
        }
        Err(err) => {
            let _ = ready_tx.send(Err(err));
        }
    });

    match ready_rx.recv() {
        Ok(Ok(sample_rate)) => Some(Link {
            tx: Mutex::new(tx),
            sample_rate,
        }),
        Ok(Err(err)) => {
            log::warn!("audio engine unavailable: {}", err);
            None
        }
        Err(_) => {
            log::warn!("audio engine thread died during boot");
            None
        }
    }
}
