//! Headless round controller for buzzclock.
//!
//! [`RoundTimer`] owns a round's countdown clock, alert scheduler, and
//! sounds, and drives them from a fixed-cadence ticker thread. The game's
//! UI calls `start`/`pause`/`resume`/`stop` in lockstep with its own pause
//! state and observes the round through registered callbacks and cheap
//! atomic accessors.

mod wav;

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bz_core::{MonotonicTime, RampConfig, TimeSource, ToneProfile};
use bz_engine::{AlertRamp, CountdownClock, Ticker};

// Re-export the playback surface so callers don't need bz-audio directly.
pub use bz_audio::{AudioEngine, EngineError, TonePlayer};
pub use wav::{samples_to_wav, write_wav};

/// Re-evaluation cadence while a round is running.
pub const FRAME_MS: u64 = 16;

type TickFn = Box<dyn FnMut(u64) + Send>;
type EventFn = Box<dyn FnMut() + Send>;

#[derive(Default)]
struct Callbacks {
    tick: Option<TickFn>,
    complete: Option<EventFn>,
    fire: Option<EventFn>,
}

struct State {
    clock: CountdownClock,
    ramp: AlertRamp,
    alert_profile: ToneProfile,
    completion_profile: Option<ToneProfile>,
}

/// State shared with the ticker thread. Control methods lock `state`;
/// accessors read the published atomics without locking.
struct Shared {
    state: Mutex<State>,
    remaining_ms: AtomicU64,
    running: AtomicBool,
    paused: AtomicBool,
    ramp_active: AtomicBool,
    beep_count: AtomicU32,
    interval_ms: AtomicU64,
}

impl Shared {
    fn publish(&self, state: &State, now: u64) {
        self.remaining_ms
            .store(state.clock.remaining_ms(now), Ordering::Relaxed);
        self.running
            .store(state.clock.is_running(), Ordering::Relaxed);
        self.paused.store(state.clock.is_paused(), Ordering::Relaxed);
        self.ramp_active
            .store(state.ramp.is_active(), Ordering::Relaxed);
        self.beep_count
            .store(state.ramp.beep_count(), Ordering::Relaxed);
        self.interval_ms
            .store(state.ramp.current_interval_ms(), Ordering::Relaxed);
    }
}

/// Round timer: drift-corrected countdown plus escalating audio alerts.
///
/// A round proceeds even when audio is unavailable: playback failures are
/// logged and swallowed, never raised to the caller mid-round.
pub struct RoundTimer {
    shared: Arc<Shared>,
    callbacks: Arc<Mutex<Callbacks>>,
    time: Arc<dyn TimeSource + Send + Sync>,
    player: Option<Arc<Mutex<TonePlayer>>>,
    ticker: Option<Ticker>,
}

impl RoundTimer {
    /// Timer over the real monotonic clock.
    pub fn new(duration: Duration, config: RampConfig) -> Self {
        Self::with_time(duration, config, Arc::new(MonotonicTime::new()))
    }

    /// Timer over an injected time source (tests drive a `ManualTime`).
    pub fn with_time(
        duration: Duration,
        config: RampConfig,
        time: Arc<dyn TimeSource + Send + Sync>,
    ) -> Self {
        let duration_ms = duration.as_millis() as u64;
        let ramp = AlertRamp::new(config);
        let interval_ms = ramp.current_interval_ms();
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                clock: CountdownClock::new(duration_ms),
                ramp,
                alert_profile: ToneProfile::beep(),
                completion_profile: Some(ToneProfile::buzzer()),
            }),
            remaining_ms: AtomicU64::new(duration_ms),
            running: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            ramp_active: AtomicBool::new(false),
            beep_count: AtomicU32::new(0),
            interval_ms: AtomicU64::new(interval_ms),
        });
        Self {
            shared,
            callbacks: Arc::new(Mutex::new(Callbacks::default())),
            time,
            player: None,
            ticker: None,
        }
    }

    // --- Wiring (before the round starts) ---

    /// Attach the player used for alert and completion sounds.
    pub fn attach_player(&mut self, player: TonePlayer) {
        self.player = Some(Arc::new(Mutex::new(player)));
    }

    /// Sound played on every ramp fire. Selected by user settings.
    pub fn set_alert_profile(&self, profile: ToneProfile) {
        self.shared.state.lock().unwrap().alert_profile = profile;
    }

    /// Sound played when the countdown reaches zero; `None` for silence.
    pub fn set_completion_profile(&self, profile: Option<ToneProfile>) {
        self.shared.state.lock().unwrap().completion_profile = profile;
    }

    /// Caller volume for all round sounds, clamped to 0..=1.
    pub fn set_volume(&self, volume: f32) {
        if let Some(player) = &self.player {
            player.lock().unwrap().set_volume(volume);
        }
    }

    pub fn on_tick(&self, f: impl FnMut(u64) + Send + 'static) {
        self.callbacks.lock().unwrap().tick = Some(Box::new(f));
    }

    pub fn on_complete(&self, f: impl FnMut() + Send + 'static) {
        self.callbacks.lock().unwrap().complete = Some(Box::new(f));
    }

    pub fn on_fire(&self, f: impl FnMut() + Send + 'static) {
        self.callbacks.lock().unwrap().fire = Some(Box::new(f));
    }

    // --- Lifecycle ---

    /// Begin the round. Idempotent while a round is in flight: exactly one
    /// ticker exists per run.
    pub fn start(&mut self) {
        let now = self.time.now_ms();
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.clock.is_running() {
                return;
            }
            state.clock.start(now);
            state.ramp.reset();
            self.shared.publish(&state, now);
        }
        self.spawn_ticker();
    }

    /// Freeze the countdown and cancel the pending re-evaluation.
    pub fn pause(&mut self) {
        let now = self.time.now_ms();
        {
            let mut state = self.shared.state.lock().unwrap();
            if !state.clock.is_running() || state.clock.is_paused() {
                return;
            }
            state.clock.pause(now);
            self.shared.publish(&state, now);
        }
        self.stop_ticker();
    }

    /// Continue a paused round. The alert cadence restarts from the current
    /// remaining time, so a long pause never bursts catch-up alerts.
    pub fn resume(&mut self) {
        let now = self.time.now_ms();
        {
            let mut state = self.shared.state.lock().unwrap();
            if !state.clock.is_running() || !state.clock.is_paused() {
                return;
            }
            state.clock.resume(now);
            let remaining = state.clock.remaining_ms(now);
            state.ramp.resync(remaining, now);
            self.shared.publish(&state, now);
        }
        self.spawn_ticker();
    }

    /// End the round and restore the full configured duration.
    pub fn stop(&mut self) {
        let now = self.time.now_ms();
        {
            let mut state = self.shared.state.lock().unwrap();
            state.clock.stop();
            state.ramp.reset();
            self.shared.publish(&state, now);
        }
        self.stop_ticker();
    }

    /// Stop and pick up any duration change made during the run.
    pub fn reset(&mut self) {
        let now = self.time.now_ms();
        {
            let mut state = self.shared.state.lock().unwrap();
            state.clock.reset();
            state.ramp.reset();
            self.shared.publish(&state, now);
        }
        self.stop_ticker();
    }

    /// Change the round duration. Immediate while stopped; deferred to the
    /// next reset while running.
    pub fn set_duration(&self, duration: Duration) {
        let now = self.time.now_ms();
        let mut state = self.shared.state.lock().unwrap();
        state.clock.set_duration(duration.as_millis() as u64);
        self.shared.publish(&state, now);
    }

    // --- Observation ---

    /// Whole seconds remaining, rounded up.
    pub fn time_remaining(&self) -> u64 {
        self.remaining_ms().div_ceil(1_000)
    }

    pub fn remaining_ms(&self) -> u64 {
        self.shared.remaining_ms.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Relaxed)
    }

    /// Whether the alert ramp is currently inside its zone.
    pub fn is_active(&self) -> bool {
        self.shared.ramp_active.load(Ordering::Relaxed)
    }

    /// Alerts fired since the ramp zone was last entered.
    pub fn beep_count(&self) -> u32 {
        self.shared.beep_count.load(Ordering::Relaxed)
    }

    pub fn current_interval_ms(&self) -> u64 {
        self.shared.interval_ms.load(Ordering::Relaxed)
    }

    // --- Direct sounds ---

    /// Play a one-off sound immediately (test buzzer, menu cues). Safe to
    /// call while a round runs; the voice mixes with any alert in flight.
    pub fn play_sound(&self, profile: &ToneProfile) -> Result<(), EngineError> {
        match &self.player {
            Some(player) => player.lock().unwrap().play(profile),
            None => Err(EngineError::Unavailable),
        }
    }

    fn spawn_ticker(&mut self) {
        self.stop_ticker();
        let shared = self.shared.clone();
        let callbacks = self.callbacks.clone();
        let player = self.player.clone();
        let time = self.time.clone();
        self.ticker = Some(Ticker::spawn(Duration::from_millis(FRAME_MS), move || {
            run_frame(&shared, &callbacks, player.as_deref(), time.now_ms())
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

/// One re-evaluation: poll the clock, advance the ramp, then run sounds and
/// callbacks outside the state lock. Returns `false` once the round
/// completes so the ticker self-terminates.
fn run_frame(
    shared: &Shared,
    callbacks: &Mutex<Callbacks>,
    player: Option<&Mutex<TonePlayer>>,
    now: u64,
) -> bool {
    let (poll, fired, alert, completion) = {
        let mut state = shared.state.lock().unwrap();
        let poll = state.clock.poll(now);
        let remaining = state.clock.remaining_ms(now);
        let fired = state.ramp.advance(remaining, now);
        let alert = if fired {
            Some(state.alert_profile.clone())
        } else {
            None
        };
        let completion = if poll.completed {
            state.completion_profile.clone()
        } else {
            None
        };
        shared.publish(&state, now);
        (poll, fired, alert, completion)
    };

    if let Some(profile) = alert {
        play_quiet(player, &profile);
    }
    if let Some(profile) = completion {
        play_quiet(player, &profile);
    }

    let mut cbs = callbacks.lock().unwrap();
    if fired {
        if let Some(f) = cbs.fire.as_mut() {
            f();
        }
    }
    if let Some(seconds) = poll.tick {
        if let Some(f) = cbs.tick.as_mut() {
            f(seconds);
        }
    }
    if poll.completed {
        if let Some(f) = cbs.complete.as_mut() {
            f();
        }
    }
    !poll.completed
}

/// Audio failure is cosmetic: log it and let the round continue silently.
fn play_quiet(player: Option<&Mutex<TonePlayer>>, profile: &ToneProfile) {
    if let Some(player) = player {
        if let Err(err) = player.lock().unwrap().play(profile) {
            log::warn!("alert sound failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bz_core::ManualTime;
    use std::time::Instant;

    fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition never held");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Advance manual time in small steps, giving the ticker a chance to
    /// observe each one.
    fn step_time(time: &ManualTime, total_ms: u64, step_ms: u64) {
        let mut advanced = 0;
        while advanced < total_ms {
            time.advance(step_ms);
            advanced += step_ms;
            std::thread::sleep(Duration::from_millis(3));
        }
    }

    fn counting_timer(
        duration: Duration,
        config: RampConfig,
        time: &ManualTime,
    ) -> (RoundTimer, Arc<AtomicU32>, Arc<AtomicU32>, Arc<AtomicU64>) {
        let timer = RoundTimer::with_time(duration, config, Arc::new(time.clone()));
        let completions = Arc::new(AtomicU32::new(0));
        let fires = Arc::new(AtomicU32::new(0));
        let last_tick = Arc::new(AtomicU64::new(u64::MAX));

        let c = completions.clone();
        timer.on_complete(move || {
            c.fetch_add(1, Ordering::Relaxed);
        });
        let f = fires.clone();
        timer.on_fire(move || {
            f.fetch_add(1, Ordering::Relaxed);
        });
        let t = last_tick.clone();
        timer.on_tick(move |seconds| {
            t.store(seconds, Ordering::Relaxed);
        });

        (timer, completions, fires, last_tick)
    }

    #[test]
    fn round_runs_to_completion_exactly_once() {
        let time = ManualTime::new();
        let (mut timer, completions, fires, last_tick) = counting_timer(
            Duration::from_secs(2),
            RampConfig {
                ramp_start_ms: 1_500,
                first_interval_ms: 300,
                final_interval_ms: 100,
                enabled: true,
            },
            &time,
        );

        timer.start();
        wait_for(|| timer.is_running());
        step_time(&time, 2_500, 50);
        wait_for(|| completions.load(Ordering::Relaxed) == 1);

        assert!(!timer.is_running());
        assert_eq!(timer.time_remaining(), 0);
        assert_eq!(last_tick.load(Ordering::Relaxed), 0);
        assert!(fires.load(Ordering::Relaxed) >= 1);

        // More time changes nothing: the loop self-terminated
        step_time(&time, 1_000, 100);
        assert_eq!(completions.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn start_is_idempotent() {
        let time = ManualTime::new();
        let (mut timer, completions, _, _) =
            counting_timer(Duration::from_secs(1), RampConfig::default(), &time);

        timer.start();
        timer.start();
        timer.start();
        step_time(&time, 1_500, 100);
        wait_for(|| completions.load(Ordering::Relaxed) == 1);
        assert_eq!(completions.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let time = ManualTime::new();
        let (mut timer, completions, _, _) =
            counting_timer(Duration::from_secs(2), RampConfig::default(), &time);

        timer.start();
        step_time(&time, 500, 100);
        wait_for(|| timer.remaining_ms() <= 1_500);

        timer.pause();
        assert!(timer.is_paused());
        let frozen = timer.remaining_ms();

        // A long wall-clock gap while paused must not leak into the round
        step_time(&time, 60_000, 10_000);
        assert_eq!(timer.remaining_ms(), frozen);
        assert_eq!(completions.load(Ordering::Relaxed), 0);

        timer.resume();
        assert!(!timer.is_paused());
        assert_eq!(timer.remaining_ms(), frozen);

        step_time(&time, frozen + 500, 100);
        wait_for(|| completions.load(Ordering::Relaxed) == 1);
    }

    #[test]
    fn stop_restores_duration_and_goes_quiet() {
        let time = ManualTime::new();
        let (mut timer, completions, _, _) =
            counting_timer(Duration::from_secs(3), RampConfig::default(), &time);

        timer.start();
        step_time(&time, 1_000, 100);
        wait_for(|| timer.remaining_ms() <= 2_000);
        timer.stop();

        assert!(!timer.is_running());
        assert_eq!(timer.remaining_ms(), 3_000);
        assert_eq!(timer.beep_count(), 0);

        step_time(&time, 5_000, 500);
        assert_eq!(completions.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn duration_change_while_running_waits_for_reset() {
        let time = ManualTime::new();
        let (mut timer, _, _, _) =
            counting_timer(Duration::from_secs(2), RampConfig::default(), &time);

        timer.start();
        timer.set_duration(Duration::from_secs(9));
        step_time(&time, 300, 100);
        wait_for(|| timer.remaining_ms() <= 1_700);

        timer.reset();
        assert_eq!(timer.remaining_ms(), 9_000);
    }

    #[test]
    fn audio_failure_never_stops_the_round() {
        let time = ManualTime::new();
        let (mut timer, completions, fires, _) = counting_timer(
            Duration::from_secs(1),
            RampConfig {
                ramp_start_ms: 900,
                first_interval_ms: 200,
                final_interval_ms: 50,
                enabled: true,
            },
            &time,
        );
        timer.attach_player(TonePlayer::new(AudioEngine::disabled()));

        assert_eq!(
            timer.play_sound(&ToneProfile::beep()),
            Err(EngineError::Unavailable)
        );

        timer.start();
        step_time(&time, 1_500, 50);
        wait_for(|| completions.load(Ordering::Relaxed) == 1);
        assert!(fires.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn play_sound_without_player_reports_unavailable() {
        let time = ManualTime::new();
        let (timer, _, _, _) =
            counting_timer(Duration::from_secs(1), RampConfig::default(), &time);
        assert_eq!(
            timer.play_sound(&ToneProfile::buzzer()),
            Err(EngineError::Unavailable)
        );
    }
}
