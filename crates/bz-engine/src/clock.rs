//! Drift-corrected countdown clock.
//!
//! Remaining time is always recomputed from a fixed start anchor plus the
//! run time banked across pauses; per-poll deltas are never accumulated,
//! so scheduling jitter cannot compound into long-run error.

/// Tick notifications are throttled to at most one per this many milliseconds.
pub const TICK_THROTTLE_MS: u64 = 100;

/// Result of one clock re-evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockPoll {
    /// Whole seconds remaining (rounded up), when a throttled tick is due.
    pub tick: Option<u64>,
    /// Set exactly once per run, when remaining time reaches zero.
    pub completed: bool,
}

/// Countdown over a configured duration with pause/resume bookkeeping.
///
/// Pure state machine: every operation takes the current monotonic time in
/// milliseconds, so tests drive it deterministically.
#[derive(Clone, Debug)]
pub struct CountdownClock {
    duration_ms: u64,
    /// Duration change requested while running; applied on the next stop/reset.
    pending_duration_ms: Option<u64>,
    /// Monotonic timestamp at the last start or resume.
    start_epoch: u64,
    /// Run time banked across pauses since the last start.
    banked_ms: u64,
    running: bool,
    paused: bool,
    completed: bool,
    last_tick_at: Option<u64>,
}

impl CountdownClock {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            pending_duration_ms: None,
            start_epoch: 0,
            banked_ms: 0,
            running: false,
            paused: false,
            completed: false,
            last_tick_at: None,
        }
    }

    /// Begin a run. No-op while already running (paused or not).
    pub fn start(&mut self, now: u64) {
        if self.running {
            return;
        }
        self.start_epoch = now;
        self.banked_ms = 0;
        self.running = true;
        self.paused = false;
        self.completed = false;
        self.last_tick_at = None;
    }

    /// Freeze the countdown. No-op unless running and not already paused.
    pub fn pause(&mut self, now: u64) {
        if !self.running || self.paused {
            return;
        }
        self.banked_ms += now.saturating_sub(self.start_epoch);
        self.paused = true;
    }

    /// Continue from a pause, re-anchoring the epoch so the frozen gap
    /// contributes nothing to elapsed time.
    pub fn resume(&mut self, now: u64) {
        if !self.running || !self.paused {
            return;
        }
        self.start_epoch = now;
        self.paused = false;
    }

    /// End the run and restore remaining time to the configured duration.
    pub fn stop(&mut self) {
        self.running = false;
        self.paused = false;
        self.completed = false;
        self.banked_ms = 0;
        self.last_tick_at = None;
        if let Some(duration) = self.pending_duration_ms.take() {
            self.duration_ms = duration;
        }
    }

    /// Stop and pick up any duration change made during the run.
    pub fn reset(&mut self) {
        self.stop();
    }

    /// Change the configured duration. Immediate while stopped; while a run
    /// is in flight, deferred until the next stop/reset.
    pub fn set_duration(&mut self, duration_ms: u64) {
        if self.running {
            self.pending_duration_ms = Some(duration_ms);
        } else {
            self.duration_ms = duration_ms;
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Milliseconds remaining. Frozen while paused, the full duration while
    /// stopped, zero after completion. Never negative: clock irregularities
    /// are clamped before any caller can observe them.
    pub fn remaining_ms(&self, now: u64) -> u64 {
        if self.completed {
            return 0;
        }
        if !self.running {
            return self.duration_ms;
        }
        let elapsed = if self.paused {
            self.banked_ms
        } else {
            self.banked_ms + now.saturating_sub(self.start_epoch)
        };
        self.duration_ms.saturating_sub(elapsed)
    }

    /// One re-evaluation step. Emits a throttled tick and, exactly once per
    /// run, the completion flag; after completion the clock self-terminates
    /// and further polls do nothing until the next start.
    pub fn poll(&mut self, now: u64) -> ClockPoll {
        if !self.running || self.paused {
            return ClockPoll::default();
        }

        let remaining = self.remaining_ms(now);
        if remaining == 0 {
            self.completed = true;
            self.running = false;
            return ClockPoll {
                tick: Some(0),
                completed: true,
            };
        }

        let due = match self.last_tick_at {
            None => true,
            Some(at) => now.saturating_sub(at) >= TICK_THROTTLE_MS,
        };
        if !due {
            return ClockPoll::default();
        }
        self.last_tick_at = Some(now);
        ClockPoll {
            tick: Some(remaining.div_ceil(1_000)),
            completed: false,
        }
    }
}
