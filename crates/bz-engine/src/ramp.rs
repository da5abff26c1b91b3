//! Escalating alert scheduler.
//!
//! Consumes the clock's remaining-time stream and decides, on each
//! re-evaluation, whether an alert fires now. The firing interval is
//! recomputed from the *current* remaining time on every fire, so the
//! cadence tightens smoothly as the round runs out.

use bz_core::RampConfig;

/// Scheduler state driven by repeated [`advance`](AlertRamp::advance) calls.
#[derive(Clone, Debug)]
pub struct AlertRamp {
    config: RampConfig,
    active: bool,
    beep_count: u32,
    last_fire: Option<u64>,
    next_fire: Option<u64>,
    current_interval_ms: u64,
}

impl AlertRamp {
    /// Build a scheduler. An invalid configuration disables the ramp rather
    /// than producing nonsensical intervals; this is reported once, here.
    pub fn new(config: RampConfig) -> Self {
        let mut config = config;
        if let Err(err) = config.validate() {
            log::warn!("alert ramp disabled: {}", err);
            config.enabled = false;
        }
        Self {
            config,
            active: false,
            beep_count: 0,
            last_fire: None,
            next_fire: None,
            current_interval_ms: config.first_interval_ms,
        }
    }

    pub fn config(&self) -> &RampConfig {
        &self.config
    }

    /// Currently inside the ramp zone.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Alerts fired since the zone was last entered.
    pub fn beep_count(&self) -> u32 {
        self.beep_count
    }

    pub fn current_interval_ms(&self) -> u64 {
        self.current_interval_ms
    }

    pub fn last_fire(&self) -> Option<u64> {
        self.last_fire
    }

    /// One re-evaluation step. Returns true when an alert fires now.
    ///
    /// Entering the zone fires immediately, including on the very first
    /// call for rounds shorter than the zone itself. Leaving the zone (or
    /// the countdown reaching zero) resets everything, so re-entry behaves
    /// like a fresh start.
    pub fn advance(&mut self, remaining_ms: u64, now: u64) -> bool {
        if !self.config.enabled || remaining_ms == 0 || remaining_ms > self.config.ramp_start_ms {
            if self.active {
                self.reset();
            }
            return false;
        }

        if !self.active {
            self.active = true;
            return self.fire(remaining_ms, now);
        }

        match self.next_fire {
            Some(next) if now >= next => self.fire(remaining_ms, now),
            _ => false,
        }
    }

    fn fire(&mut self, remaining_ms: u64, now: u64) -> bool {
        self.beep_count += 1;
        self.last_fire = Some(now);
        self.current_interval_ms = self.config.interval_at(remaining_ms);
        self.next_fire = Some(now + self.current_interval_ms);
        true
    }

    /// Recompute the next fire from the current remaining time without
    /// firing. Called on resume so a long pause cannot produce a burst of
    /// catch-up fires.
    pub fn resync(&mut self, remaining_ms: u64, now: u64) {
        if !self.active {
            return;
        }
        self.current_interval_ms = self.config.interval_at(remaining_ms);
        self.next_fire = Some(now + self.current_interval_ms);
    }

    /// Return to the inactive state (round stop or zone exit).
    pub fn reset(&mut self) {
        self.active = false;
        self.beep_count = 0;
        self.last_fire = None;
        self.next_fire = None;
        self.current_interval_ms = self.config.first_interval_ms;
    }
}
