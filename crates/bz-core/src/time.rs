//! Monotonic time sources.
//!
//! The clock and scheduler never read wall time themselves; callers hand
//! them a timestamp from a `TimeSource`. Tests substitute `ManualTime` to
//! drive every timing contract deterministically.

/// A monotonic clock measured in milliseconds.
pub trait TimeSource {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> u64;
}

#[cfg(feature = "std")]
mod std_sources {
    use super::TimeSource;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    /// Real monotonic clock anchored at construction.
    #[derive(Clone, Debug)]
    pub struct MonotonicTime {
        origin: Instant,
    }

    impl MonotonicTime {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Default for MonotonicTime {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TimeSource for MonotonicTime {
        fn now_ms(&self) -> u64 {
            self.origin.elapsed().as_millis() as u64
        }
    }

    /// Hand-driven clock for tests. Clones share the same underlying time.
    #[derive(Clone, Debug, Default)]
    pub struct ManualTime {
        now: Arc<AtomicU64>,
    }

    impl ManualTime {
        pub fn new() -> Self {
            Self::default()
        }

        /// A manual clock already advanced to `ms`.
        pub fn at(ms: u64) -> Self {
            let time = Self::default();
            time.set(ms);
            time
        }

        /// Advance by `ms` milliseconds.
        pub fn advance(&self, ms: u64) {
            self.now.fetch_add(ms, Ordering::SeqCst);
        }

        /// Jump to an absolute time. Must not move backwards.
        pub fn set(&self, ms: u64) {
            self.now.store(ms, Ordering::SeqCst);
        }
    }

    impl TimeSource for ManualTime {
        fn now_ms(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}

#[cfg(feature = "std")]
pub use std_sources::{ManualTime, MonotonicTime};
