//! Fixed-cadence repeating task.
//!
//! The re-evaluation loop behind a running round: a dedicated thread
//! invokes the callback once per period until the callback returns `false`
//! or the ticker is cancelled through its stored token. Cancellation joins
//! the thread, so after `cancel` returns no further work happens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub struct Ticker {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn a repeating task. `f` runs once per `period`; returning `false`
    /// ends the loop from inside.
    pub fn spawn<F>(period: Duration, mut f: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let token = cancel.clone();
        let thread = std::thread::spawn(move || {
            while !token.load(Ordering::Relaxed) {
                if !f() {
                    break;
                }
                std::thread::sleep(period);
            }
        });
        Self {
            cancel,
            thread: Some(thread),
        }
    }

    /// Cancel and join. Idempotent.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
