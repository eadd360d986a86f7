use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use log::{debug, warn};
use crate::{InputError, InputResult};
use crate::timing::{TickSource, Ticker};

/// A [TickSource] backed by a dedicated thread, for boards without a spare timer interrupt.
///
/// The thread counts whole periods elapsed since it was armed and ticks once per period,
/// catching up after oversleeping, so the counter never skips or repeats a tick
/// even though the OS scheduler is not exact.
pub struct ThreadTickSource {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl ThreadTickSource {
    pub fn new() -> Self {
        Self {
            handle: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Checks whether the tick thread is running.
    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the tick thread and waits for it to exit.
    ///
    /// Does nothing if the source was never armed.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Relaxed);
            if handle.join().is_err() {
                warn!("Tick thread panicked.");
            }
            debug!("Tick thread stopped.");
        }
    }
}

impl Default for ThreadTickSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ThreadTickSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ThreadTickSource(armed: {})", self.is_armed())
    }
}

impl TickSource for ThreadTickSource {
    fn arm(&mut self, period: Duration, ticker: Ticker<'static>) -> InputResult<()> {
        if self.handle.is_some() {
            return Err(InputError::AlreadyInUse);
        }
        if period.is_zero() {
            return Err(InputError::InvalidArgument);
        }

        self.stop.store(false, Ordering::Relaxed);
        let stop = Arc::clone(&self.stop);

        let handle = thread::Builder::new()
            .name("timebase-tick".to_string())
            .spawn(move || {
                let start = Instant::now();
                let period_ns = period.as_nanos();
                let mut delivered: u128 = 0;

                while !stop.load(Ordering::Relaxed) {
                    let due = start.elapsed().as_nanos() / period_ns;
                    while delivered < due {
                        ticker.tick();
                        delivered += 1;
                    }
                    thread::sleep(period);
                }
            })?;

        self.handle = Some(handle);
        debug!("Tick thread armed with a {:?} period.", period);
        Ok(())
    }
}

impl Drop for ThreadTickSource {
    fn drop(&mut self) {
        self.stop();
    }
}
