//! Millisecond timebase.
//!
//! A free-running counter incremented once per tick of a periodic tick source
//! (a hardware timer overflow interrupt, or [ThreadTickSource] on a Linux board).
//! Readers get a [Millis] value they can use for non-blocking delays and debouncing.
//!
//! The counter wraps silently at [u32::MAX]. Elapsed time must always be computed with
//! [Millis::wrapping_since] (or the helpers built on it), never by comparing two values,
//! which is why [Millis] does not implement [PartialOrd].

mod thread;

use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use log::{debug, warn};
use crate::{InputError, InputResult};
pub use thread::*;

/// The period of a single tick, which is also the resolution of the timebase.
pub const TICK_PERIOD: Duration = Duration::from_millis(1);

/// The process-wide timebase.
pub static TIMEBASE: Timebase = Timebase::new();

/// Arms the process-wide [TIMEBASE] with the given tick source.
///
/// Should be called once at startup.
///
/// # Errors
/// - `InputError::AlreadyInitialized` if the timebase was already armed.
/// - Whatever the tick source reports if arming fails.
pub fn init(source: &mut dyn TickSource) -> InputResult<()> {
    TIMEBASE.init(source)
}

/// Gets the current value of the process-wide [TIMEBASE].
pub fn millis() -> Millis {
    TIMEBASE.now()
}

/// A point in time, in milliseconds since the timebase started.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Millis(u32);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub const fn new(value: u32) -> Self {
        Millis(value)
    }

    /// Gets the raw counter value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Gets the amount of milliseconds from `earlier` to `self`.
    ///
    /// Correct across one counter wraparound, as long as less than `u32::MAX` ms passed.
    pub const fn wrapping_since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Same as [Millis::wrapping_since], as a [Duration].
    pub fn duration_since(self, earlier: Millis) -> Duration {
        Duration::from_millis(self.wrapping_since(earlier).into())
    }

    /// Checks whether at least `ms` milliseconds passed between `since` and `self`.
    pub const fn has_elapsed(self, since: Millis, ms: u32) -> bool {
        self.wrapping_since(since) >= ms
    }

    /// Gets the point in time `ms` milliseconds after `self`, wrapping around.
    pub const fn wrapping_add(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

impl Display for Millis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<Millis> for u32 {
    fn from(millis: Millis) -> Self {
        millis.0
    }
}

/// A millisecond counter with a single writer.
///
/// The writer is the [Ticker], which can be taken out of the timebase exactly once.
/// Any number of readers may call [Timebase::now] concurrently.
///
/// The counter is atomic, so a read racing with a tick never sees a torn value,
/// whatever the bus width of the target.
pub struct Timebase {
    millis: AtomicU32,
    ticker_taken: AtomicBool,
}

impl Timebase {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a timebase whose counter starts at `value` instead of 0.
    pub const fn starting_at(value: u32) -> Self {
        Timebase {
            millis: AtomicU32::new(value),
            ticker_taken: AtomicBool::new(false),
        }
    }

    /// Gets the current counter value.
    pub fn now(&self) -> Millis {
        Millis(self.millis.load(Ordering::Relaxed))
    }

    /// Takes the single writer handle of this timebase.
    ///
    /// # Errors
    /// - `InputError::AlreadyInUse` if the ticker was already taken.
    pub fn take_ticker(&self) -> InputResult<Ticker<'_>> {
        if self.ticker_taken.swap(true, Ordering::AcqRel) {
            return Err(InputError::AlreadyInUse);
        }
        Ok(Ticker { millis: &self.millis })
    }

    /// Hands the ticker to `source`, which arms a periodic tick of [TICK_PERIOD].
    ///
    /// If arming fails, the ticker is given back and `init` can be retried.
    ///
    /// # Errors
    /// - `InputError::AlreadyInitialized` if the ticker is already out.
    /// - Whatever `source` reports if arming fails.
    pub fn init(&'static self, source: &mut dyn TickSource) -> InputResult<()> {
        let ticker = self.take_ticker().map_err(|_| InputError::AlreadyInitialized)?;
        debug!("Arming {:?} with a {:?} tick.", source, TICK_PERIOD);
        if let Err(err) = source.arm(TICK_PERIOD, ticker) {
            warn!("Failed to arm {:?}: {}", source, err);
            self.ticker_taken.store(false, Ordering::Release);
            return Err(err);
        }
        Ok(())
    }
}

impl Default for Timebase {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Timebase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Timebase({})", self.now())
    }
}

/// The writer handle of a [Timebase].
///
/// Only the tick path holds one. [Ticker::tick] is a single atomic increment,
/// so it is safe to call from an interrupt handler.
pub struct Ticker<'a> {
    millis: &'a AtomicU32,
}

impl Ticker<'_> {
    /// Advances the counter by one tick, wrapping around at [u32::MAX].
    #[inline]
    pub fn tick(&self) {
        self.millis.fetch_add(1, Ordering::Relaxed);
    }
}

impl Debug for Ticker<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ticker({})", self.millis.load(Ordering::Relaxed))
    }
}

/// A source of periodic ticks.
///
/// Implemented once per platform: a timer overflow interrupt on a microcontroller,
/// a thread on a Linux board. The portable code only depends on this trait.
pub trait TickSource: Debug {
    /// Starts calling [Ticker::tick] once every `period`.
    ///
    /// On error, the ticker must not be kept: the timebase takes it back.
    fn arm(&mut self, period: Duration, ticker: Ticker<'static>) -> InputResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct ManualTickSource {
        period: Option<Duration>,
        ticker: Option<Ticker<'static>>,
    }

    impl ManualTickSource {
        fn fire(&self, times: u32) {
            let ticker = self.ticker.as_ref().expect("not armed");
            for _ in 0..times {
                ticker.tick();
            }
        }
    }

    impl TickSource for ManualTickSource {
        fn arm(&mut self, period: Duration, ticker: Ticker<'static>) -> InputResult<()> {
            self.period = Some(period);
            self.ticker = Some(ticker);
            Ok(())
        }
    }

    #[test]
    fn one_tick_is_one_millisecond() {
        let timebase = Timebase::new();
        let ticker = timebase.take_ticker().unwrap();
        assert_eq!(timebase.now(), Millis::ZERO);
        ticker.tick();
        assert_eq!(timebase.now(), Millis::new(1));
    }

    #[test]
    fn thousand_ticks_add_thousand() {
        let timebase = Timebase::starting_at(12_345);
        let initial = timebase.now();
        let ticker = timebase.take_ticker().unwrap();
        for _ in 0..1000 {
            ticker.tick();
        }
        assert_eq!(timebase.now(), Millis::new(13_345));
        assert_eq!(timebase.now().wrapping_since(initial), 1000);
    }

    #[test]
    fn wraps_to_zero_and_elapsed_stays_small() {
        let timebase = Timebase::starting_at(u32::MAX - 2);
        let before = timebase.now();
        let ticker = timebase.take_ticker().unwrap();
        for _ in 0..3 {
            ticker.tick();
        }
        assert_eq!(timebase.now(), Millis::ZERO);
        ticker.tick();
        ticker.tick();
        let after = timebase.now();
        assert_eq!(after, Millis::new(2));
        assert_eq!(after.wrapping_since(before), 5);
        assert!(after.has_elapsed(before, 5));
        assert!(!after.has_elapsed(before, 6));
        assert_eq!(after.duration_since(before), Duration::from_millis(5));
    }

    #[test]
    fn ticker_can_only_be_taken_once() {
        let timebase = Timebase::new();
        let _ticker = timebase.take_ticker().unwrap();
        assert_eq!(timebase.take_ticker().unwrap_err(), InputError::AlreadyInUse);
    }

    #[test]
    fn init_arms_the_source_once() {
        static TIMEBASE_UNDER_TEST: Timebase = Timebase::new();

        let mut source = ManualTickSource::default();
        TIMEBASE_UNDER_TEST.init(&mut source).unwrap();
        assert_eq!(source.period, Some(TICK_PERIOD));

        source.fire(7);
        assert_eq!(TIMEBASE_UNDER_TEST.now(), Millis::new(7));

        let mut other = ManualTickSource::default();
        assert_eq!(TIMEBASE_UNDER_TEST.init(&mut other), Err(InputError::AlreadyInitialized));
        assert!(other.ticker.is_none());
    }

    #[derive(Debug)]
    struct BrokenTickSource;

    impl TickSource for BrokenTickSource {
        fn arm(&mut self, _period: Duration, _ticker: Ticker<'static>) -> InputResult<()> {
            Err(InputError::NotSupported)
        }
    }

    #[test]
    fn failed_arm_can_be_retried() {
        static TIMEBASE_UNDER_TEST: Timebase = Timebase::new();

        assert_eq!(TIMEBASE_UNDER_TEST.init(&mut BrokenTickSource), Err(InputError::NotSupported));

        let mut source = ManualTickSource::default();
        assert_eq!(TIMEBASE_UNDER_TEST.init(&mut source), Ok(()));
        source.fire(3);
        assert_eq!(TIMEBASE_UNDER_TEST.now(), Millis::new(3));
    }

    #[test]
    fn millis_helpers() {
        let t = Millis::new(u32::MAX).wrapping_add(10);
        assert_eq!(t, Millis::new(9));
        assert_eq!(u32::from(t), 9);
        assert_eq!(t.to_string(), "9ms");
    }
}
