use crate::keypad::KeyEdge;
use crate::timing::Millis;

/// A debouncer for a single switch that uses the millisecond timebase to filter out noise.
///
/// A raw reading different from the stable state has to persist for `debounce_ms`
/// before the stable state changes. Readings that bounce back earlier are ignored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimedDebounce {
    pressed: bool,
    changed_since: Option<Millis>,
    pub debounce_ms: u32,
}

impl TimedDebounce {
    pub const DEFAULT_DEBOUNCE_MS: u32 = 20;

    pub const fn new() -> Self {
        Self {
            pressed: false,
            changed_since: None,
            debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
        }
    }

    pub const fn with_debounce_ms(mut self, debounce_ms: u32) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Gets the debounced state.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Forgets any pending change and sets the stable state to released.
    pub fn reset(&mut self) {
        self.pressed = false;
        self.changed_since = None;
    }

    /// Feeds a raw reading taken at `now`.
    ///
    /// Returns the edge if the debounced state changed with this reading.
    pub fn update(&mut self, raw_pressed: bool, now: Millis) -> Option<KeyEdge> {
        if raw_pressed == self.pressed {
            self.changed_since = None;
            return None;
        }

        let since = *self.changed_since.get_or_insert(now);
        if !now.has_elapsed(since, self.debounce_ms) {
            return None;
        }

        self.changed_since = None;
        self.pressed = raw_pressed;
        Some(KeyEdge::from_pressed(raw_pressed))
    }
}

impl Default for TimedDebounce {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_needs_to_be_stable() {
        let mut debounce = TimedDebounce::new().with_debounce_ms(10);
        assert_eq!(debounce.update(true, Millis::new(100)), None);
        assert_eq!(debounce.update(true, Millis::new(105)), None);
        assert_eq!(debounce.update(true, Millis::new(110)), Some(KeyEdge::Pressed));
        assert!(debounce.is_pressed());
        assert_eq!(debounce.update(true, Millis::new(200)), None);
    }

    #[test]
    fn bounces_are_ignored() {
        let mut debounce = TimedDebounce::new().with_debounce_ms(10);
        assert_eq!(debounce.update(true, Millis::new(0)), None);
        assert_eq!(debounce.update(false, Millis::new(3)), None);
        // The bounce restarted the stability window.
        assert_eq!(debounce.update(true, Millis::new(6)), None);
        assert_eq!(debounce.update(true, Millis::new(12)), None);
        assert_eq!(debounce.update(true, Millis::new(16)), Some(KeyEdge::Pressed));
    }

    #[test]
    fn release_is_debounced_too() {
        let mut debounce = TimedDebounce::new().with_debounce_ms(5);
        debounce.update(true, Millis::new(0));
        assert_eq!(debounce.update(true, Millis::new(5)), Some(KeyEdge::Pressed));
        assert_eq!(debounce.update(false, Millis::new(6)), None);
        assert_eq!(debounce.update(false, Millis::new(11)), Some(KeyEdge::Released));
        assert!(!debounce.is_pressed());
    }

    #[test]
    fn zero_debounce_reports_immediately() {
        let mut debounce = TimedDebounce::new().with_debounce_ms(0);
        assert_eq!(debounce.update(true, Millis::new(42)), Some(KeyEdge::Pressed));
        assert_eq!(debounce.update(false, Millis::new(42)), Some(KeyEdge::Released));
    }

    #[test]
    fn works_across_wraparound() {
        let mut debounce = TimedDebounce::new().with_debounce_ms(10);
        let start = Millis::new(u32::MAX - 4);
        assert_eq!(debounce.update(true, start), None);
        assert_eq!(debounce.update(true, start.wrapping_add(9)), None);
        assert_eq!(debounce.update(true, start.wrapping_add(10)), Some(KeyEdge::Pressed));
    }

    #[test]
    fn reset_drops_pending_change() {
        let mut debounce = TimedDebounce::new().with_debounce_ms(10);
        debounce.update(true, Millis::new(0));
        debounce.reset();
        assert_eq!(debounce.update(true, Millis::new(10)), None);
    }
}
