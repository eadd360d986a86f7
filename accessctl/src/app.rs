//! The bring-up app: shows what the keypad reports and lets the keys switch its state.

use std::sync::mpsc::Sender;
use log::{debug, info, warn};
use accessctl_input::keypad::{KeyEdge, KeypadKey, KeypadState, NavDirection, PIN_LENGTH};
use accessctl_input::timing::Millis;

/// A key edge, as queued by the keypad callback for the main loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyEvent {
    /// The state the keypad was in when the edge was detected.
    pub state: KeypadState,
    pub key: char,
    pub edge: KeyEdge,
    pub at: Millis,
}

/// Queues `event` for the main loop.
///
/// Returns `false`, logging a warning, if the main loop is gone and the event was dropped.
pub fn queue_event(events_tx: &Sender<KeyEvent>, event: KeyEvent) -> bool {
    match events_tx.send(event) {
        Ok(()) => true,
        Err(err) => {
            warn!("Dropping key event {:?}: main loop is gone.", err.0);
            false
        }
    }
}

/// The main app state struct.
#[derive(Debug, Default)]
pub struct App {
    /// Digits typed since PIN input was entered. Only shown, never checked.
    typed: usize,
    /// When the last key was pressed.
    last_press: Option<Millis>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a key event, returning the state the keypad should switch to, if any.
    ///
    /// `A` enters PIN input, `B` enters navigation, `D` goes back to idle.
    pub fn handle(&mut self, event: KeyEvent) -> Option<KeypadState> {
        let KeyEvent { state, key, edge, at } = event;

        if edge == KeyEdge::Released {
            debug!("[{}] '{}' released at {}.", state, key, at);
            return None;
        }

        let since_last = self.last_press.map(|last| at.wrapping_since(last));
        self.last_press = Some(at);
        info!(
            "[{}] '{}' pressed at {} ({} ms since last press){}.",
            state,
            key,
            at,
            since_last.map_or_else(|| "-".to_string(), |ms| ms.to_string()),
            if state.expects(key) { "" } else { ", not expected" },
        );

        let next = match key {
            'A' => Some(KeypadState::PinInput),
            'B' => Some(KeypadState::Navigation),
            'D' => Some(KeypadState::Idle),
            _ => None,
        };
        if next.is_some() {
            self.typed = 0;
            return next.filter(|&next| next != state);
        }

        match state {
            KeypadState::Idle => {}
            KeypadState::PinInput if KeypadKey::from_char(key).is_some_and(KeypadKey::is_digit) => {
                self.typed = (self.typed + 1).min(PIN_LENGTH);
                info!("PIN: {}{}", "*".repeat(self.typed), "_".repeat(PIN_LENGTH - self.typed));
            }
            KeypadState::PinInput => {}
            KeypadState::Navigation => {
                if let Some(direction) = NavDirection::from_key(key) {
                    info!("Navigate {:?}.", direction);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: KeypadState, key: char, at: u32) -> KeyEvent {
        KeyEvent { state, key, edge: KeyEdge::Pressed, at: Millis::new(at) }
    }

    #[test]
    fn letter_keys_switch_state() {
        let mut app = App::new();
        assert_eq!(app.handle(press(KeypadState::Idle, 'A', 0)), Some(KeypadState::PinInput));
        assert_eq!(app.handle(press(KeypadState::PinInput, 'B', 1)), Some(KeypadState::Navigation));
        assert_eq!(app.handle(press(KeypadState::Navigation, 'D', 2)), Some(KeypadState::Idle));
        assert_eq!(app.handle(press(KeypadState::Idle, 'D', 3)), None);
    }

    #[test]
    fn releases_and_other_keys_keep_state() {
        let mut app = App::new();
        let release = KeyEvent { edge: KeyEdge::Released, ..press(KeypadState::Idle, 'A', 0) };
        assert_eq!(app.handle(release), None);
        assert_eq!(app.handle(press(KeypadState::Navigation, '6', 1)), None);
        assert_eq!(app.handle(press(KeypadState::PinInput, '#', 2)), None);
    }

    #[test]
    fn queued_events_reach_the_receiver() {
        let (tx, rx) = std::sync::mpsc::channel();
        let event = press(KeypadState::PinInput, '7', 42);
        assert!(queue_event(&tx, event));
        assert_eq!(rx.try_recv(), Ok(event));

        drop(rx);
        assert!(!queue_event(&tx, event));
    }

    #[test]
    fn typed_digits_are_capped() {
        let mut app = App::new();
        for i in 0..6 {
            app.handle(press(KeypadState::PinInput, '1', i));
        }
        assert_eq!(app.typed, PIN_LENGTH);
        app.handle(press(KeypadState::PinInput, 'A', 7));
        assert_eq!(app.typed, 0);
    }
}
