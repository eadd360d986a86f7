use std::cell::Cell;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use log::debug;
use crate::InputResult;
use crate::keypad::{KeyEdge, KeyScanDriver, KeypadKey};

/// Number of digits of a PIN entered in [KeypadState::PinInput].
pub const PIN_LENGTH: usize = 4;

/// The mode the keypad is in, deciding how the application interprets key edges.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum KeypadState {
    /// Nothing is expected from the keypad.
    #[default]
    Idle,
    /// A [PIN_LENGTH]-digit numeric PIN is being entered.
    PinInput,
    /// A menu is being navigated with the directional keys `2`, `4`, `6` and `8`.
    Navigation,
}

impl KeypadState {
    /// The number of keypad states.
    pub const COUNT: usize = 3;
    pub const ALL: [KeypadState; Self::COUNT] = [
        KeypadState::Idle,
        KeypadState::PinInput,
        KeypadState::Navigation,
    ];

    /// Checks whether `key` is one of the keys this state is meant for.
    ///
    /// Informational only: [AccessCtlKeypad] passes every edge through regardless.
    pub fn expects(self, key: char) -> bool {
        match self {
            KeypadState::Idle => false,
            KeypadState::PinInput => KeypadKey::from_char(key).is_some_and(KeypadKey::is_digit),
            KeypadState::Navigation => NavDirection::from_key(key).is_some(),
        }
    }
}

impl Display for KeypadState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            KeypadState::Idle => "idle",
            KeypadState::PinInput => "PIN input",
            KeypadState::Navigation => "navigation",
        };
        write!(f, "{}", str)
    }
}

/// A direction in [KeypadState::Navigation], laid out like the arrows of a phone keypad.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NavDirection {
    Up,
    Left,
    Right,
    Down,
}

impl NavDirection {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '2' => Some(NavDirection::Up),
            '4' => Some(NavDirection::Left),
            '6' => Some(NavDirection::Right),
            '8' => Some(NavDirection::Down),
            _ => None,
        }
    }

    pub fn to_key(self) -> char {
        match self {
            NavDirection::Up => '2',
            NavDirection::Left => '4',
            NavDirection::Right => '6',
            NavDirection::Down => '8',
        }
    }
}

/// The keypad of the access-control device.
///
/// Holds the current [KeypadState] and relays key edges from the [KeyScanDriver] to the
/// single application callback. It does not filter or interpret edges: the state only tells
/// the application how to read them. Transitions are explicit, any state can be changed
/// to any other, and nothing changes the state on its own.
pub struct AccessCtlKeypad<D: KeyScanDriver> {
    driver: D,
    state: Rc<Cell<KeypadState>>,
}

impl<D: KeyScanDriver> Debug for AccessCtlKeypad<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessCtlKeypad({:?}, {:?})", self.driver, self.state.get())
    }
}

impl<D: KeyScanDriver> AccessCtlKeypad<D> {
    /// Wraps `driver`, running its one-time setup, and starts in [KeypadState::Idle].
    ///
    /// # Errors
    /// Whatever the driver reports if its hardware setup fails.
    pub fn new(mut driver: D) -> InputResult<Self> {
        driver.setup()?;
        Ok(AccessCtlKeypad {
            driver,
            state: Rc::new(Cell::new(KeypadState::default())),
        })
    }

    /// Registers `callback` as the handler of every key edge, in any state.
    ///
    /// Replaces the previously attached callback.
    pub fn attach_callback<F>(&mut self, callback: F)
    where
        F: FnMut(char, KeyEdge) + 'static,
    {
        debug!("Attaching keypad callback.");
        self.driver.set_callback(Box::new(callback));
    }

    /// Like [AccessCtlKeypad::attach_callback], but the callback also gets the state
    /// the keypad is in when the edge is dispatched.
    ///
    /// Shares the single callback slot: replaces any callback attached either way.
    pub fn attach_annotated_callback<F>(&mut self, mut callback: F)
    where
        F: FnMut(KeypadState, char, KeyEdge) + 'static,
    {
        let state = Rc::clone(&self.state);
        self.attach_callback(move |key, edge| callback(state.get(), key, edge));
    }

    /// Gets the current state.
    pub fn current_state(&self) -> KeypadState {
        self.state.get()
    }

    /// Changes the current state to `new_state`, whatever the current state is.
    ///
    /// No callback is invoked.
    pub fn change_state_to(&mut self, new_state: KeypadState) {
        let old_state = self.state.replace(new_state);
        if old_state != new_state {
            debug!("Keypad state changed from {} to {}.", old_state, new_state);
        }
    }

    /// Lets the driver scan once, dispatching any detected edges to the callback.
    pub fn poll(&mut self) -> InputResult<()> {
        self.driver.poll()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
