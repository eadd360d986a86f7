//! Keypad input: the key-scan driver seam, a GPIO matrix scanner, and the keypad state machine.

mod key;
mod matrix;
mod state;

use std::fmt::Debug;
use crate::InputResult;
pub use key::*;
pub use matrix::*;
pub use state::*;

/// A detected transition of a physical key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KeyEdge {
    /// The key went from released to pressed.
    Pressed,
    /// The key went from pressed to released.
    Released,
}

impl KeyEdge {
    /// Gets the edge leading to the given new state.
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed { KeyEdge::Pressed } else { KeyEdge::Released }
    }
}

/// The handler invoked for every key edge a [KeyScanDriver] detects.
///
/// Invoked from the scan path, so it must not block.
pub type KeyCallback = Box<dyn FnMut(char, KeyEdge)>;

/// The `KeyScanDriver` trait defines the interface of low-level keypad drivers.
///
/// The driver does the scanning and debouncing and reports edges to a single callback.
pub trait KeyScanDriver: Debug {
    /// One-time hardware setup, called when the driver is wrapped by [AccessCtlKeypad].
    fn setup(&mut self) -> InputResult<()>;

    /// Registers the edge handler, replacing the previous one, if any.
    fn set_callback(&mut self, callback: KeyCallback);

    /// Scans the keypad once and invokes the callback for every detected edge.
    fn poll(&mut self) -> InputResult<()>;
}
