use std::fmt::{Debug, Formatter};
use log::{debug, trace};
use crate::{GpioBusInput, GpioBusOutput, InputResult};
use crate::debounce::TimedDebounce;
use crate::keypad::{KeyCallback, KeyScanDriver, KeypadKey};
use crate::timing::Timebase;

const ROWS: usize = KeypadKey::ROWS;
const COLS: usize = KeypadKey::COLS;

/// A [KeyScanDriver] for a 4x4 keypad matrix wired to GPIO lines.
///
/// The columns are driven one at a time, and the rows are read to find the pressed keys
/// in the active column. Every key is debounced separately with a [TimedDebounce]
/// against the given [Timebase], and only debounced edges reach the callback.
pub struct MatrixKeyScanner<'a> {
    cols: &'a dyn GpioBusOutput<4>,
    rows: &'a dyn GpioBusInput<4>,
    timebase: &'a Timebase,
    keys: [[TimedDebounce; COLS]; ROWS],
    callback: Option<KeyCallback>,
}

impl Debug for MatrixKeyScanner<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatrixKeyScanner({:?}, {:?})", self.cols, self.rows)
    }
}

impl<'a> MatrixKeyScanner<'a> {
    /// Creates a new scanner with the specified GPIO bus outputs for columns and inputs for rows.
    ///
    /// The buses are expected to apply the active level of the wiring
    /// (usually active-low columns and pulled-up, active-low rows).
    pub fn new(
        cols: &'a dyn GpioBusOutput<4>,
        rows: &'a dyn GpioBusInput<4>,
        timebase: &'a Timebase,
    ) -> Self {
        MatrixKeyScanner {
            cols,
            rows,
            timebase,
            keys: [[TimedDebounce::new(); COLS]; ROWS],
            callback: None,
        }
    }

    /// Sets the debounce time of every key.
    pub fn with_debounce_ms(mut self, debounce_ms: u32) -> Self {
        for key in self.keys.iter_mut().flatten() {
            key.debounce_ms = debounce_ms;
        }
        self
    }

    /// Gets the keys currently held down, after debouncing.
    pub fn pressed_keys(&self) -> Vec<KeypadKey> {
        let mut pressed = Vec::new();
        for (row, keys) in self.keys.iter().enumerate() {
            for (col, key) in keys.iter().enumerate() {
                if key.is_pressed() {
                    if let Some(key) = KeypadKey::from_position(row, col) {
                        pressed.push(key);
                    }
                }
            }
        }
        pressed
    }

    fn read_raw(&self) -> InputResult<[[bool; COLS]; ROWS]> {
        let scanned = self.scan_columns();
        // Never leave a column driven, even if the scan failed halfway.
        let released = self.cols.write(&[false; COLS]);
        let raw = scanned?;
        released?;
        Ok(raw)
    }

    fn scan_columns(&self) -> InputResult<[[bool; COLS]; ROWS]> {
        let mut raw = [[false; COLS]; ROWS];

        for col in 0..COLS {
            let mut drive = [false; COLS];
            drive[col] = true;
            self.cols.write(&drive)?;
            let sensed = self.rows.read()?;
            for row in 0..ROWS {
                raw[row][col] = sensed[row];
            }
        }

        Ok(raw)
    }
}

impl KeyScanDriver for MatrixKeyScanner<'_> {
    fn setup(&mut self) -> InputResult<()> {
        self.cols.write(&[false; COLS])?;
        for key in self.keys.iter_mut().flatten() {
            key.reset();
        }
        debug!("{:?} set up.", self);
        Ok(())
    }

    fn set_callback(&mut self, callback: KeyCallback) {
        self.callback = Some(callback);
    }

    fn poll(&mut self) -> InputResult<()> {
        let raw = self.read_raw()?;
        let now = self.timebase.now();

        for row in 0..ROWS {
            for col in 0..COLS {
                let Some(edge) = self.keys[row][col].update(raw[row][col], now) else {
                    continue;
                };
                let Some(key) = KeypadKey::from_position(row, col) else {
                    continue;
                };
                match &mut self.callback {
                    Some(callback) => {
                        trace!("{:?} {:?} at {}.", key, edge, now);
                        callback(key.to_char(), edge);
                    }
                    None => trace!("No callback, dropping {:?} {:?}.", key, edge),
                }
            }
        }

        Ok(())
    }
}
