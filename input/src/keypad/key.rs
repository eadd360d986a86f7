/// Represents the keys on a 4x4 keypad.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KeypadKey {
    /// The `1` key.
    Key1,
    /// The `2` key.
    Key2,
    /// The `3` key.
    Key3,
    /// The `4` key.
    Key4,
    /// The `5` key.
    Key5,
    /// The `6` key.
    Key6,
    /// The `7` key.
    Key7,
    /// The `8` key.
    Key8,
    /// The `9` key.
    Key9,
    /// The `0` key.
    Key0,
    /// The `*` key.
    KeyAsterisk,
    /// The `#` key.
    KeyHash,
    /// The `A` key.
    KeyA,
    /// The `B` key.
    KeyB,
    /// The `C` key.
    KeyC,
    /// The `D` key.
    KeyD,
}

impl KeypadKey {
    pub const ROWS: usize = 4;
    pub const COLS: usize = 4;

    const LAYOUT: [[KeypadKey; 4]; 4] = {
        use KeypadKey::*;
        [
            [ Key1, Key2, Key3, KeyA, ],
            [ Key4, Key5, Key6, KeyB, ],
            [ Key7, Key8, Key9, KeyC, ],
            [ KeyAsterisk, Key0, KeyHash, KeyD, ],
        ]
    };

    /// Converts a matrix position (row, column) to a [KeypadKey].
    pub fn from_position(row: usize, col: usize) -> Option<KeypadKey> {
        Self::LAYOUT.get(row)?.get(col).copied()
    }

    /// Finds the key labelled with `c`. Letters are matched case-insensitively.
    pub fn from_char(c: char) -> Option<KeypadKey> {
        let c = c.to_ascii_uppercase();
        Self::LAYOUT
            .iter()
            .flatten()
            .copied()
            .find(|key| key.to_char() == c)
    }

    /// Converts the [KeypadKey] to its corresponding character.
    pub fn to_char(self) -> char {
        use KeypadKey::*;

        match self {
            Key1 => '1',
            Key2 => '2',
            Key3 => '3',
            Key4 => '4',
            Key5 => '5',
            Key6 => '6',
            Key7 => '7',
            Key8 => '8',
            Key9 => '9',
            Key0 => '0',
            KeyAsterisk => '*',
            KeyHash => '#',
            KeyA => 'A',
            KeyB => 'B',
            KeyC => 'C',
            KeyD => 'D',
        }
    }

    pub fn is_digit(self) -> bool {
        self.to_char().is_ascii_digit()
    }
}
