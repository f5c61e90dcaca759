mod scanner;

use bitvec::prelude::*;
use std::fmt::Debug;
use crate::GpioResult;
pub use scanner::*;

/// Number of row-select lines on the keypad.
pub const KEYPAD_ROWS: usize = 4;
/// Number of column lines on the keypad.
pub const KEYPAD_COLS: usize = 4;

/// The `Keypad` trait defines the interface for matrix keypad input devices.
///
/// Scanning and querying are separate: the queries only look at the state captured by
/// the last [Keypad::scan], so the caller decides how often the hardware is swept.
pub trait Keypad: Debug {
    /// Sweeps all rows once, updating the current and previous state of every key.
    fn scan(&mut self) -> GpioResult<()>;

    /// The key state captured by the scans so far.
    fn matrix(&self) -> &KeyMatrix;

    /// Whether the key was down during the last scan.
    fn is_pressed(&self, row: usize, col: usize) -> bool {
        self.matrix().is_pressed(row, col)
    }

    /// Whether the key went down between the last two scans.
    fn just_pressed(&self, row: usize, col: usize) -> bool {
        self.matrix().just_pressed(row, col)
    }

    /// Whether the key went up between the last two scans.
    fn just_released(&self, row: usize, col: usize) -> bool {
        self.matrix().just_released(row, col)
    }

    fn pressed_keys(&self) -> Vec<KeyPosition> {
        self.matrix().positions(|current, _| current)
    }

    fn just_pressed_keys(&self) -> Vec<KeyPosition> {
        self.matrix().positions(|current, previous| current && !previous)
    }

    fn just_released_keys(&self) -> Vec<KeyPosition> {
        self.matrix().positions(|current, previous| !current && previous)
    }
}

/// A key on the 4x4 matrix, addressed by its row-select and column line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct KeyPosition {
    row: u8,
    col: u8,
}

impl KeyPosition {
    /// Returns `None` if the position is outside the matrix.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < KEYPAD_ROWS && col < KEYPAD_COLS {
            Some(KeyPosition { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Row-major index into the matrix.
    pub fn index(self) -> usize {
        self.row() * KEYPAD_COLS + self.col()
    }
}

type KeyGrid = BitArray<[u16; 1], Lsb0>;

/// Current and previous state of every key, one bit per key, row-major.
///
/// `previous` always holds what `current` was before the most recent sample of that
/// key, which is what edge detection is based on.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyMatrix {
    current: KeyGrid,
    previous: KeyGrid,
}

impl KeyMatrix {
    /// A matrix with every key released, both now and before.
    pub fn new() -> Self {
        KeyMatrix {
            current: KeyGrid::ZERO,
            previous: KeyGrid::ZERO,
        }
    }

    /// Feeds one sample for the key at `(row, col)`.
    ///
    /// The old current state moves to previous before the sample is stored.
    /// Out-of-range positions are ignored.
    pub fn record(&mut self, row: usize, col: usize, pressed: bool) {
        if let Some(key) = KeyPosition::new(row, col) {
            let index = key.index();
            let was_pressed = self.current[index];
            self.previous.set(index, was_pressed);
            self.current.set(index, pressed);
        }
    }

    /// State of the key in the most recent scan. `false` when out of range.
    pub fn current(&self, row: usize, col: usize) -> bool {
        KeyPosition::new(row, col).is_some_and(|key| self.current[key.index()])
    }

    /// State of the key in the scan before the most recent one. `false` when out of range.
    pub fn previous(&self, row: usize, col: usize) -> bool {
        KeyPosition::new(row, col).is_some_and(|key| self.previous[key.index()])
    }

    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        self.current(row, col)
    }

    pub fn just_pressed(&self, row: usize, col: usize) -> bool {
        self.current(row, col) && !self.previous(row, col)
    }

    pub fn just_released(&self, row: usize, col: usize) -> bool {
        !self.current(row, col) && self.previous(row, col)
    }

    /// Keys for which `filter(current, previous)` holds, in row-major order.
    pub fn positions(&self, filter: impl Fn(bool, bool) -> bool) -> Vec<KeyPosition> {
        (0..KEYPAD_ROWS)
            .flat_map(|row| (0..KEYPAD_COLS).map(move |col| (row, col)))
            .filter(|&(row, col)| filter(self.current(row, col), self.previous(row, col)))
            .filter_map(|(row, col)| KeyPosition::new(row, col))
            .collect()
    }
}
