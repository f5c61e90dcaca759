use std::fmt::{Debug, Formatter};
use bitvec::prelude::*;
use log::{debug, trace};
use crate::keypad::{KeyMatrix, Keypad, KEYPAD_COLS, KEYPAD_ROWS};
use crate::{regs, GpioResult, RegisterPort};

/// One-hot row-select pattern for each row, written to bits 3:0 of the data register.
pub const ROW_SELECT: [u32; KEYPAD_ROWS] = [0b1000, 0b0100, 0b0010, 0b0001];

/// Bit of the external port register that carries each column line.
pub const COLUMN_BITS: [usize; KEYPAD_COLS] = [8, 7, 6, 5];

const ROW_SELECT_MASK: u32 = 0b1111;

/// The `KeypadScanner` drives the keypad rows and samples its columns through the
/// GPIO0 registers.
///
/// Only one row is driven at a time, and the row is released again before the next
/// one is selected, since all rows share the same column lines.
///
/// There is no debouncing; a stuck or floating line reads as a steady press or release.
pub struct KeypadScanner<'a> {
    port: &'a dyn RegisterPort,
    matrix: KeyMatrix,
}

impl Debug for KeypadScanner<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeypadScanner({:?})", self.port)
    }
}

impl <'a> KeypadScanner<'a> {
    /// Creates a scanner over the GPIO0 register block. All keys start released.
    pub fn new(port: &'a dyn RegisterPort) -> Self {
        debug!("Keypad scanner on {:?}", port);
        KeypadScanner {
            port,
            matrix: KeyMatrix::new(),
        }
    }

    fn select_row(&self, pattern: u32) -> GpioResult<()> {
        self.port.update_word(regs::SWPORTA_DR, ROW_SELECT_MASK, pattern)
    }
}

impl Keypad for KeypadScanner<'_> {
    fn scan(&mut self) -> GpioResult<()> {
        // The grid only changes once every row has been read.
        let mut inputs = [0u32; KEYPAD_ROWS];
        for (row, &pattern) in ROW_SELECT.iter().enumerate() {
            self.select_row(pattern)?;
            let input = self.port.read_word(regs::EXT_PORTA);
            // Release before reporting a failed read, so no row stays driven.
            self.select_row(0)?;
            inputs[row] = input?;
        }

        for (row, input) in inputs.iter().enumerate() {
            let lines = input.view_bits::<Lsb0>();
            for (col, &bit) in COLUMN_BITS.iter().enumerate() {
                self.matrix.record(row, col, lines[bit]);
            }
            trace!("Row {}: columns {:04b}", row, (input >> COLUMN_BITS[KEYPAD_COLS - 1]) & 0b1111);
        }

        Ok(())
    }

    fn matrix(&self) -> &KeyMatrix {
        &self.matrix
    }
}
