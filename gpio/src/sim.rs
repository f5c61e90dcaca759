//! Simulated register file, for running the drivers without the board.

use crate::{GpioError, GpioResult, RegisterPort};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// A single store recorded by [SimRegisterPort].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SimWrite {
    Word { offset: usize, value: u32 },
    Byte { offset: usize, value: u8 },
}

/// An in-memory [RegisterPort].
///
/// Words that were never written read as `0`. Byte stores are merged into their
/// containing word (little-endian lanes), and every store is appended to a log so
/// write-only registers can still be checked.
#[derive(Default)]
pub struct SimRegisterPort {
    words: RefCell<BTreeMap<usize, u32>>,
    writes: RefCell<Vec<SimWrite>>,
}

impl SimRegisterPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presets a word without logging it, e.g. to model external input levels.
    pub fn set_word(&self, offset: usize, value: u32) {
        self.words.borrow_mut().insert(offset, value);
    }

    /// The current value of the word at `offset`.
    pub fn word(&self, offset: usize) -> u32 {
        self.words.borrow().get(&offset).copied().unwrap_or(0)
    }

    /// The current value of the byte at `offset`.
    pub fn byte(&self, offset: usize) -> u8 {
        let word = self.word(offset & !0b11);
        (word >> ((offset & 0b11) * 8)) as u8
    }

    /// All stores since creation (or the last [Self::take_writes]), oldest first.
    pub fn writes(&self) -> Vec<SimWrite> {
        self.writes.borrow().clone()
    }

    pub fn take_writes(&self) -> Vec<SimWrite> {
        self.writes.take()
    }
}

impl Debug for SimRegisterPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimRegisterPort({} words)", self.words.borrow().len())
    }
}

impl RegisterPort for SimRegisterPort {
    fn read_word(&self, offset: usize) -> GpioResult<u32> {
        if offset % 4 != 0 {
            return Err(GpioError::InvalidArgument);
        }
        Ok(self.word(offset))
    }

    fn write_word(&self, offset: usize, value: u32) -> GpioResult<()> {
        if offset % 4 != 0 {
            return Err(GpioError::InvalidArgument);
        }
        self.words.borrow_mut().insert(offset, value);
        self.writes.borrow_mut().push(SimWrite::Word { offset, value });
        Ok(())
    }

    fn write_byte(&self, offset: usize, value: u8) -> GpioResult<()> {
        let aligned = offset & !0b11;
        let shift = (offset & 0b11) * 8;
        let mut words = self.words.borrow_mut();
        let word = words.entry(aligned).or_insert(0);
        *word = (*word & !(0xFFu32 << shift)) | ((value as u32) << shift);
        self.writes.borrow_mut().push(SimWrite::Byte { offset, value });
        Ok(())
    }
}
