//! Hardware-facing I/O layer of the IntelliCalc calculator.
//!
//! Everything here talks to the board through a [RegisterPort]: the 4x4 keypad
//! ([keypad]), the six seven-segment displays ([segment]) and the battery
//! threshold lines ([battery]).

pub mod raw;
pub mod sim;
pub mod keypad;
pub mod segment;
pub mod battery;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        GpioError::Io(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

/// Word and byte access to one block of memory-mapped I/O registers.
///
/// Offsets are in bytes, relative to the start of the block. Register access
/// is inherently shared-mutable, so every method takes `&self`.
///
/// Implementations: [raw::RawRegisterPort] for the real board, and
/// [sim::SimRegisterPort] for running on a host.
pub trait RegisterPort: Debug {
    /// Reads the 32-bit register at `offset`.
    fn read_word(&self, offset: usize) -> GpioResult<u32>;

    /// Writes the 32-bit register at `offset`.
    fn write_word(&self, offset: usize, value: u32) -> GpioResult<()>;

    /// Writes a single byte at `offset`, without reading anything first.
    ///
    /// Needed for write-only byte-addressed registers like the display banks.
    fn write_byte(&self, offset: usize, value: u8) -> GpioResult<()>;

    /// Read-modify-write of the register at `offset`.
    /// Only the bits set in `mask` are replaced by the matching bits of `value`.
    fn update_word(&self, offset: usize, mask: u32, value: u32) -> GpioResult<()> {
        let current = self.read_word(offset)?;
        self.write_word(offset, (current & !mask) | (value & mask))
    }
}

/// Offsets of the GPIO controller registers used by the drivers.
pub mod regs {
    /// Port A data register. Bits 3:0 drive the keypad row-select lines.
    pub const SWPORTA_DR: usize = 0x00;
    /// Port A external input register. Keypad columns on bits 8:5, battery
    /// thresholds on bits 15:11.
    pub const EXT_PORTA: usize = 0x50;
}
